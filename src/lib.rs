//! svopt - a batch SVG optimizer.
//!
//! Markup goes through an ordered, composable list of size-reduction plugins
//! drawn from a fixed catalog: a safe tier that never changes rendering, and
//! an opt-in aggressive tier layered after it. Optimized vectors can be
//! validated and rasterized into PNG thumbnails, and whole directory trees
//! are processed through a bounded worker pool.

pub mod batch;
pub mod cli;
pub mod compose;
pub mod convert;
pub mod engine;
pub mod error;
pub mod parse;
pub mod passes;
pub mod pathdata;
pub mod plugin;
pub mod serialize;
pub mod source;
pub mod thumb;
pub mod tree;

pub use compose::{Mode, Toggles, compose};
pub use engine::{Passes, execute, is_valid};
pub use error::SvoptError;
pub use plugin::{PathDataConfig, Plugin, PluginSpec, RemoveAttrsConfig};
pub use thumb::ThumbnailOptions;

/// One unit of optimization work: source markup plus the knobs that shape
/// its plugin list. Built fresh per input and consumed exactly once.
#[derive(Debug, Clone)]
pub struct OptimizeRequest {
    pub markup: String,
    pub mode: Mode,
    pub toggles: Toggles,
    /// Caller-supplied descriptors, appended after all built-ins: final say
    /// over the composed list, including re-enabling or reconfiguring
    /// built-ins by repeating their names.
    pub extra_plugins: Vec<PluginSpec>,
    pub passes: Passes,
}

impl OptimizeRequest {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            mode: Mode::default(),
            toggles: Toggles::default(),
            extra_plugins: Vec::new(),
            passes: Passes::default(),
        }
    }

    /// Compose the plugin list for this request and execute it.
    pub fn run(self) -> Result<String, SvoptError> {
        let list = compose(self.mode, &self.toggles, &self.extra_plugins);
        engine::execute(&self.markup, &list, self.passes)
    }
}

/// Optimize markup with default settings: safe mode, multi-pass, viewBox
/// preserved, fixed pixel dimensions stripped.
pub fn optimize(svg: &str) -> Result<String, SvoptError> {
    OptimizeRequest::new(svg).run()
}
