//! Execution of a composed plugin list against markup.

use crate::convert;
use crate::error::SvoptError;
use crate::parse::parse_svg;
use crate::passes;
use crate::pathdata;
use crate::plugin::{Plugin, PluginSpec};
use crate::serialize::serialize;
use crate::tree::Document;

/// Whether the pipeline re-runs against its own output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Passes {
    Single,
    /// Re-run until a fixed point or the pass limit. Catches reductions only
    /// visible after a prior pass simplified structure (merged paths exposing
    /// empty containers, for instance).
    #[default]
    Multi,
}

const MAX_PASSES: usize = 10;

/// Run the ordered plugin list against `markup`.
///
/// Override-by-recurrence is a documented contract of this engine: the list
/// may name a transformation more than once, execution order is the order of
/// each name's first occurrence, and the LAST occurrence of a name supplies
/// its active flag and configuration. Failure is all-or-nothing; no
/// partially transformed markup is ever returned.
pub fn execute(markup: &str, specs: &[PluginSpec], passes: Passes) -> Result<String, SvoptError> {
    let plugins = resolve(specs).map_err(SvoptError::into_engine_failure)?;

    let limit = match passes {
        Passes::Single => 1,
        Passes::Multi => MAX_PASSES,
    };

    let mut current = markup.to_string();
    for _ in 0..limit {
        let mut doc = parse_svg(&current).map_err(SvoptError::into_engine_failure)?;
        for plugin in &plugins {
            apply(plugin, &mut doc);
        }
        let output = serialize(&doc);
        if output == current {
            break;
        }
        current = output;
    }

    Ok(current)
}

/// Structural well-formedness check: a zero-plugin single pass. Advisory
/// only, and never propagates an error.
pub fn is_valid(markup: &str) -> bool {
    execute(markup, &[], Passes::Single).is_ok()
}

/// Collapse a plugin list to the transformations that actually run, applying
/// the override-by-recurrence rule, then validate each survivor.
fn resolve(specs: &[PluginSpec]) -> Result<Vec<Plugin>, SvoptError> {
    let mut resolved: Vec<PluginSpec> = Vec::new();

    for spec in specs {
        match resolved
            .iter_mut()
            .find(|s| s.plugin.name() == spec.plugin.name())
        {
            Some(existing) => *existing = spec.clone(),
            None => resolved.push(spec.clone()),
        }
    }

    resolved
        .into_iter()
        .filter(|s| s.active)
        .map(|s| validate(s.plugin))
        .collect()
}

fn validate(plugin: Plugin) -> Result<Plugin, SvoptError> {
    match &plugin {
        Plugin::Custom { name, .. } => {
            return Err(SvoptError::UnknownPlugin(name.clone()));
        }
        Plugin::ConvertPathData(cfg) => {
            if cfg.precision > 8 {
                return Err(SvoptError::InvalidParams {
                    plugin: plugin.name().to_string(),
                    reason: format!("precision {} out of range (0-8)", cfg.precision),
                });
            }
        }
        Plugin::RemoveAttrs(cfg) => {
            if cfg.patterns.is_empty() {
                return Err(SvoptError::InvalidParams {
                    plugin: plugin.name().to_string(),
                    reason: "patterns must not be empty".into(),
                });
            }
            if let Some(bad) = cfg.patterns.iter().find(|p| p.trim_end_matches('*').is_empty()) {
                return Err(SvoptError::InvalidParams {
                    plugin: plugin.name().to_string(),
                    reason: format!("pattern {:?} matches every attribute", bad),
                });
            }
        }
        _ => {}
    }
    Ok(plugin)
}

fn apply(plugin: &Plugin, doc: &mut Document) {
    match plugin {
        Plugin::RemoveComments => passes::remove_comments(doc),
        Plugin::RemoveDoctype => passes::remove_doctype(doc),
        Plugin::RemoveXmlProcInst => passes::remove_xml_proc_inst(doc),
        Plugin::RemoveMetadata => passes::remove_metadata(doc),
        Plugin::RemoveTitle => passes::remove_title(doc),
        Plugin::RemoveDesc => passes::remove_desc(doc),
        Plugin::RemoveEditorsNsData => passes::remove_editors_ns_data(doc),
        Plugin::RemoveEmptyAttrs => passes::remove_empty_attrs(doc),
        Plugin::RemoveHiddenElems => passes::remove_hidden_elems(doc),
        Plugin::RemoveEmptyText => passes::remove_empty_text(doc),
        Plugin::RemoveEmptyContainers => passes::remove_empty_containers(doc),
        Plugin::ConvertStyleToAttrs => convert::convert_style_to_attrs(doc),
        Plugin::ConvertColors => convert::convert_colors(doc),
        Plugin::ConvertPathData(cfg) => pathdata::convert_path_data(doc, cfg.precision),
        Plugin::ConvertTransform => convert::convert_transform(doc),
        Plugin::RemoveUnknownsAndDefaults => passes::remove_unknowns_and_defaults(doc),
        Plugin::RemoveNonInheritableGroupAttrs => passes::remove_non_inheritable_group_attrs(doc),
        Plugin::RemoveUselessStrokeAndFill => passes::remove_useless_stroke_and_fill(doc),
        Plugin::MergePaths => passes::merge_paths(doc),
        Plugin::RemoveDimensions => passes::remove_dimensions(doc),
        Plugin::RemoveViewBox => passes::remove_view_box(doc),
        Plugin::SortAttrs => convert::sort_attrs(doc),
        Plugin::RemoveAttrs(cfg) => convert::remove_attrs(doc, &cfg.patterns),
        // Filtered out during resolution.
        Plugin::Custom { .. } => {}
    }
}
