//! Batch orchestration: resolve an input specification to files, fan work
//! out over a bounded pool, and aggregate per-file outcomes.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::compose::{Mode, Toggles};
use crate::engine::{Passes, is_valid};
use crate::error::SvoptError;
use crate::plugin::PluginSpec;
use crate::thumb::{self, ThumbnailOptions};
use crate::{OptimizeRequest, source};

/// Aggressive-mode reductions beyond this share of the original size get a
/// manual-verification warning. Compared numerically, never as strings.
const AGGRESSIVE_REVIEW_THRESHOLD_PERCENT: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub out_dir: PathBuf,
    pub mode: Mode,
    pub toggles: Toggles,
    pub passes: Passes,
    pub extra_plugins: Vec<PluginSpec>,
    pub dry_run: bool,
    pub export_png: bool,
    pub thumbnail: ThumbnailOptions,
    /// Worker pool size; clamped to at least 1.
    pub jobs: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("optimized"),
            mode: Mode::Safe,
            toggles: Toggles::default(),
            passes: Passes::Multi,
            extra_plugins: Vec::new(),
            dry_run: false,
            export_png: false,
            thumbnail: ThumbnailOptions::default(),
            jobs: num_cpus::get(),
        }
    }
}

/// Outcome of one file's processing. `error` is set when any step after
/// claiming the file failed; earlier steps' artifacts stay in place.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub dest: Option<PathBuf>,
    pub bytes_before: u64,
    pub bytes_after: u64,
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn reduction_percent(&self) -> f64 {
        reduction_percent(self.bytes_before, self.bytes_after)
    }
}

fn reduction_percent(before: u64, after: u64) -> f64 {
    if before == 0 {
        return 0.0;
    }
    (before as f64 - after as f64) / before as f64 * 100.0
}

#[derive(Debug)]
pub struct BatchSummary {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.attempted() - self.failed()
    }

    pub fn bytes_before(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|o| o.error.is_none())
            .map(|o| o.bytes_before)
            .sum()
    }

    pub fn bytes_after(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|o| o.error.is_none())
            .map(|o| o.bytes_after)
            .sum()
    }

    pub fn reduction_percent(&self) -> f64 {
        reduction_percent(self.bytes_before(), self.bytes_after())
    }
}

fn is_svg_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "svg" | "svgz"))
}

/// Resolve an input specification (file, directory or glob pattern) to a
/// concrete file list. Resolving to zero files is a fatal pre-flight error.
pub fn collect_svg_files(input: &str) -> Result<Vec<PathBuf>, SvoptError> {
    let mut files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        for entry in WalkDir::new(input_path)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry.map_err(|e| SvoptError::Io(e.into()))?;
            if entry.file_type().is_file() && is_svg_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
    } else if let Ok(paths) = glob::glob(input) {
        for path in paths.flatten() {
            if path.is_file() && is_svg_file(&path) {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        return Err(SvoptError::NoInput(input.to_string()));
    }
    files.sort();
    Ok(files)
}

/// Run the whole batch. Pre-flight failures (no files, output directory
/// cannot be created, pool build failure) abort before any file is touched;
/// per-file failures are isolated and every file is attempted exactly once.
pub fn run_batch(input: &str, opts: &BatchOptions) -> Result<BatchSummary, SvoptError> {
    let files = collect_svg_files(input)?;
    debug!(count = files.len(), "resolved input specification");

    if !opts.dry_run {
        fs::create_dir_all(&opts.out_dir)?;
    }

    let jobs = opts.jobs.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(std::io::Error::other)?;

    let outcomes: Vec<FileOutcome> =
        pool.install(|| files.par_iter().map(|path| process_file(path, opts)).collect());

    Ok(BatchSummary { outcomes })
}

/// Process one file end to end. Never panics or propagates: any failure is
/// folded into the outcome so sibling files keep running.
fn process_file(path: &Path, opts: &BatchOptions) -> FileOutcome {
    let mut outcome = FileOutcome {
        source: path.to_path_buf(),
        dest: None,
        bytes_before: 0,
        bytes_after: 0,
        error: None,
    };

    if let Err(e) = try_process_file(path, opts, &mut outcome) {
        outcome.error = Some(e.to_string());
        println!("✗ {}: {}", path.display(), e);
    }

    outcome
}

fn try_process_file(
    path: &Path,
    opts: &BatchOptions,
    outcome: &mut FileOutcome,
) -> Result<(), SvoptError> {
    let markup = source::read_markup(path)?;
    outcome.bytes_before = markup.len() as u64;

    let request = OptimizeRequest {
        markup,
        mode: opts.mode,
        toggles: opts.toggles,
        extra_plugins: opts.extra_plugins.clone(),
        passes: opts.passes,
    };
    let optimized = request.run()?;
    outcome.bytes_after = optimized.len() as u64;

    if !is_valid(&optimized) {
        warn!(path = %path.display(), "optimized output failed validation, writing anyway");
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| SvoptError::InvalidSvg(format!("no file name in {}", path.display())))?;
    let dest = opts.out_dir.join(file_name);

    let pct = reduction_percent(outcome.bytes_before, outcome.bytes_after);
    if opts.dry_run {
        println!(
            "✓ {} (dry run) {} -> {} bytes ({:.1}% smaller)",
            path.display(),
            outcome.bytes_before,
            outcome.bytes_after,
            pct
        );
    } else {
        // A single write call per artifact: no partially written output.
        fs::write(&dest, &optimized)?;
        outcome.dest = Some(dest.clone());

        // Export before reporting so a rasterization failure yields one
        // ✗ line instead of a ✓ followed by a ✗. The SVG write above
        // stands either way.
        let png_path = if opts.export_png {
            let png_path = dest.with_extension("png");
            thumb::render(&optimized, &png_path, &opts.thumbnail)?;
            Some(png_path)
        } else {
            None
        };

        println!(
            "✓ {} -> {} {} -> {} bytes ({:.1}% smaller)",
            path.display(),
            dest.display(),
            outcome.bytes_before,
            outcome.bytes_after,
            pct
        );
        if let Some(png_path) = png_path {
            println!("  ↳ thumbnail {}", png_path.display());
        }
    }

    if opts.mode == Mode::Aggressive && pct > AGGRESSIVE_REVIEW_THRESHOLD_PERCENT {
        warn!(
            path = %path.display(),
            reduction = format!("{:.1}%", pct),
            "aggressive mode reduced this file substantially; verify it visually"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_is_numeric() {
        // 7.0% < 10.0% must hold even though "7.0" > "10.0" lexically
        assert!(reduction_percent(100, 93) < AGGRESSIVE_REVIEW_THRESHOLD_PERCENT);
        assert!(reduction_percent(100, 80) > AGGRESSIVE_REVIEW_THRESHOLD_PERCENT);
        assert_eq!(reduction_percent(0, 0), 0.0);
        assert!(reduction_percent(10, 20) < 0.0);
    }

    #[test]
    fn svg_file_detection() {
        assert!(is_svg_file(Path::new("a.svg")));
        assert!(is_svg_file(Path::new("a.SVGZ")));
        assert!(!is_svg_file(Path::new("a.png")));
        assert!(!is_svg_file(Path::new("svg")));
    }

    #[test]
    fn collect_from_directory_is_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join("sub/a.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join("note.txt"), "not svg").unwrap();

        let files = collect_svg_files(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("b.svg"));
        assert!(files[1].ends_with("sub/a.svg"));
    }

    #[test]
    fn empty_resolution_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_svg_files(dir.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SvoptError::NoInput(_)));
    }
}
