use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use svopt::batch::{BatchOptions, run_batch};
use svopt::cli::Cli;
use svopt::compose::{Mode, Toggles};
use svopt::engine::Passes;
use svopt::plugin::{PathDataConfig, Plugin, PluginSpec};

// Visible at info level by default; RUST_LOG still overrides. The per-file
// review warnings must reach the user without any environment setup.
const DEFAULT_LOG_DIRECTIVE: &str = "info";

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE)),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut extra_plugins = Vec::new();
    if let Some(precision) = cli.precision {
        // Reconfigure the built-in entry through override-by-recurrence.
        extra_plugins.push(PluginSpec::enabled(Plugin::ConvertPathData(
            PathDataConfig { precision },
        )));
    }
    for descriptor in &cli.plugins {
        let spec = PluginSpec::from_json(descriptor)
            .with_context(|| format!("bad --plugin descriptor: {}", descriptor))?;
        extra_plugins.push(spec);
    }

    let opts = BatchOptions {
        out_dir: cli.out_dir,
        mode: if cli.aggressive {
            Mode::Aggressive
        } else {
            Mode::Safe
        },
        toggles: Toggles {
            strip_dimensions: !cli.keep_dimensions,
            preserve_viewbox: !cli.no_preserve_viewbox,
        },
        passes: if cli.single_pass {
            Passes::Single
        } else {
            Passes::Multi
        },
        extra_plugins,
        dry_run: cli.dry_run,
        export_png: cli.png,
        jobs: cli.jobs.unwrap_or_else(num_cpus::get).max(1),
        ..BatchOptions::default()
    };

    let summary = run_batch(&cli.input, &opts).context("batch failed before processing")?;

    println!(
        "\n{} of {} files optimized, {} -> {} bytes ({:.1}% smaller)",
        summary.succeeded(),
        summary.attempted(),
        summary.bytes_before(),
        summary.bytes_after(),
        summary.reduction_percent()
    );
    if summary.failed() > 0 {
        println!("{} file(s) failed", summary.failed());
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn default_log_directive_keeps_warnings_visible() {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(Level::WARN));
            assert!(tracing::enabled!(Level::INFO));
            assert!(!tracing::enabled!(Level::TRACE));
        });
    }
}
