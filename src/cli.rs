//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "svopt")]
#[command(about = "A batch SVG optimizer", long_about = None)]
#[command(after_help = "EXAMPLES:\n  \
    svopt icons/\n  \
    svopt 'assets/**/*.svg' -o build/icons --aggressive --png\n  \
    svopt logo.svg --plugin '{\"name\": \"removeComments\", \"active\": false}'")]
pub struct Cli {
    /// Input file, directory (recursed for *.svg/*.svgz) or glob pattern
    pub input: String,

    /// Output directory
    #[arg(short, long, default_value = "optimized")]
    pub out_dir: PathBuf,

    /// Enable the aggressive plugin tier (verify results visually)
    #[arg(long)]
    pub aggressive: bool,

    /// Report what would be done without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Also export a PNG thumbnail per file
    #[arg(long)]
    pub png: bool,

    /// Worker pool size (defaults to the CPU core count, minimum 1)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Keep fixed pixel dimensions on the root element
    #[arg(long)]
    pub keep_dimensions: bool,

    /// Allow a re-enabled removeViewBox plugin to drop the viewBox
    #[arg(long)]
    pub no_preserve_viewbox: bool,

    /// Run the plugin pipeline once instead of iterating to a fixed point
    #[arg(long)]
    pub single_pass: bool,

    /// Coordinate precision for convertPathData
    #[arg(short, long)]
    pub precision: Option<u8>,

    /// Extra plugin descriptor as JSON, appended after all built-ins;
    /// repeatable, applied in the order given
    #[arg(long = "plugin", value_name = "JSON")]
    pub plugins: Vec<String>,
}
