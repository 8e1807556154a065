//! Podium - a dual-terminal slide presenter.
//!
//! # Usage
//!
//! ```bash
//! podium talk.pdf
//! podium --slide-tty /dev/pts/3 --slide-size 160x45 talk.pdf
//! podium --layout-file layout.txt --save talk.pdf
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use podium::app::App;
use podium::config::{
    ConfigFlags, Settings, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use podium::perf;

/// Present a rasterized document across two terminals
#[derive(Parser, Debug)]
#[command(name = "podium", version, about, long_about = None)]
struct Cli {
    /// Document whose rasterized pages to present
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Slide background color (name or #rrggbb)
    #[arg(long, value_name = "COLOR")]
    background: Option<String>,

    /// Current-slide thumbnail width in pixels
    #[arg(long, value_name = "PX")]
    current_width: Option<u32>,

    /// Next-slide thumbnail width in pixels
    #[arg(long, value_name = "PX")]
    next_width: Option<u32>,

    /// Overview thumbnail width in pixels
    #[arg(long, value_name = "PX")]
    overview_width: Option<u32>,

    /// Presenter layout template file
    #[arg(long, value_name = "PATH")]
    layout_file: Option<PathBuf>,

    /// Clock format (strftime)
    #[arg(long, value_name = "FMT")]
    clock_format: Option<String>,

    /// Stopwatch format (%H, %M, %S, %h)
    #[arg(long, value_name = "FMT")]
    stopwatch_format: Option<String>,

    /// Terminal device that shows the slides
    #[arg(long, value_name = "PATH")]
    slide_tty: Option<PathBuf>,

    /// Size of the slide terminal in cells
    #[arg(long, value_name = "COLSxROWS")]
    slide_size: Option<String>,

    /// Directory holding page-N.png images
    #[arg(long, value_name = "PATH")]
    cache_dir: Option<PathBuf>,

    /// Enable startup performance logging
    #[arg(long)]
    perf: bool,

    /// Write detailed session events to a file
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Force image rendering to use half-cell fallback mode
    #[arg(long)]
    force_half_cell: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let debug_log_path = effective
        .debug_log
        .clone()
        .or_else(|| std::env::var_os("PODIUM_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize debug log {}: {}",
            debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    let settings = Settings::resolve(&effective).context("Invalid configuration")?;

    if !cli.file.exists() && effective.cache_dir.is_none() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    let mut app = App::new(cli.file)
        .with_settings(settings)
        .with_cache_dir(effective.cache_dir)
        .with_force_half_cell(cli.force_half_cell);

    app.run().context("Presentation error")
}
