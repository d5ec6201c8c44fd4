//! Hexless - A terminal hex viewer and editor.
//!
//! # Usage
//!
//! ```bash
//! hexless firmware.bin
//! hexless --writable --columns 16 disk.img
//! hexless --no-mmap /dev/sdb
//! ```

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hexless::app::App;
use hexless::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};

/// A terminal hex viewer and editor for large files
#[derive(Parser, Debug)]
#[command(name = "hexless", version, about, long_about = None)]
struct Cli {
    /// File to view
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Allow the file to be modified
    #[arg(short, long)]
    writable: bool,

    /// Bytes per line (0 fits the terminal width)
    #[arg(short, long, value_name = "N")]
    columns: Option<u64>,

    /// Never memory-map the file; use buffered reads and writes
    #[arg(long)]
    no_mmap: bool,

    /// Start with the cursor in the ASCII pane
    #[arg(long)]
    ascii: bool,

    /// Write log output to a file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

/// Install the tracing subscriber.
///
/// Without a log file only warnings reach stderr, and those only before the
/// terminal switches to the alternate screen.
fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(file)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(raw_args.get(1..).unwrap_or_default());

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

    init_logging(effective.log_file.as_ref())?;
    tracing::debug!(?effective, "effective flags");

    // `--columns 0` on the command line overrides a saved fixed width
    let columns = match cli.columns {
        Some(0) => None,
        Some(n) => Some(n),
        None => effective.columns,
    };

    let mut app = App::new(cli.file)
        .with_writable(cli.writable)
        .with_columns(columns)
        .with_mmap(!effective.no_mmap)
        .with_ascii(effective.ascii)
        .with_config_paths(
            Some(global_path),
            if local_path.exists() {
                Some(local_path)
            } else {
                None
            },
        );

    app.run().context("Application error")
}
