use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use curv_chunk::config::AppConfig;
use curv_chunk::ops::{self, ChunkMode};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file; CLI flags take precedence over it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Force debug-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ModeArg {
    Offline,
    Streaming,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chunk a file with the offline or streaming selector.
    Chunk {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "offline")]
        mode: ModeArg,
        /// Size of each simulated feed() push in streaming mode.
        #[arg(long, default_value_t = 4096)]
        fragment_size: usize,
        #[arg(long, default_value = "doc")]
        doc_id: String,
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Re-chunk a file around an edit, replaying unaffected chunks from a
    /// previous manifest.
    Hybrid {
        file: PathBuf,
        #[arg(long)]
        prev_manifest: PathBuf,
        #[arg(long)]
        edit_start: u64,
        #[arg(long)]
        edit_end: u64,
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Re-validate a manifest's hashes and structure against its file.
    Verify { file: PathBuf, manifest: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if cli.verbose {
        config.verbose = true;
    }
    curv_chunk::logging::init_logging(&config)?;

    match cli.command {
        Command::Chunk {
            file,
            mode,
            fragment_size,
            doc_id,
            manifest,
        } => {
            let mode = match mode {
                ModeArg::Offline => ChunkMode::Offline,
                ModeArg::Streaming => ChunkMode::Streaming,
            };
            let chunks = ops::run_chunk(&file, mode, fragment_size, &doc_id, manifest.as_deref(), &config)?;
            println!("wrote {} chunks", chunks.len());
        }
        Command::Hybrid {
            file,
            prev_manifest,
            edit_start,
            edit_end,
            manifest,
        } => {
            let result = ops::run_hybrid(&file, &prev_manifest, edit_start, edit_end, manifest.as_deref(), &config)?;
            println!("hybrid re-chunk produced {} chunks", result.len());
        }
        Command::Verify { file, manifest } => {
            ops::run_verify(&file, &manifest)?;
            println!("manifest OK");
        }
    }

    Ok(())
}
