//! RecordKV CLI
//!
//! Inspect and maintain a record store file from the command line.
//! The payload width is given on the command line since the file itself
//! carries no header.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use recordkv::record::{Integrity, RecordKey};
use recordkv::storage::RecordFile;
use recordkv::{Config, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// RecordKV CLI
#[derive(Parser, Debug)]
#[command(name = "recordkv-cli")]
#[command(about = "Inspect and maintain RecordKV store files")]
#[command(version)]
struct Args {
    /// Store file
    #[arg(short, long)]
    path: PathBuf,

    /// Payload size in bytes (sizeof(T) of the writing program)
    #[arg(short = 's', long)]
    payload_size: usize,

    /// Records carry no CRC-8 trailer
    #[arg(long)]
    no_checksum: bool,

    /// Scratch file used by compaction (default: {path}.compact)
    #[arg(long)]
    scratch: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every slot with its status
    Inspect,

    /// Count valid records
    Count,

    /// Print the payload stored under a key
    Get {
        /// The key to look up
        key: String,
    },

    /// Remove a key (compacts the file if found)
    Remove {
        /// The key to remove
        key: String,
    },

    /// Drop corrupted and torn slots
    Compact,

    /// Report valid, corrupt and torn content
    Verify,

    /// Delete the store file
    Clear,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,recordkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let integrity = if args.no_checksum {
        Integrity::None
    } else {
        Integrity::Crc8
    };

    let mut builder = Config::builder().path(&args.path).integrity(integrity);
    if let Some(scratch) = &args.scratch {
        builder = builder.scratch_path(scratch);
    }
    let config = builder.build();

    let mut file = RecordFile::open(&config, args.payload_size)?;
    let layout = file.layout();

    match args.command {
        Commands::Inspect => {
            let mut slots = file.slots()?;
            for slot in slots.by_ref() {
                let slot = slot?;
                println!(
                    "{:>6}  {:<7}  {:<31}  {}",
                    slot.index,
                    if slot.valid { "ok" } else { "CORRUPT" },
                    layout.key(&slot.bytes).to_string(),
                    hex(layout.payload(&slot.bytes))
                );
            }
            if slots.trailing_bytes() > 0 {
                println!("(torn trailing slot: {} bytes)", slots.trailing_bytes());
            }
        }
        Commands::Count => {
            println!("{}", file.count()?);
        }
        Commands::Get { key } => {
            let key = RecordKey::new(key.as_bytes())?;
            match file.find(&key)? {
                Some(payload) => println!("{}", hex(&payload)),
                None => {
                    eprintln!("key not found: {}", key);
                    process::exit(2);
                }
            }
        }
        Commands::Remove { key } => {
            let key = RecordKey::new(key.as_bytes())?;
            if file.remove(&key)? {
                println!("removed {}", key);
            } else {
                eprintln!("key not found: {}", key);
                process::exit(2);
            }
        }
        Commands::Compact => {
            let stats = file.compact()?;
            println!(
                "kept {}, dropped {} corrupt, {} torn bytes",
                stats.kept, stats.corrupt, stats.trailing_bytes
            );
        }
        Commands::Verify => {
            let stats = file.scan()?;
            println!(
                "valid {}, corrupt {}, torn bytes {}",
                stats.valid, stats.corrupt, stats.trailing_bytes
            );
            if !stats.is_clean() {
                process::exit(3);
            }
        }
        Commands::Clear => {
            file.clear()?;
            println!("cleared {}", file.path().display());
        }
    }

    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
