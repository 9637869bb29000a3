//! CLI: inspect or upgrade saved process files.
//!
//! Usage:
//!   process_json inspect <file>
//!   process_json upgrade <file> [--out <file>] [--compact]
//!
//! Set RUST_LOG=streamweave_process=trace for TRACE-level span enter/exit and events.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use streamweave_process::process_io::save_process;
use streamweave_process::{FormatVersion, ProcessSerializer, SerializerOptions};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Inspect or upgrade saved process files.
#[derive(Parser, Debug)]
#[command(name = "process_json")]
struct Args {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the format version and the chapter/step layout of a process file.
  Inspect {
    /// Path to the process file
    #[arg(value_name = "FILE")]
    path: PathBuf,
  },
  /// Rewrite a process file in the current format.
  Upgrade {
    /// Path to the process file
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Write here instead of overwriting the input
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
  },
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let result = match args.command {
    Command::Inspect { path } => inspect(&path),
    Command::Upgrade { path, out, compact } => upgrade(&path, out, compact),
  };
  if let Err(e) = result {
    eprintln!("Error: {}", e);
    process::exit(1);
  }
}

fn inspect(path: &Path) -> Result<(), String> {
  let bytes = fs::read(path).map_err(|e| format!("reading {}: {}", path.display(), e))?;
  let serializer = ProcessSerializer::default();
  let version = serializer.peek_version(&bytes).map_err(|e| e.to_string())?;
  let process = serializer.decode(&bytes).map_err(|e| e.to_string())?;
  info!(path = %path.display(), %version, "inspected");

  println!("Process: {}", process.name);
  println!("  Format: {}", version);
  println!("  Chapters: {}", process.chapters.len());
  println!("  Steps: {}", process.step_count());
  for chapter in &process.chapters {
    println!("  - {} ({} steps)", chapter.name, chapter.steps.len());
  }
  Ok(())
}

fn upgrade(path: &Path, out: Option<PathBuf>, compact: bool) -> Result<(), String> {
  let serializer = ProcessSerializer::default().with_options(SerializerOptions { pretty: !compact });
  let bytes = fs::read(path).map_err(|e| format!("reading {}: {}", path.display(), e))?;
  let from = serializer.peek_version(&bytes).map_err(|e| e.to_string())?;
  let process = serializer.decode(&bytes).map_err(|e| e.to_string())?;
  let target = out.unwrap_or_else(|| path.to_path_buf());
  save_process(&target, &serializer, &process).map_err(|e| e.to_string())?;
  info!(from = %from, to = %FormatVersion::CURRENT, path = %target.display(), "upgraded");
  println!(
    "Upgraded {}: {} -> {}",
    target.display(),
    from,
    FormatVersion::CURRENT
  );
  Ok(())
}
