//! AOKV CLI - command-line tool for set, get, keys, and dump operations
//!
//! This binary exists to exercise the writer/reader engines end to end; the
//! format itself has no notion of a CLI. Because `AokvWriter` only ever
//! opens a brand-new stream and has no "reopen an existing file" transition,
//! `set` rebuilds the whole file: read back whatever is already there,
//! splice in the new value at its existing position (or append it), and
//! rewrite from scratch.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use aokv_io::{
    AokvReader, AokvWriter, ByteSource, FileSource, IndexOptions, ReaderOptions, Value,
    WriterOptions,
};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(name = "aokv")]
#[command(about = "Append-only key-value container CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set a key to a JSON value, rewriting the file.
    Set {
        /// Path to the AOKV file (created if missing).
        file: PathBuf,
        /// Key to write.
        key: String,
        /// JSON-encoded value.
        value: String,
    },
    /// Remove a key (writes a JSON-null tombstone), rewriting the file.
    Remove {
        /// Path to the AOKV file.
        file: PathBuf,
        /// Key to remove.
        key: String,
    },
    /// Get the current value for a key.
    Get {
        /// Path to the AOKV file.
        file: PathBuf,
        /// Key to look up.
        key: String,
    },
    /// List all known keys, in first-occurrence order.
    Keys {
        /// Path to the AOKV file.
        file: PathBuf,
    },
    /// Dump the full key -> value map as JSON.
    Dump {
        /// Path to the AOKV file.
        file: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Set { file, key, value } => {
            let value: serde_json::Value = serde_json::from_str(&value)?;
            cmd_set(&file, &key, Value::Json(value))?;
        }
        Commands::Remove { file, key } => {
            cmd_set(&file, &key, Value::tombstone())?;
        }
        Commands::Get { file, key } => {
            let entries = read_entries(&file)?;
            match entries.into_iter().find(|(k, _)| k == &key) {
                Some((_, value)) => println!("{}", value_to_json(&value)),
                None => println!("null"),
            }
        }
        Commands::Keys { file } => {
            for (key, _) in read_entries(&file)? {
                println!("{key}");
            }
        }
        Commands::Dump { file } => {
            let mut map = serde_json::Map::new();
            for (key, value) in read_entries(&file)? {
                map.insert(key, value_to_json(&value));
            }
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
    }

    Ok(())
}

fn cmd_set(path: &Path, key: &str, value: Value) -> Result<(), Box<dyn Error>> {
    let mut entries = if path.exists() {
        read_entries(path)?
    } else {
        Vec::new()
    };

    match entries.iter_mut().find(|(k, _)| k == key) {
        Some((_, existing)) => *existing = value,
        None => entries.push((key.to_string(), value)),
    }

    let progress = ProgressBar::new(entries.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} keys written")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut writer = AokvWriter::new(WriterOptions::default());
    for (k, v) in &entries {
        writer.set(k, v)?;
        progress.inc(1);
    }
    let finish = writer.end()?;
    let bytes = finish.stream.drain_to_vec();
    progress.finish_and_clear();

    fs::write(path, &bytes)?;
    log::info!(
        "wrote {} keys ({} bytes, {} index snapshots) to {}",
        entries.len(),
        bytes.len(),
        finish.metrics.index_blocks_written,
        path.display()
    );
    Ok(())
}

fn read_entries(path: &Path) -> Result<Vec<(String, Value)>, Box<dyn Error>> {
    let file = fs::File::open(path)?;
    let source = FileSource::new(file)?;
    if source.len() == 0 {
        return Ok(Vec::new());
    }
    let mut reader = AokvReader::new(source, ReaderOptions::default());
    reader.index(IndexOptions::default())?;

    let mut entries = Vec::with_capacity(reader.keys().len());
    for key in reader.keys() {
        if let Some(value) = reader.get(key)? {
            entries.push((key.clone(), value));
        }
    }
    Ok(entries)
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Json(json) => json.clone(),
        Value::TypedArray { kind, bytes } => serde_json::json!({
            "kind": kind.tag(),
            "bytes": bytes,
        }),
        Value::RawBytes(bytes) => serde_json::json!({ "rawBytes": bytes }),
    }
}
