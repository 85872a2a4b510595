//! # CLI Module
//!
//! Command-line interface for the blockprint hashing engine.
//!
//! ## Usage
//! ```bash
//! # Fingerprint every image under a directory
//! blockprint hash ~/Pictures
//!
//! # Classical digests work on any file
//! blockprint hash backup.tar --algorithm sha256
//!
//! # Compare two images perceptually
//! blockprint compare holiday.jpg holiday-edit.jpg
//!
//! # Distance between stored fingerprints
//! blockprint distance deadbeef beefca47
//!
//! # JSON output for scripting
//! blockprint hash ~/Pictures --output json
//! ```

use blockprint::core::blockhash::{BlockhashConfig, Fingerprint};
use blockprint::core::comparator::MatchType;
use blockprint::core::digest::{Algorithm as CoreAlgorithm, Hasher};
use blockprint::error::Result;
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Blockprint - perceptual fingerprints for images, classical digests for
/// everything else
#[derive(Parser, Debug)]
#[command(name = "blockprint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Hash files or directory trees
    Hash {
        /// Files or directories to hash
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Hash algorithm to use
        #[arg(short, long, default_value = "blockhash")]
        algorithm: Algorithm,

        /// Grid side length for the block hash (bits*bits fingerprint bits)
        #[arg(short, long, default_value = "16")]
        bits: u32,

        /// Force exact-division aggregation
        #[arg(long)]
        quick: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Compare two images perceptually
    Compare {
        /// First image
        left: PathBuf,

        /// Second image
        right: PathBuf,

        /// Grid side length for the block hash
        #[arg(short, long, default_value = "16")]
        bits: u32,

        /// Force exact-division aggregation
        #[arg(long)]
        quick: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Hamming distance between two hex fingerprints
    Distance {
        /// First fingerprint, canonical hex form
        left: String,

        /// Second fingerprint, canonical hex form
        right: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// Block-mean perceptual image hash (default)
    Blockhash,
    /// MD5 digest
    Md5,
    /// Zip-compatible CRC-32
    Crc32,
    /// SHA-1 digest
    Sha1,
    /// SHA-256 digest
    Sha256,
    /// SHA-512 digest
    Sha512,
}

impl From<Algorithm> for CoreAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Blockhash => CoreAlgorithm::Blockhash,
            Algorithm::Md5 => CoreAlgorithm::Md5,
            Algorithm::Crc32 => CoreAlgorithm::Crc32,
            Algorithm::Sha1 => CoreAlgorithm::Sha1,
            Algorithm::Sha256 => CoreAlgorithm::Sha256,
            Algorithm::Sha512 => CoreAlgorithm::Sha512,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (hash and path only)
    Minimal,
}

#[derive(Debug, Serialize)]
struct HashRecord {
    path: PathBuf,
    algorithm: String,
    hash: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct CompareRecord {
    left: PathBuf,
    right: PathBuf,
    distance: u32,
    similarity_percent: f64,
    classification: String,
}

/// Run the CLI
pub fn run() -> Result<()> {
    blockprint::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Hash {
            paths,
            algorithm,
            bits,
            quick,
            output,
        } => run_hash(paths, algorithm.into(), bits, quick, output),
        Commands::Compare {
            left,
            right,
            bits,
            quick,
            output,
        } => run_compare(left, right, bits, quick, output),
        Commands::Distance { left, right } => run_distance(&left, &right),
    }
}

fn run_hash(
    paths: Vec<PathBuf>,
    algorithm: CoreAlgorithm,
    bits: u32,
    quick: bool,
    output: OutputFormat,
) -> Result<()> {
    let files = collect_files(&paths);
    let hasher =
        Hasher::new(algorithm).blockhash_config(BlockhashConfig::new().bits(bits).quick(quick));

    let progress = if matches!(output, OutputFormat::Pretty) && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let records: Vec<HashRecord> = files
        .par_iter()
        .map(|path| {
            let record = match hasher.hash_file(path) {
                Ok(value) => HashRecord {
                    path: path.clone(),
                    algorithm: algorithm.to_string(),
                    hash: Some(value.to_hex()),
                    error: None,
                },
                Err(error) => HashRecord {
                    path: path.clone(),
                    algorithm: algorithm.to_string(),
                    hash: None,
                    error: Some(error.to_string()),
                },
            };
            if let Some(pb) = &progress {
                pb.inc(1);
            }
            record
        })
        .collect();

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Minimal => {
            for record in &records {
                if let Some(hash) = &record.hash {
                    println!("{}  {}", hash, record.path.display());
                }
            }
        }
        OutputFormat::Pretty => {
            let term = Term::stderr();
            let failed = records.iter().filter(|r| r.error.is_some()).count();

            for record in &records {
                match (&record.hash, &record.error) {
                    (Some(hash), _) => {
                        println!(
                            "{}  {}",
                            style(hash).green(),
                            record.path.display()
                        );
                    }
                    (None, Some(error)) => {
                        term.write_line(&format!(
                            "{}  {}: {}",
                            style("failed").red().bold(),
                            record.path.display(),
                            error
                        ))
                        .ok();
                    }
                    (None, None) => {}
                }
            }

            if failed > 0 {
                term.write_line(&format!(
                    "{}",
                    style(format!("{} of {} files failed", failed, records.len())).dim()
                ))
                .ok();
            }
        }
    }

    Ok(())
}

fn run_compare(
    left: PathBuf,
    right: PathBuf,
    bits: u32,
    quick: bool,
    output: OutputFormat,
) -> Result<()> {
    let hasher = Hasher::new(CoreAlgorithm::Blockhash)
        .blockhash_config(BlockhashConfig::new().bits(bits).quick(quick));

    let left_value = hasher.hash_file(&left)?;
    let right_value = hasher.hash_file(&right)?;

    // Blockhash always yields perceptual values; destructure defensively
    let (left_print, right_print) = match (left_value.fingerprint(), right_value.fingerprint()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(blockprint::BlockprintError::Config(
                "compare requires perceptual fingerprints".to_string(),
            ))
        }
    };

    let distance = left_print.distance(right_print)?;
    let similarity = left_print.similarity(right_print)?;
    let classification = MatchType::from_distance(distance);

    match output {
        OutputFormat::Json => {
            let record = CompareRecord {
                left,
                right,
                distance,
                similarity_percent: similarity,
                classification: classification.to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        OutputFormat::Minimal => {
            println!("{}", distance);
        }
        OutputFormat::Pretty => {
            println!(
                "{} {}",
                style("left ").dim(),
                style(left_print.to_hex()).green()
            );
            println!(
                "{} {}",
                style("right").dim(),
                style(right_print.to_hex()).green()
            );
            println!();
            println!(
                "distance {} of {} bits ({:.1}% similar) - {}",
                style(distance).bold().cyan(),
                left_print.bit_count(),
                similarity,
                style(classification).bold()
            );
        }
    }

    Ok(())
}

fn run_distance(left: &str, right: &str) -> Result<()> {
    let left_print = Fingerprint::from_hex(left)?;
    let right_print = Fingerprint::from_hex(right)?;
    let distance = left_print.distance(&right_print)?;
    println!("{}", distance);
    Ok(())
}

/// Expand files and directory trees into a flat file list.
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
            {
                files.push(entry.into_path());
            }
        } else {
            files.push(path.clone());
        }
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_maps_to_core() {
        assert_eq!(
            CoreAlgorithm::from(Algorithm::Blockhash),
            CoreAlgorithm::Blockhash
        );
        assert_eq!(CoreAlgorithm::from(Algorithm::Sha256), CoreAlgorithm::Sha256);
    }

    #[test]
    fn collect_files_keeps_plain_files() {
        let files = collect_files(&[PathBuf::from("/no/such/file.jpg")]);
        assert_eq!(files, vec![PathBuf::from("/no/such/file.jpg")]);
    }

    #[test]
    fn cli_parses_hash_command() {
        let cli = Cli::try_parse_from([
            "blockprint",
            "hash",
            "photo.jpg",
            "--algorithm",
            "sha256",
            "--output",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Hash {
                paths, algorithm, ..
            } => {
                assert_eq!(paths, vec![PathBuf::from("photo.jpg")]);
                assert!(matches!(algorithm, Algorithm::Sha256));
            }
            _ => panic!("expected hash command"),
        }
    }

    #[test]
    fn cli_parses_distance_command() {
        let cli = Cli::try_parse_from(["blockprint", "distance", "deadbeef", "beefca47"]).unwrap();
        match cli.command {
            Commands::Distance { left, right } => {
                assert_eq!(left, "deadbeef");
                assert_eq!(right, "beefca47");
            }
            _ => panic!("expected distance command"),
        }
    }
}
