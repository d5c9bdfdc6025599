use crate::error::{Error, Result};
use crate::model::attributes::Attributes;
use crate::model::metadata::{read_metadata, ChunkingMetadata};
use crate::reader::{list_chunks, read_chunk};
use crate::writer::header::LasHeader;
use crate::writer::record::{transcode, RecordFormat};
use crate::writer::{output_path_for, write_las};
use log::{error, info};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const METADATA_FILE: &str = "metadata.json";

/// Everything a conversion run needs. Nothing is read from globals.
#[derive(Clone, Debug)]
pub struct Config {
	/// Directory holding the chunk files.
	pub chunk_dir: PathBuf,
	/// Defaults to `<chunk_dir>/metadata.json`.
	pub metadata: Option<PathBuf>,
	/// Defaults to writing next to each chunk.
	pub output_dir: Option<PathBuf>,
	/// File names inside `chunk_dir`; empty converts every `*.bin`.
	pub chunks: Vec<String>,
	/// `None` uses rayon's global pool, `Some(1)` converts sequentially.
	pub threads: Option<usize>,
	/// Chunks larger than this are refused before being loaded.
	pub max_chunk_bytes: Option<u64>,
	pub write_retries: u32,
	pub format: RecordFormat,
}

impl Config {
	pub fn new(chunk_dir: impl Into<PathBuf>) -> Config {
		Config {
			chunk_dir: chunk_dir.into(),
			metadata: None,
			output_dir: None,
			chunks: Vec::new(),
			threads: None,
			max_chunk_bytes: None,
			write_retries: 2,
			format: RecordFormat::PositionColor,
		}
	}

	pub fn metadata_path(&self) -> PathBuf {
		self.metadata
			.clone()
			.unwrap_or_else(|| self.chunk_dir.join(METADATA_FILE))
	}
}

/// Shared flag, checked before each chunk starts.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	pub fn new() -> CancelToken {
		CancelToken::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}

#[derive(Debug)]
pub enum ChunkOutcome {
	Converted { output: PathBuf, points: u64 },
	Failed(Error),
}

#[derive(Debug)]
pub struct ChunkReport {
	pub chunk: PathBuf,
	pub outcome: ChunkOutcome,
}

impl ChunkReport {
	pub fn is_ok(&self) -> bool {
		matches!(self.outcome, ChunkOutcome::Converted { .. })
	}
}

#[derive(Debug, Default)]
pub struct BatchSummary {
	pub reports: Vec<ChunkReport>,
}

impl BatchSummary {
	pub fn converted(&self) -> usize {
		self.reports.iter().filter(|r| r.is_ok()).count()
	}

	pub fn failed(&self) -> usize {
		self.reports.len() - self.converted()
	}

	pub fn total_points(&self) -> u64 {
		self.reports
			.iter()
			.map(|r| match r.outcome {
				ChunkOutcome::Converted { points, .. } => points,
				ChunkOutcome::Failed(_) => 0,
			})
			.sum()
	}

	pub fn all_converted(&self) -> bool {
		self.failed() == 0
	}
}

impl fmt::Display for BatchSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for report in &self.reports {
			match &report.outcome {
				ChunkOutcome::Converted { output, points } => writeln!(
					f,
					"ok     {} -> {} ({} points)",
					report.chunk.display(),
					output.display(),
					points
				)?,
				ChunkOutcome::Failed(e) => writeln!(f, "failed {}: {}", report.chunk.display(), e)?,
			}
		}
		write!(
			f,
			"{} converted, {} failed, {} points",
			self.converted(),
			self.failed(),
			self.total_points()
		)
	}
}

/// Metadata and schema shared read-only by every chunk of a run.
pub struct Dataset {
	pub metadata: ChunkingMetadata,
	pub attributes: Attributes,
}

impl Dataset {
	pub fn load(path: &Path) -> Result<Dataset> {
		let metadata = read_metadata(path)?;
		let attributes = Attributes::parse(&metadata.attributes)?;
		info!(
			"{}: {} attributes, {} bytes per point",
			path.display(),
			attributes.list.len(),
			attributes.bytes
		);

		Ok(Dataset {
			metadata,
			attributes,
		})
	}
}

pub fn run(config: &Config) -> Result<BatchSummary> {
	run_with_cancel(config, &CancelToken::new())
}

/// Converts every chunk of the run. Metadata, schema and chunk listing
/// errors abort; anything going wrong inside a chunk only fails that chunk.
pub fn run_with_cancel(config: &Config, cancel: &CancelToken) -> Result<BatchSummary> {
	let dataset = Dataset::load(&config.metadata_path())?;
	let chunks = chunk_paths(config)?;
	info!("converting {} chunks from {}", chunks.len(), config.chunk_dir.display());

	let convert = |chunk: &PathBuf| -> ChunkReport {
		let outcome = if cancel.is_cancelled() {
			ChunkOutcome::Failed(Error::Cancelled)
		} else {
			match convert_chunk(chunk, &dataset, config) {
				Ok((output, points)) => ChunkOutcome::Converted { output, points },
				Err(e) => {
					error!("{}: {}", chunk.display(), e);
					ChunkOutcome::Failed(e)
				}
			}
		};
		ChunkReport {
			chunk: chunk.to_path_buf(),
			outcome,
		}
	};

	let reports: Vec<ChunkReport> = match config.threads {
		Some(1) => chunks.iter().map(convert).collect(),
		Some(threads) => {
			let pool = rayon::ThreadPoolBuilder::new()
				.num_threads(threads)
				.build()?;
			pool.install(|| chunks.par_iter().map(convert).collect())
		}
		None => chunks.par_iter().map(convert).collect(),
	};

	let summary = BatchSummary { reports };
	info!(
		"{} chunks converted, {} failed",
		summary.converted(),
		summary.failed()
	);

	Ok(summary)
}

/// Loads, transcodes and writes one chunk. Returns the output path and point count.
pub fn convert_chunk(chunk: &Path, dataset: &Dataset, config: &Config) -> Result<(PathBuf, u64)> {
	let loaded = read_chunk(chunk, &dataset.attributes, config.max_chunk_bytes)?;
	let records = transcode(&loaded.data, &dataset.attributes, loaded.num_points, config.format)?;
	let header = LasHeader::new(&dataset.metadata, loaded.num_points, config.format);

	let output = output_path_for(chunk, config.output_dir.as_deref());
	write_las(&output, &header, &records, config.write_retries)?;
	info!("{} -> {} ({} points)", chunk.display(), output.display(), loaded.num_points);

	Ok((output, loaded.num_points))
}

// Each chunk once, so no two workers share an output or temp file.
fn chunk_paths(config: &Config) -> Result<Vec<PathBuf>> {
	if config.chunks.is_empty() {
		return list_chunks(&config.chunk_dir);
	}

	let mut seen = HashSet::new();
	Ok(config
		.chunks
		.iter()
		.map(|name| config.chunk_dir.join(name))
		.filter(|path| seen.insert(path.clone()))
		.collect())
}
