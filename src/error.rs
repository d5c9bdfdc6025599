use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
	/// An attribute in metadata.json declared a size of zero or less.
	#[error("attribute '{name}' has invalid size {size}")]
	Schema { name: String, size: i64 },

	/// The schema cannot hold the fields the output record needs.
	#[error("schema layout error: {0}")]
	SchemaLayout(String),

	#[error("failed to parse metadata {}: {source}", .path.display())]
	Metadata {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("i/o error on {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Chunk length is not a multiple of the record stride.
	#[error("chunk {} is {len} bytes, not a multiple of the {stride} byte stride", .path.display())]
	MalformedChunk {
		path: PathBuf,
		len: u64,
		stride: usize,
	},

	#[error("chunk {} is {len} bytes, above the {limit} byte limit", .path.display())]
	ChunkTooLarge { path: PathBuf, len: u64, limit: u64 },

	#[error("invalid las header: {0}")]
	InvalidHeader(String),

	#[error("failed to start worker pool: {0}")]
	ThreadPool(#[from] rayon::ThreadPoolBuildError),

	#[error("conversion cancelled")]
	Cancelled,
}

impl Error {
	pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
		Error::Io {
			path: path.into(),
			source,
		}
	}
}
