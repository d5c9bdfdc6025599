use crate::error::{Error, Result};
use crate::model::attributes::Attributes;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

pub const CHUNK_EXTENSION: &str = ".bin";

/// A chunk file loaded into memory, `data.len()` is a whole number of records.
pub struct Chunk {
	pub path: PathBuf,
	pub data: Vec<u8>,
	pub num_points: u64,
}

/// All `*.bin` files in `dir`, sorted by file name.
pub fn list_chunks(dir: &Path) -> Result<Vec<PathBuf>> {
	let mut chunks = Vec::new();
	for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
		let entry = entry.map_err(|e| Error::io(dir, e))?;
		let path = entry.path();
		let is_chunk = path
			.file_name()
			.and_then(|name| name.to_str())
			.map_or(false, |name| name.ends_with(CHUNK_EXTENSION));
		if is_chunk && path.is_file() {
			chunks.push(path);
		}
	}
	chunks.sort();

	Ok(chunks)
}

pub fn read_chunk(path: &Path, attributes: &Attributes, max_bytes: Option<u64>) -> Result<Chunk> {
	if let Some(limit) = max_bytes {
		let len = fs::metadata(path).map_err(|e| Error::io(path, e))?.len();
		if len > limit {
			return Err(Error::ChunkTooLarge {
				path: path.to_path_buf(),
				len,
				limit,
			});
		}
	}

	let data = fs::read(path).map_err(|e| Error::io(path, e))?;
	let num_points = count_points(path, data.len() as u64, attributes.bytes)?;
	debug!("read {} points from {}", num_points, path.display());

	Ok(Chunk {
		path: path.to_path_buf(),
		data,
		num_points,
	})
}

/// A partial trailing record is an error, never truncated away.
pub fn count_points(path: &Path, len: u64, stride: usize) -> Result<u64> {
	if stride == 0 || len % stride as u64 != 0 {
		return Err(Error::MalformedChunk {
			path: path.to_path_buf(),
			len,
			stride,
		});
	}

	Ok(len / stride as u64)
}

#[cfg(test)]
mod tests {
	use super::{count_points, list_chunks, read_chunk};
	use crate::error::Error;
	use crate::model::attributes::Attributes;
	use crate::model::metadata::Attribute;
	use std::fs;
	use std::path::Path;

	fn attributes() -> Attributes {
		Attributes::parse(&[
			Attribute::new("position", 12),
			Attribute::new("intensity", 2),
			Attribute::new("classification", 1),
			Attribute::new("rgb", 6),
		])
		.unwrap()
	}

	#[test]
	fn it_counts_whole_records() {
		let path = Path::new("r.bin");
		assert_eq!(count_points(path, 63, 21).unwrap(), 3);
		assert_eq!(count_points(path, 0, 21).unwrap(), 0);
		assert!(matches!(
			count_points(path, 62, 21),
			Err(Error::MalformedChunk { len: 62, stride: 21, .. })
		));
	}

	#[test]
	fn it_reads_chunks() -> Result<(), Box<dyn std::error::Error>> {
		let dir = tempfile::tempdir()?;
		let good = dir.path().join("r0.bin");
		let bad = dir.path().join("r1.bin");
		fs::write(&good, vec![7u8; 63])?;
		fs::write(&bad, vec![7u8; 62])?;

		let chunk = read_chunk(&good, &attributes(), None)?;
		assert_eq!(chunk.num_points, 3);
		assert_eq!(chunk.data.len(), 63);

		assert!(matches!(
			read_chunk(&bad, &attributes(), None),
			Err(Error::MalformedChunk { .. })
		));
		assert!(matches!(
			read_chunk(&dir.path().join("r2.bin"), &attributes(), None),
			Err(Error::Io { .. })
		));

		Ok(())
	}

	#[test]
	fn it_refuses_chunks_above_the_limit() -> Result<(), Box<dyn std::error::Error>> {
		let dir = tempfile::tempdir()?;
		let path = dir.path().join("r0.bin");
		fs::write(&path, vec![0u8; 42])?;

		assert!(read_chunk(&path, &attributes(), Some(42)).is_ok());
		match read_chunk(&path, &attributes(), Some(21)) {
			Err(Error::ChunkTooLarge { len, limit, .. }) => {
				assert_eq!(len, 42);
				assert_eq!(limit, 21);
			}
			_ => panic!("expected ChunkTooLarge"),
		}

		Ok(())
	}

	#[test]
	fn it_lists_bin_files_only() -> Result<(), Box<dyn std::error::Error>> {
		let dir = tempfile::tempdir()?;
		for name in ["r06.bin", "r0.bin", "metadata.json", "r0.bin.las", "notes.txt"] {
			fs::write(dir.path().join(name), b"")?;
		}
		fs::create_dir(dir.path().join("nested.bin"))?;

		let names: Vec<String> = list_chunks(dir.path())?
			.iter()
			.map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
			.collect();
		assert_eq!(names, vec!["r0.bin", "r06.bin"]);

		Ok(())
	}
}
