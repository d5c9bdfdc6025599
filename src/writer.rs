pub mod header;
pub mod record;

use crate::error::{Error, Result};
use crate::writer::header::{LasHeader, HEADER_SIZE};
use log::warn;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const LAS_EXTENSION: &str = "las";

/// `r060.bin` becomes `r060.bin.las`, placed next to the chunk or in `output_dir`.
pub fn output_path_for(chunk: &Path, output_dir: Option<&Path>) -> PathBuf {
	let mut name = chunk.file_name().map(|n| n.to_os_string()).unwrap_or_default();
	name.push(".");
	name.push(LAS_EXTENSION);

	match output_dir {
		Some(dir) => dir.join(name),
		None => chunk.with_file_name(name),
	}
}

/// Writes header then records into `path`, going through `<path>.tmp` so a
/// failed write never leaves a truncated file under the final name.
///
/// Interrupted and timed out writes are retried up to `retries` more times.
/// Returns the number of bytes written.
pub fn write_las(path: &Path, header: &LasHeader, records: &[u8], retries: u32) -> Result<u64> {
	let expected = (HEADER_SIZE + records.len()) as u64;
	write_with(path, expected, retries, |tmp_path| write_file(tmp_path, header, records))?;

	Ok(expected)
}

/// Runs `write` against the temp path until the file holds `expected` bytes,
/// then moves it over `path`. The temp file never outlives a failure.
fn write_with<F>(path: &Path, expected: u64, retries: u32, mut write: F) -> Result<()>
where
	F: FnMut(&Path) -> std::io::Result<()>,
{
	let tmp_path = tmp_path_for(path);

	let mut attempt = 0;
	loop {
		match write(&tmp_path).and_then(|()| check_length(&tmp_path, expected)) {
			Ok(()) => break,
			Err(e) if is_transient(&e) && attempt < retries => {
				attempt += 1;
				warn!(
					"write to {} failed ({}), retry {}/{}",
					tmp_path.display(),
					e,
					attempt,
					retries
				);
			}
			Err(e) => {
				let _ = fs::remove_file(&tmp_path);
				return Err(Error::io(&tmp_path, e));
			}
		}
	}

	fs::rename(&tmp_path, path).map_err(|e| {
		let _ = fs::remove_file(&tmp_path);
		Error::io(path, e)
	})
}

fn write_file(path: &Path, header: &LasHeader, records: &[u8]) -> std::io::Result<()> {
	let mut writer = BufWriter::new(File::create(path)?);
	header.write_to(&mut writer)?;
	writer.write_all(records)?;
	let file = writer.into_inner().map_err(|e| e.into_error())?;
	file.sync_all()
}

fn check_length(path: &Path, expected: u64) -> std::io::Result<()> {
	let written = fs::metadata(path)?.len();
	if written != expected {
		return Err(std::io::Error::new(
			ErrorKind::Other,
			format!("wrote {} bytes, expected {}", written, expected),
		));
	}

	Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
	let mut name = path.as_os_str().to_os_string();
	name.push(".tmp");
	PathBuf::from(name)
}

fn is_transient(e: &std::io::Error) -> bool {
	matches!(
		e.kind(),
		ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
	)
}
