use crate::error::{Error, Result};
use crate::model::attributes::{AttributeType, Attributes};
use log::{debug, warn};

const POSITION_BYTES: usize = 12;
const RGB_BYTES: usize = 6;

/// Layout of one point in the output file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordFormat {
	/// LAS point data record format 2. X, Y, Z as i32 at 0..12, the
	/// intensity/return/classification/scan angle/user data/point source
	/// block left zero at 12..20, R, G, B as u16 at 20..26.
	PositionColor,
}

impl RecordFormat {
	pub fn format_code(&self) -> u8 {
		match self {
			RecordFormat::PositionColor => 2,
		}
	}

	pub fn record_length(&self) -> usize {
		match self {
			RecordFormat::PositionColor => 26,
		}
	}

	fn color_offset(&self) -> usize {
		match self {
			RecordFormat::PositionColor => 20,
		}
	}
}

/// Where the fields a record format needs live inside a source record.
struct SourceLayout {
	stride: usize,
	rgb: Option<usize>,
}

impl SourceLayout {
	fn resolve(attributes: &Attributes) -> Result<SourceLayout> {
		let stride = attributes.bytes;
		if stride < POSITION_BYTES {
			return Err(Error::SchemaLayout(format!(
				"record stride {} cannot hold a {} byte position",
				stride, POSITION_BYTES
			)));
		}

		if let Some(declared) = attributes.get("rgb") {
			if declared.size < RGB_BYTES {
				return Err(Error::SchemaLayout(format!(
					"rgb is {} bytes, need {}",
					declared.size, RGB_BYTES
				)));
			}
			if !matches!(declared.r#type, AttributeType::UINT16 | AttributeType::UNDEFINED) {
				warn!("rgb declared as {:?}, copying its first {} bytes as u16", declared.r#type, RGB_BYTES);
			}
		}

		let rgb = attributes.offset_of("rgb");
		if let Some(offset) = rgb {
			if offset + RGB_BYTES > stride {
				return Err(Error::SchemaLayout(format!(
					"rgb at offset {} overruns the {} byte record",
					offset, stride
				)));
			}
		}

		Ok(SourceLayout { stride, rgb })
	}
}

/// Re-projects `num_points` source records into `format` records.
///
/// Positions are copied as-is: the chunk's integer coordinates must already
/// be encoded with the scale and offset that go into the header. A schema
/// without `rgb` yields zero colors.
pub fn transcode(
	data: &[u8],
	attributes: &Attributes,
	num_points: u64,
	format: RecordFormat,
) -> Result<Vec<u8>> {
	let layout = SourceLayout::resolve(attributes)?;
	let record_length = format.record_length();
	let too_many = || {
		Error::SchemaLayout(format!(
			"{} bytes cannot hold {} records of {} bytes",
			data.len(),
			num_points,
			layout.stride
		))
	};

	let num_points = usize::try_from(num_points).map_err(|_| too_many())?;
	let source_len = num_points.checked_mul(layout.stride).ok_or_else(&too_many)?;
	if data.len() < source_len {
		return Err(too_many());
	}
	let target_len = num_points.checked_mul(record_length).ok_or_else(&too_many)?;
	if layout.rgb.is_none() {
		debug!("schema has no rgb attribute, writing black points");
	}

	let mut records = vec![0u8; target_len];
	for (source, target) in data
		.chunks_exact(layout.stride)
		.zip(records.chunks_exact_mut(record_length))
	{
		match format {
			RecordFormat::PositionColor => {
				target[..POSITION_BYTES].copy_from_slice(&source[..POSITION_BYTES]);

				if let Some(rgb) = layout.rgb {
					let color = format.color_offset();
					target[color..color + RGB_BYTES].copy_from_slice(&source[rgb..rgb + RGB_BYTES]);
				}
			}
		}
	}

	Ok(records)
}
