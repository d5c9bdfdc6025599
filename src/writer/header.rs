use crate::error::{Error, Result};
use crate::model::metadata::ChunkingMetadata;
use crate::model::vector3::Vector3;
use crate::writer::record::RecordFormat;
use byteorder::{ByteOrder, LittleEndian};
use std::io::Write;

pub const HEADER_SIZE: usize = 375;
pub const SIGNATURE: &[u8; 4] = b"LASF";

const VERSION: (u8, u8) = (1, 4);

const VERSION_MAJOR: usize = 24;
const VERSION_MINOR: usize = 25;
const HEADER_SIZE_FIELD: usize = 94;
const OFFSET_TO_POINT_DATA: usize = 96;
const POINT_FORMAT: usize = 104;
const POINT_RECORD_LENGTH: usize = 105;
const SCALE: usize = 131;
const OFFSET: usize = 155;
// max x, min x, max y, min y, max z, min z
const BOUNDS: usize = 179;
const POINT_COUNT: usize = 247;

/// The fields of a LAS 1.4 header this tool fills in. Everything else in
/// the 375 bytes is zero.
#[derive(Clone, Debug, PartialEq)]
pub struct LasHeader {
	pub version: (u8, u8),
	pub header_size: u16,
	pub offset_to_point_data: u32,
	pub point_format: u8,
	pub point_record_length: u16,
	pub scale: Vector3,
	pub offset: Vector3,
	pub min: Vector3,
	pub max: Vector3,
	pub point_count: u64,
}

impl LasHeader {
	pub fn new(metadata: &ChunkingMetadata, point_count: u64, format: RecordFormat) -> LasHeader {
		LasHeader {
			version: VERSION,
			header_size: HEADER_SIZE as u16,
			offset_to_point_data: HEADER_SIZE as u32,
			point_format: format.format_code(),
			point_record_length: format.record_length() as u16,
			scale: metadata.scale,
			offset: metadata.offset,
			min: metadata.min,
			max: metadata.max,
			point_count,
		}
	}

	pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
		let mut buffer = [0u8; HEADER_SIZE];

		buffer[..4].copy_from_slice(SIGNATURE);
		buffer[VERSION_MAJOR] = self.version.0;
		buffer[VERSION_MINOR] = self.version.1;
		LittleEndian::write_u16(&mut buffer[HEADER_SIZE_FIELD..], self.header_size);
		LittleEndian::write_u32(&mut buffer[OFFSET_TO_POINT_DATA..], self.offset_to_point_data);
		buffer[POINT_FORMAT] = self.point_format;
		LittleEndian::write_u16(&mut buffer[POINT_RECORD_LENGTH..], self.point_record_length);

		LittleEndian::write_f64_into(&self.scale.to_array(), &mut buffer[SCALE..SCALE + 24]);
		LittleEndian::write_f64_into(&self.offset.to_array(), &mut buffer[OFFSET..OFFSET + 24]);

		let (max, min) = (self.max.to_array(), self.min.to_array());
		let bounds = [max[0], min[0], max[1], min[1], max[2], min[2]];
		LittleEndian::write_f64_into(&bounds, &mut buffer[BOUNDS..BOUNDS + 48]);

		LittleEndian::write_u64(&mut buffer[POINT_COUNT..], self.point_count);

		buffer
	}

	pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
		writer.write_all(&self.to_bytes())
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<LasHeader> {
		if bytes.len() < HEADER_SIZE {
			return Err(Error::InvalidHeader(format!(
				"expected {} bytes, got {}",
				HEADER_SIZE,
				bytes.len()
			)));
		}
		if &bytes[..4] != SIGNATURE {
			return Err(Error::InvalidHeader(format!("bad signature {:?}", &bytes[..4])));
		}

		let mut bounds = [0.0; 6];
		LittleEndian::read_f64_into(&bytes[BOUNDS..BOUNDS + 48], &mut bounds);

		Ok(LasHeader {
			version: (bytes[VERSION_MAJOR], bytes[VERSION_MINOR]),
			header_size: LittleEndian::read_u16(&bytes[HEADER_SIZE_FIELD..]),
			offset_to_point_data: LittleEndian::read_u32(&bytes[OFFSET_TO_POINT_DATA..]),
			point_format: bytes[POINT_FORMAT],
			point_record_length: LittleEndian::read_u16(&bytes[POINT_RECORD_LENGTH..]),
			scale: read_vector3(&bytes[SCALE..]),
			offset: read_vector3(&bytes[OFFSET..]),
			max: Vector3::new(bounds[0], bounds[2], bounds[4]),
			min: Vector3::new(bounds[1], bounds[3], bounds[5]),
			point_count: LittleEndian::read_u64(&bytes[POINT_COUNT..]),
		})
	}
}

fn read_vector3(bytes: &[u8]) -> Vector3 {
	let mut xyz = [0.0; 3];
	LittleEndian::read_f64_into(&bytes[..24], &mut xyz);
	xyz.into()
}

#[cfg(test)]
mod tests {
	use super::{LasHeader, HEADER_SIZE};
	use crate::error::Error;
	use crate::model::metadata::{Attribute, ChunkingMetadata};
	use crate::model::vector3::Vector3;
	use crate::writer::record::RecordFormat;
	use byteorder::{ByteOrder, LittleEndian};

	fn metadata() -> ChunkingMetadata {
		ChunkingMetadata {
			scale: Vector3::new(0.001, 0.002, 0.004),
			offset: Vector3::new(1000.0, 2000.0, -30.5),
			min: Vector3::new(1000.0, 2000.0, -30.5),
			max: Vector3::new(1100.25, 2300.5, 12.75),
			attributes: vec![Attribute::new("position", 12), Attribute::new("rgb", 6)],
		}
	}

	fn f64_at(bytes: &[u8], offset: usize) -> f64 {
		LittleEndian::read_f64(&bytes[offset..offset + 8])
	}

	#[test]
	fn it_places_fields_at_las_offsets() {
		let bytes = LasHeader::new(&metadata(), 123_456, RecordFormat::PositionColor).to_bytes();

		assert_eq!(bytes.len(), 375);
		assert_eq!(&bytes[0..4], b"LASF");
		assert_eq!(bytes[24], 1);
		assert_eq!(bytes[25], 4);
		assert_eq!(LittleEndian::read_u16(&bytes[94..96]), 375);
		assert_eq!(LittleEndian::read_u32(&bytes[96..100]), 375);
		assert_eq!(bytes[104], 2);
		assert_eq!(LittleEndian::read_u16(&bytes[105..107]), 26);

		assert_eq!(f64_at(&bytes, 131), 0.001);
		assert_eq!(f64_at(&bytes, 139), 0.002);
		assert_eq!(f64_at(&bytes, 147), 0.004);
		assert_eq!(f64_at(&bytes, 155), 1000.0);
		assert_eq!(f64_at(&bytes, 163), 2000.0);
		assert_eq!(f64_at(&bytes, 171), -30.5);

		assert_eq!(f64_at(&bytes, 179), 1100.25);
		assert_eq!(f64_at(&bytes, 187), 1000.0);
		assert_eq!(f64_at(&bytes, 195), 2300.5);
		assert_eq!(f64_at(&bytes, 203), 2000.0);
		assert_eq!(f64_at(&bytes, 211), 12.75);
		assert_eq!(f64_at(&bytes, 219), -30.5);

		assert_eq!(LittleEndian::read_u64(&bytes[247..255]), 123_456);
	}

	#[test]
	fn unused_bytes_are_zero() {
		let bytes = LasHeader::new(&metadata(), 10, RecordFormat::PositionColor).to_bytes();
		let used = [0..4, 24..26, 94..100, 104..107, 131..227, 247..255];

		for (i, b) in bytes.iter().enumerate() {
			if !used.iter().any(|range| range.contains(&i)) {
				assert_eq!(*b, 0, "byte {} should be zero", i);
			}
		}
	}

	#[test]
	fn small_dataset_scenario() {
		let metadata = ChunkingMetadata {
			scale: Vector3::new(0.001, 0.001, 0.001),
			offset: Vector3::empty(),
			min: Vector3::empty(),
			max: Vector3::new(100.0, 100.0, 100.0),
			attributes: Vec::new(),
		};
		let bytes = LasHeader::new(&metadata, 10, RecordFormat::PositionColor).to_bytes();

		assert_eq!(LittleEndian::read_u64(&bytes[247..255]), 10);
		assert_eq!(f64_at(&bytes, 131), 0.001);
	}

	#[test]
	fn it_decodes_what_it_encodes() {
		let header = LasHeader::new(&metadata(), 42, RecordFormat::PositionColor);
		let decoded = LasHeader::from_bytes(&header.to_bytes()).unwrap();

		assert_eq!(decoded, header);
		assert_eq!(decoded.min, metadata().min);
		assert_eq!(decoded.max, metadata().max);
	}

	#[test]
	fn it_rejects_foreign_bytes() {
		assert!(matches!(LasHeader::from_bytes(&[0u8; 100]), Err(Error::InvalidHeader(_))));

		let mut bytes = [0u8; HEADER_SIZE];
		bytes[..4].copy_from_slice(b"PLY\n");
		assert!(matches!(LasHeader::from_bytes(&bytes), Err(Error::InvalidHeader(_))));
	}

	#[test]
	fn write_to_emits_the_full_header() {
		let header = LasHeader::new(&metadata(), 1, RecordFormat::PositionColor);
		let mut out = Vec::new();
		header.write_to(&mut out).unwrap();

		assert_eq!(out.len(), HEADER_SIZE);
		assert_eq!(&out[..], &header.to_bytes()[..]);
	}
}
