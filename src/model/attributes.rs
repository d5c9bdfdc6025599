use crate::error::{Error, Result};
use crate::model::metadata;
use log::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeType {
	INT8 = 0,
	INT16 = 1,
	INT32 = 2,
	INT64 = 3,

	UINT8 = 10,
	UINT16 = 11,
	UINT32 = 12,
	UINT64 = 13,

	FLOAT = 20,
	DOUBLE = 21,

	UNDEFINED = 123456,
}

impl AttributeType {
	/// Maps the type names used in metadata.json.
	pub fn from_name(name: &str) -> AttributeType {
		match name {
			"int8" => AttributeType::INT8,
			"int16" => AttributeType::INT16,
			"int32" => AttributeType::INT32,
			"int64" => AttributeType::INT64,
			"uint8" => AttributeType::UINT8,
			"uint16" => AttributeType::UINT16,
			"uint32" => AttributeType::UINT32,
			"uint64" => AttributeType::UINT64,
			"float" => AttributeType::FLOAT,
			"double" => AttributeType::DOUBLE,
			_ => AttributeType::UNDEFINED,
		}
	}

	pub fn byte_size(&self) -> Option<usize> {
		match self {
			AttributeType::INT8 | AttributeType::UINT8 => Some(1),
			AttributeType::INT16 | AttributeType::UINT16 => Some(2),
			AttributeType::INT32 | AttributeType::UINT32 | AttributeType::FLOAT => Some(4),
			AttributeType::INT64 | AttributeType::UINT64 | AttributeType::DOUBLE => Some(8),
			AttributeType::UNDEFINED => None,
		}
	}
}

#[derive(Clone, Debug)]
pub struct Attribute {
	pub name: String,
	pub size: usize,
	pub r#type: AttributeType,
}

/// Byte layout of one point record in a chunk.
///
/// Attribute order defines the offsets; `bytes` is the record stride.
#[derive(Clone, Debug)]
pub struct Attributes {
	pub list: Vec<Attribute>,
	pub bytes: usize,
}

impl Attributes {
	pub fn parse(descriptors: &[metadata::Attribute]) -> Result<Attributes> {
		let mut list = Vec::with_capacity(descriptors.len());
		let mut bytes: usize = 0;

		for descriptor in descriptors {
			if descriptor.size <= 0 {
				return Err(Error::Schema {
					name: descriptor.name.to_string(),
					size: descriptor.size,
				});
			}
			let size = usize::try_from(descriptor.size).map_err(|_| {
				Error::SchemaLayout(format!(
					"attribute '{}' size {} does not fit in memory",
					descriptor.name, descriptor.size
				))
			})?;
			let r#type = descriptor
				.r#type
				.as_deref()
				.map(AttributeType::from_name)
				.unwrap_or(AttributeType::UNDEFINED);

			check_element_layout(descriptor, r#type);

			list.push(Attribute {
				name: descriptor.name.to_string(),
				size,
				r#type,
			});
			bytes = bytes.checked_add(size).ok_or_else(|| {
				Error::SchemaLayout(format!(
					"record stride overflows at attribute '{}'",
					descriptor.name
				))
			})?;
		}

		Ok(Attributes { list, bytes })
	}

	/// Offset of the first attribute called `name` within a record.
	pub fn offset_of(&self, name: &str) -> Option<usize> {
		let mut offset = 0;

		for attribute in &self.list {
			if attribute.name == name {
				return Some(offset);
			}

			offset += attribute.size;
		}

		None
	}

	pub fn get(&self, name: &str) -> Option<&Attribute> {
		self.list.iter().find(|attribute| attribute.name == name)
	}
}

// Layout always follows `size`; a disagreeing element description only gets reported.
fn check_element_layout(descriptor: &metadata::Attribute, r#type: AttributeType) {
	if let (Some(num_elements), Some(element_size)) = (descriptor.num_elements, descriptor.element_size) {
		match num_elements.checked_mul(element_size) {
			Some(total) if total == descriptor.size => {}
			Some(_) => warn!(
				"attribute '{}': {} x {} bytes does not match size {}",
				descriptor.name, num_elements, element_size, descriptor.size
			),
			None => warn!(
				"attribute '{}': {} x {} bytes overflows",
				descriptor.name, num_elements, element_size
			),
		}
		if let Some(type_size) = r#type.byte_size() {
			if type_size as i64 != element_size {
				warn!(
					"attribute '{}': element size {} does not match type {:?}",
					descriptor.name, element_size, r#type
				);
			}
		}
	}
}
