use crate::error::{Error, Result};
use crate::model::vector3::Vector3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One entry of the `attributes` array in the chunker's metadata.json.
///
/// Only `name` and `size` take part in the record layout, the rest is
/// descriptive and may be missing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
	pub name: String,
	#[serde(default)]
	pub description: String,
	pub size: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub num_elements: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub element_size: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub r#type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min: Option<Vec<f64>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max: Option<Vec<f64>>,
}

impl Attribute {
	pub fn new(name: &str, size: i64) -> Attribute {
		Attribute {
			name: name.to_string(),
			description: "".to_string(),
			size,
			num_elements: None,
			element_size: None,
			r#type: None,
			min: None,
			max: None,
		}
	}
}

/// Dataset description written next to the chunks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkingMetadata {
	pub min: Vector3,
	pub max: Vector3,
	pub offset: Vector3,
	pub scale: Vector3,
	pub attributes: Vec<Attribute>,
}

impl ChunkingMetadata {
	pub fn from_json(json: &str, path: &Path) -> Result<ChunkingMetadata> {
		serde_json::from_str(json).map_err(|source| Error::Metadata {
			path: path.to_path_buf(),
			source,
		})
	}
}

pub fn read_metadata(path: &Path) -> Result<ChunkingMetadata> {
	let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
	ChunkingMetadata::from_json(&contents, path)
}
