use serde::{Deserialize, Serialize};

/// Three doubles, stored in metadata.json as `[x, y, z]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vector3 {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl Vector3 {
	pub fn new(x: f64, y: f64, z: f64) -> Vector3 {
		Vector3 { x, y, z }
	}

	pub fn empty() -> Vector3 {
		Vector3 {
			x: 0.0,
			y: 0.0,
			z: 0.0,
		}
	}

	pub fn to_array(&self) -> [f64; 3] {
		[self.x, self.y, self.z]
	}
}

impl From<[f64; 3]> for Vector3 {
	fn from(xyz: [f64; 3]) -> Vector3 {
		Vector3 {
			x: xyz[0],
			y: xyz[1],
			z: xyz[2],
		}
	}
}

impl From<Vector3> for [f64; 3] {
	fn from(v: Vector3) -> [f64; 3] {
		v.to_array()
	}
}
