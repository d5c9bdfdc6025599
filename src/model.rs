pub mod attributes;
pub mod metadata;
pub mod vector3;
