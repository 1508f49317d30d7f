pub mod bounding_box;
pub mod class_registry;
pub mod detection;
pub mod point;
