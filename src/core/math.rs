pub mod aabb;
pub mod interpolation;
pub mod numeric;
pub mod transform;
pub mod vector;
