pub mod camera;
pub mod light;
pub mod loader;
pub mod material;
pub mod mesh;
pub mod primitive;
pub mod universe;
pub mod utils;
pub mod viewport;
