pub mod color;
pub mod framebuffer;
pub mod geometry;
pub mod intersect;
pub mod math;
pub mod rasterizer;
