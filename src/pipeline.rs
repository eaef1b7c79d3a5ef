pub mod passes;
pub mod renderer;
