pub mod color;
pub mod palette;
pub mod renderer;
pub mod style;
