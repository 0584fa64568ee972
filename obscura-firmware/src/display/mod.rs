//! Caption rendering for the render host overlay

pub mod renderer;

pub use renderer::Renderer;
