pub mod glow_driver;

pub use glow_driver::GlowDriver;
