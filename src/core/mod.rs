pub mod app;
pub mod assets;
pub mod input;
pub mod platform;
pub mod rendering;
pub mod time;
