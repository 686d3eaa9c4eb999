pub mod driver;
pub mod headless;
pub mod opengl;
