pub mod core;

pub mod prelude {
    pub use crate::core::app::{App, AppConfig, AppContext, AppError, Application, FreeFlyKeys};
    pub use crate::core::platform::driver::GlDriver;
    pub use crate::core::rendering::camera::Camera;
    pub use crate::core::rendering::render_state::GlContext;
    pub use crate::core::rendering::shader::{Shader, ShaderError, ShaderStage};
    pub use crate::core::rendering::texture::{
        Texture, TextureFiltering, TextureOptions, TextureWrapping,
    };
    pub use crate::core::rendering::texture_cube::TextureCube;
    pub use crate::core::rendering::uniform::UniformValue;
    pub use crate::core::rendering::vertex_layout::{ShaderDataType, VertexAttribute, VertexLayout};
}

#[cfg(test)]
mod tests;
