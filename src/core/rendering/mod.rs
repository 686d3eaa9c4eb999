pub mod camera;
pub mod render_state;
pub mod shader;
pub mod texture;
pub mod texture_cube;
pub mod uniform;
pub mod vertex_layout;
