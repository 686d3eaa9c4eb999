use std::num::NonZeroU32;

use crate::core::rendering::shader::ShaderStage;
use crate::core::rendering::uniform::UniformValue;

pub type ProgramId = NonZeroU32;
pub type ShaderObjectId = NonZeroU32;
pub type TextureId = NonZeroU32;
pub type VertexArrayId = NonZeroU32;
pub type UniformLocation = u32;
pub type AttributeSlot = u32;

/// Everything the wrapper needs from the graphics driver.
///
/// Each method maps to exactly one driver call, so an implementation that
/// records its calls (see [HeadlessDriver](crate::core::platform::headless::HeadlessDriver))
/// can be used to check how many calls the caching layers let through.
///
/// Implementations are not expected to be thread safe: a driver belongs to
/// the thread that owns the GL context.
pub trait GlDriver {
    // Programs
    fn create_program(&self) -> Result<ProgramId, String>;
    fn delete_program(&self, program: ProgramId);
    fn link_program(&self, program: ProgramId);
    fn get_program_link_status(&self, program: ProgramId) -> bool;
    fn get_program_info_log(&self, program: ProgramId) -> String;
    fn use_program(&self, program: Option<ProgramId>);

    // Shader objects
    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderObjectId, String>;
    fn delete_shader(&self, shader: ShaderObjectId);
    fn shader_source(&self, shader: ShaderObjectId, source: &str);
    fn compile_shader(&self, shader: ShaderObjectId);
    fn get_shader_compile_status(&self, shader: ShaderObjectId) -> bool;
    fn get_shader_info_log(&self, shader: ShaderObjectId) -> String;
    fn attach_shader(&self, program: ProgramId, shader: ShaderObjectId);

    // Attributes and uniforms
    fn bind_attrib_location(&self, program: ProgramId, slot: AttributeSlot, name: &str);
    fn get_attrib_location(&self, program: ProgramId, name: &str) -> Option<AttributeSlot>;
    fn get_uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn upload_uniform(&self, location: UniformLocation, value: &UniformValue, transpose: bool);
    fn enable_vertex_attrib_array(&self, slot: AttributeSlot);
    fn vertex_attrib_pointer_f32(
        &self,
        slot: AttributeSlot,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );

    // Vertex arrays and draws
    fn create_vertex_array(&self) -> Result<VertexArrayId, String>;
    fn delete_vertex_array(&self, vertex_array: VertexArrayId);
    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>);
    fn draw_arrays(&self, mode: u32, first: i32, count: i32);

    // Textures
    fn create_texture(&self) -> Result<TextureId, String>;
    fn delete_texture(&self, texture: TextureId);
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: u32, texture: Option<TextureId>);
    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: u32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        pixel_type: u32,
        pixels: Option<&[u8]>,
    );
    fn generate_mipmap(&self, target: u32);

    // Fixed function state
    fn set_capability(&self, capability: u32, enabled: bool);
    fn blend_func(&self, src: u32, dst: u32);
    fn depth_mask(&self, write: bool);
    fn depth_func(&self, func: u32);
    fn cull_face(&self, mode: u32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&self, mask: u32);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
}
