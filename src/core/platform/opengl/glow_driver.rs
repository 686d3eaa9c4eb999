use glow::{
    HasContext, NativeProgram, NativeShader, NativeTexture, NativeUniformLocation, NativeVertexArray,
};
#[cfg(debug_assertions)]
use log::error;
use log::info;

use crate::core::platform::driver::{
    AttributeSlot, GlDriver, ProgramId, ShaderObjectId, TextureId, UniformLocation,
    VertexArrayId,
};
use crate::core::rendering::shader::ShaderStage;
use crate::core::rendering::uniform::UniformValue;

/// Run a glow call. Debug builds then report every error flag the call
/// raised, tagged with the call name.
macro_rules! gl_check {
    ($driver:expr, $call:literal, $stmt:expr) => {{
        let result = unsafe { $stmt };
        #[cfg(debug_assertions)]
        $driver.check_errors($call);
        result
    }};
}

/// A lost context keeps returning its error, stop reading flags after this
#[cfg(debug_assertions)]
const MAX_REPORTED_ERRORS: usize = 8;

/// Name of an OpenGL error code, as returned by `glGetError`
pub fn gl_error_name(code: u32) -> &'static str {
    match code {
        glow::NO_ERROR => "NO_ERROR",
        glow::INVALID_ENUM => "INVALID_ENUM",
        glow::INVALID_VALUE => "INVALID_VALUE",
        glow::INVALID_OPERATION => "INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "OUT_OF_MEMORY",
        glow::STACK_UNDERFLOW => "STACK_UNDERFLOW",
        glow::STACK_OVERFLOW => "STACK_OVERFLOW",
        glow::CONTEXT_LOST => "CONTEXT_LOST",
        _ => "UNKNOWN_ERROR",
    }
}

/// [GlDriver] implementation backed by a glow context.
///
/// Note that the glow context is only valid on the thread where its GL
/// context was made current. The driver is `!Sync` through glow, and the
/// wrapper keeps it behind an `Rc`, so it can't leave that thread.
///
/// In debug builds every call is followed by a `glGetError` check, and the
/// errors found are logged with the name of the call.
pub struct GlowDriver {
    gl: glow::Context,
}

impl GlowDriver {
    pub fn new(gl: glow::Context) -> Self {
        let driver = GlowDriver { gl };
        driver.log_driver_info();
        driver
    }

    #[inline(always)]
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    #[inline(always)]
    fn get_string(&self, variant: u32) -> String {
        gl_check!(self, "get_parameter_string", self.gl.get_parameter_string(variant))
    }

    fn log_driver_info(&self) {
        info!("Glow OpenGL successfully initialized!");
        info!("\tOpenGL Version: {}", self.get_string(glow::VERSION));
        info!("\tOpenGL Renderer: {}", self.get_string(glow::RENDERER));
        info!("\tOpenGL Vendor: {}", self.get_string(glow::VENDOR));
    }

    #[cfg(debug_assertions)]
    fn check_errors(&self, call: &str) {
        for _ in 0..MAX_REPORTED_ERRORS {
            let code = unsafe { self.gl.get_error() };
            if code == glow::NO_ERROR {
                return;
            }
            error!(
                "OpenGL error {} ({:#06x}) after {}",
                gl_error_name(code),
                code,
                call
            );
        }
    }
}

impl GlDriver for GlowDriver {
    fn create_program(&self) -> Result<ProgramId, String> {
        gl_check!(
            self,
            "create_program",
            self.gl.create_program().map(|program| program.0)
        )
    }

    fn delete_program(&self, program: ProgramId) {
        gl_check!(self, "delete_program", self.gl.delete_program(NativeProgram(program)))
    }

    fn link_program(&self, program: ProgramId) {
        gl_check!(self, "link_program", self.gl.link_program(NativeProgram(program)))
    }

    fn get_program_link_status(&self, program: ProgramId) -> bool {
        gl_check!(
            self,
            "get_program_link_status",
            self.gl.get_program_link_status(NativeProgram(program))
        )
    }

    fn get_program_info_log(&self, program: ProgramId) -> String {
        gl_check!(
            self,
            "get_program_info_log",
            self.gl.get_program_info_log(NativeProgram(program))
        )
    }

    fn use_program(&self, program: Option<ProgramId>) {
        gl_check!(self, "use_program", self.gl.use_program(program.map(NativeProgram)))
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderObjectId, String> {
        gl_check!(
            self,
            "create_shader",
            self.gl.create_shader(stage.gl_kind()).map(|shader| shader.0)
        )
    }

    fn delete_shader(&self, shader: ShaderObjectId) {
        gl_check!(self, "delete_shader", self.gl.delete_shader(NativeShader(shader)))
    }

    fn shader_source(&self, shader: ShaderObjectId, source: &str) {
        gl_check!(
            self,
            "shader_source",
            self.gl.shader_source(NativeShader(shader), source)
        )
    }

    fn compile_shader(&self, shader: ShaderObjectId) {
        gl_check!(self, "compile_shader", self.gl.compile_shader(NativeShader(shader)))
    }

    fn get_shader_compile_status(&self, shader: ShaderObjectId) -> bool {
        gl_check!(
            self,
            "get_shader_compile_status",
            self.gl.get_shader_compile_status(NativeShader(shader))
        )
    }

    fn get_shader_info_log(&self, shader: ShaderObjectId) -> String {
        gl_check!(
            self,
            "get_shader_info_log",
            self.gl.get_shader_info_log(NativeShader(shader))
        )
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderObjectId) {
        gl_check!(
            self,
            "attach_shader",
            self.gl
                .attach_shader(NativeProgram(program), NativeShader(shader))
        )
    }

    fn bind_attrib_location(&self, program: ProgramId, slot: AttributeSlot, name: &str) {
        gl_check!(
            self,
            "bind_attrib_location",
            self.gl
                .bind_attrib_location(NativeProgram(program), slot, name)
        )
    }

    fn get_attrib_location(&self, program: ProgramId, name: &str) -> Option<AttributeSlot> {
        gl_check!(
            self,
            "get_attrib_location",
            self.gl.get_attrib_location(NativeProgram(program), name)
        )
    }

    fn get_uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        gl_check!(
            self,
            "get_uniform_location",
            self.gl
                .get_uniform_location(NativeProgram(program), name)
                .map(|location| location.0)
        )
    }

    fn upload_uniform(&self, location: UniformLocation, value: &UniformValue, transpose: bool) {
        let location = NativeUniformLocation(location);
        let location = Some(&location);
        let gl = &self.gl;

        gl_check!(
            self,
            "upload_uniform",
            match value {
                UniformValue::Int(x) => gl.uniform_1_i32(location, *x),
                UniformValue::Float(x) => gl.uniform_1_f32(location, *x),
                UniformValue::Vec2(v) => gl.uniform_2_f32(location, v.x, v.y),
                UniformValue::Vec3(v) => gl.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Vec4(v) => gl.uniform_4_f32(location, v.x, v.y, v.z, v.w),
                UniformValue::Mat2(m) => {
                    gl.uniform_matrix_2_f32_slice(location, transpose, &m.to_cols_array())
                }
                UniformValue::Mat3(m) => {
                    gl.uniform_matrix_3_f32_slice(location, transpose, &m.to_cols_array())
                }
                UniformValue::Mat4(m) => {
                    gl.uniform_matrix_4_f32_slice(location, transpose, &m.to_cols_array())
                }
            }
        )
    }

    fn enable_vertex_attrib_array(&self, slot: AttributeSlot) {
        gl_check!(
            self,
            "enable_vertex_attrib_array",
            self.gl.enable_vertex_attrib_array(slot)
        )
    }

    fn vertex_attrib_pointer_f32(
        &self,
        slot: AttributeSlot,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        gl_check!(
            self,
            "vertex_attrib_pointer_f32",
            self.gl
                .vertex_attrib_pointer_f32(slot, size, data_type, normalized, stride, offset)
        )
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        gl_check!(
            self,
            "create_vertex_array",
            self.gl.create_vertex_array().map(|vertex_array| vertex_array.0)
        )
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        gl_check!(
            self,
            "delete_vertex_array",
            self.gl.delete_vertex_array(NativeVertexArray(vertex_array))
        )
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        gl_check!(
            self,
            "bind_vertex_array",
            self.gl.bind_vertex_array(vertex_array.map(NativeVertexArray))
        )
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        gl_check!(self, "draw_arrays", self.gl.draw_arrays(mode, first, count))
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        gl_check!(
            self,
            "create_texture",
            self.gl.create_texture().map(|texture| texture.0)
        )
    }

    fn delete_texture(&self, texture: TextureId) {
        gl_check!(self, "delete_texture", self.gl.delete_texture(NativeTexture(texture)))
    }

    fn active_texture(&self, unit: u32) {
        gl_check!(self, "active_texture", self.gl.active_texture(glow::TEXTURE0 + unit))
    }

    fn bind_texture(&self, target: u32, texture: Option<TextureId>) {
        gl_check!(
            self,
            "bind_texture",
            self.gl.bind_texture(target, texture.map(NativeTexture))
        )
    }

    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        gl_check!(
            self,
            "tex_parameter_i32",
            self.gl.tex_parameter_i32(target, parameter, value)
        )
    }

    fn tex_image_2d(
        &self,
        target: u32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        pixel_type: u32,
        pixels: Option<&[u8]>,
    ) {
        gl_check!(
            self,
            "tex_image_2d",
            self.gl.tex_image_2d(
                target,
                0,
                internal_format,
                width,
                height,
                0,
                format,
                pixel_type,
                pixels,
            )
        )
    }

    fn generate_mipmap(&self, target: u32) {
        gl_check!(self, "generate_mipmap", self.gl.generate_mipmap(target))
    }

    fn set_capability(&self, capability: u32, enabled: bool) {
        if enabled {
            gl_check!(self, "enable", self.gl.enable(capability))
        } else {
            gl_check!(self, "disable", self.gl.disable(capability))
        }
    }

    fn blend_func(&self, src: u32, dst: u32) {
        gl_check!(self, "blend_func", self.gl.blend_func(src, dst))
    }

    fn depth_mask(&self, write: bool) {
        gl_check!(self, "depth_mask", self.gl.depth_mask(write))
    }

    fn depth_func(&self, func: u32) {
        gl_check!(self, "depth_func", self.gl.depth_func(func))
    }

    fn cull_face(&self, mode: u32) {
        gl_check!(self, "cull_face", self.gl.cull_face(mode))
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        gl_check!(self, "clear_color", self.gl.clear_color(r, g, b, a))
    }

    fn clear(&self, mask: u32) {
        gl_check!(self, "clear", self.gl.clear(mask))
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        gl_check!(self, "viewport", self.gl.viewport(x, y, width, height))
    }
}
