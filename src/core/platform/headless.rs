use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::num::NonZeroU32;

use crate::core::platform::driver::{
    AttributeSlot, GlDriver, ProgramId, ShaderObjectId, TextureId, UniformLocation,
    VertexArrayId,
};
use crate::core::rendering::shader::ShaderStage;
use crate::core::rendering::uniform::UniformValue;

/// A driver call, as seen by the [HeadlessDriver].
///
/// Status and info log queries are not recorded, they don't change the
/// driver state.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    CreateProgram(ProgramId),
    DeleteProgram(ProgramId),
    LinkProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    CreateShader(ShaderStage, ShaderObjectId),
    DeleteShader(ShaderObjectId),
    ShaderSource(ShaderObjectId, String),
    CompileShader(ShaderObjectId),
    AttachShader(ProgramId, ShaderObjectId),
    BindAttribLocation {
        program: ProgramId,
        slot: AttributeSlot,
        name: String,
    },
    GetAttribLocation(String),
    GetUniformLocation(String),
    UploadUniform {
        location: UniformLocation,
        value: UniformValue,
        transpose: bool,
    },
    EnableVertexAttribArray(AttributeSlot),
    VertexAttribPointer {
        slot: AttributeSlot,
        size: i32,
        stride: i32,
        offset: i32,
    },
    CreateVertexArray(VertexArrayId),
    DeleteVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    DrawArrays {
        mode: u32,
        first: i32,
        count: i32,
    },
    CreateTexture(TextureId),
    DeleteTexture(TextureId),
    ActiveTexture(u32),
    BindTexture(u32, Option<TextureId>),
    TexParameter {
        target: u32,
        parameter: u32,
        value: i32,
    },
    TexImage2D {
        target: u32,
        width: i32,
        height: i32,
        pixels: Option<Vec<u8>>,
    },
    GenerateMipmap(u32),
    SetCapability(u32, bool),
    BlendFunc(u32, u32),
    DepthMask(bool),
    DepthFunc(u32),
    CullFace(u32),
    ClearColor([f32; 4]),
    Clear(u32),
    Viewport(i32, i32, i32, i32),
}

/// A [GlDriver] that needs no GPU.
///
/// Object ids are handed out from a counter, and every state changing call
/// is appended to a call log that can be inspected afterwards. Compilation
/// and linking can be made to fail on demand, and the uniforms and
/// attributes that "exist" in every program are declared up front.
#[derive(Default)]
pub struct HeadlessDriver {
    next_id: Cell<u32>,
    calls: RefCell<Vec<DriverCall>>,
    sources: RefCell<HashMap<ShaderObjectId, String>>,
    failing_markers: RefCell<Vec<String>>,
    fail_link: Cell<bool>,
    uniforms: RefCell<HashMap<String, UniformLocation>>,
    attributes: RefCell<HashMap<String, AttributeSlot>>,
    bound_attributes: RefCell<HashMap<(ProgramId, String), AttributeSlot>>,
}

impl HeadlessDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a uniform every program will report at `location`
    pub fn with_uniform(self, name: &str, location: UniformLocation) -> Self {
        self.uniforms.borrow_mut().insert(name.to_string(), location);
        self
    }

    /// Declare an attribute every program will report at `slot`
    pub fn with_attribute(self, name: &str, slot: AttributeSlot) -> Self {
        self.attributes.borrow_mut().insert(name.to_string(), slot);
        self
    }

    /// Any shader source containing `marker` fails to compile
    pub fn fail_compile_on(self, marker: &str) -> Self {
        self.failing_markers.borrow_mut().push(marker.to_string());
        self
    }

    pub fn set_fail_link(&self, fail: bool) {
        self.fail_link.set(fail);
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count_calls(&self, predicate: impl Fn(&DriverCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| predicate(call)).count()
    }

    /// Source text submitted for a shader object, if any
    pub fn source_of(&self, shader: ShaderObjectId) -> Option<String> {
        self.sources.borrow().get(&shader).cloned()
    }

    fn record(&self, call: DriverCall) {
        self.calls.borrow_mut().push(call);
    }

    fn next_object_id(&self) -> NonZeroU32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        NonZeroU32::new(id).unwrap_or(NonZeroU32::MIN)
    }
}

impl GlDriver for HeadlessDriver {
    fn create_program(&self) -> Result<ProgramId, String> {
        let program = self.next_object_id();
        self.record(DriverCall::CreateProgram(program));
        Ok(program)
    }

    fn delete_program(&self, program: ProgramId) {
        self.record(DriverCall::DeleteProgram(program));
    }

    fn link_program(&self, program: ProgramId) {
        self.record(DriverCall::LinkProgram(program));
    }

    fn get_program_link_status(&self, _program: ProgramId) -> bool {
        !self.fail_link.get()
    }

    fn get_program_info_log(&self, _program: ProgramId) -> String {
        if self.fail_link.get() {
            "error: linking failed".to_string()
        } else {
            String::new()
        }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.record(DriverCall::UseProgram(program));
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderObjectId, String> {
        let shader = self.next_object_id();
        self.record(DriverCall::CreateShader(stage, shader));
        Ok(shader)
    }

    fn delete_shader(&self, shader: ShaderObjectId) {
        self.record(DriverCall::DeleteShader(shader));
    }

    fn shader_source(&self, shader: ShaderObjectId, source: &str) {
        self.sources.borrow_mut().insert(shader, source.to_string());
        self.record(DriverCall::ShaderSource(shader, source.to_string()));
    }

    fn compile_shader(&self, shader: ShaderObjectId) {
        self.record(DriverCall::CompileShader(shader));
    }

    fn get_shader_compile_status(&self, shader: ShaderObjectId) -> bool {
        let sources = self.sources.borrow();
        let Some(source) = sources.get(&shader) else {
            return false;
        };
        !self
            .failing_markers
            .borrow()
            .iter()
            .any(|marker| source.contains(marker.as_str()))
    }

    fn get_shader_info_log(&self, shader: ShaderObjectId) -> String {
        if self.get_shader_compile_status(shader) {
            String::new()
        } else {
            "0:1(1): error: syntax error".to_string()
        }
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderObjectId) {
        self.record(DriverCall::AttachShader(program, shader));
    }

    fn bind_attrib_location(&self, program: ProgramId, slot: AttributeSlot, name: &str) {
        self.bound_attributes
            .borrow_mut()
            .insert((program, name.to_string()), slot);
        self.record(DriverCall::BindAttribLocation {
            program,
            slot,
            name: name.to_string(),
        });
    }

    fn get_attrib_location(&self, program: ProgramId, name: &str) -> Option<AttributeSlot> {
        self.record(DriverCall::GetAttribLocation(name.to_string()));
        let declared = self.attributes.borrow().get(name).copied()?;
        let bound = self
            .bound_attributes
            .borrow()
            .get(&(program, name.to_string()))
            .copied();
        Some(bound.unwrap_or(declared))
    }

    fn get_uniform_location(&self, _program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.record(DriverCall::GetUniformLocation(name.to_string()));
        self.uniforms.borrow().get(name).copied()
    }

    fn upload_uniform(&self, location: UniformLocation, value: &UniformValue, transpose: bool) {
        self.record(DriverCall::UploadUniform {
            location,
            value: *value,
            transpose,
        });
    }

    fn enable_vertex_attrib_array(&self, slot: AttributeSlot) {
        self.record(DriverCall::EnableVertexAttribArray(slot));
    }

    fn vertex_attrib_pointer_f32(
        &self,
        slot: AttributeSlot,
        size: i32,
        _data_type: u32,
        _normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(DriverCall::VertexAttribPointer {
            slot,
            size,
            stride,
            offset,
        });
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        let vertex_array = self.next_object_id();
        self.record(DriverCall::CreateVertexArray(vertex_array));
        Ok(vertex_array)
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        self.record(DriverCall::DeleteVertexArray(vertex_array));
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        self.record(DriverCall::BindVertexArray(vertex_array));
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.record(DriverCall::DrawArrays { mode, first, count });
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        let texture = self.next_object_id();
        self.record(DriverCall::CreateTexture(texture));
        Ok(texture)
    }

    fn delete_texture(&self, texture: TextureId) {
        self.record(DriverCall::DeleteTexture(texture));
    }

    fn active_texture(&self, unit: u32) {
        self.record(DriverCall::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: u32, texture: Option<TextureId>) {
        self.record(DriverCall::BindTexture(target, texture));
    }

    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        self.record(DriverCall::TexParameter {
            target,
            parameter,
            value,
        });
    }

    fn tex_image_2d(
        &self,
        target: u32,
        _internal_format: i32,
        width: i32,
        height: i32,
        _format: u32,
        _pixel_type: u32,
        pixels: Option<&[u8]>,
    ) {
        self.record(DriverCall::TexImage2D {
            target,
            width,
            height,
            pixels: pixels.map(|p| p.to_vec()),
        });
    }

    fn generate_mipmap(&self, target: u32) {
        self.record(DriverCall::GenerateMipmap(target));
    }

    fn set_capability(&self, capability: u32, enabled: bool) {
        self.record(DriverCall::SetCapability(capability, enabled));
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.record(DriverCall::BlendFunc(src, dst));
    }

    fn depth_mask(&self, write: bool) {
        self.record(DriverCall::DepthMask(write));
    }

    fn depth_func(&self, func: u32) {
        self.record(DriverCall::DepthFunc(func));
    }

    fn cull_face(&self, mode: u32) {
        self.record(DriverCall::CullFace(mode));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(DriverCall::ClearColor([r, g, b, a]));
    }

    fn clear(&self, mask: u32) {
        self.record(DriverCall::Clear(mask));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(DriverCall::Viewport(x, y, width, height));
    }
}
