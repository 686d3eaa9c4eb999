use std::rc::Rc;
use std::slice::Iter;

use crate::core::platform::driver::AttributeSlot;
use crate::core::rendering::shader::Shader;

/// Data types a vertex attribute can have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderDataType {
    Float,
    Float2,
    Float3,
    Float4,
    /// Four bytes, usually a packed color
    UByte4,
}

impl ShaderDataType {
    /// Size in bytes for this data type
    pub fn get_size(&self) -> u32 {
        match self {
            ShaderDataType::Float => 4,
            ShaderDataType::Float2 => 2 * 4,
            ShaderDataType::Float3 => 3 * 4,
            ShaderDataType::Float4 => 4 * 4,
            ShaderDataType::UByte4 => 4,
        }
    }

    pub fn get_component_count(&self) -> u32 {
        match self {
            ShaderDataType::Float => 1,
            ShaderDataType::Float2 => 2,
            ShaderDataType::Float3 => 3,
            ShaderDataType::Float4 | ShaderDataType::UByte4 => 4,
        }
    }

    /// GL enum of a single component
    pub fn gl_component_type(&self) -> u32 {
        match self {
            ShaderDataType::UByte4 => glow::UNSIGNED_BYTE,
            _ => glow::FLOAT,
        }
    }
}

/// Describes a vertex attribute, part of the vertex data to send to a shader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    name: String,
    data_type: ShaderDataType,
    size: u32,
    offset: u32,
    normalized: bool,
}

impl VertexAttribute {
    pub fn new(name: &str, data_type: ShaderDataType, normalized: bool) -> Self {
        VertexAttribute {
            size: data_type.get_size(),
            name: name.to_string(),
            data_type,
            normalized,
            offset: 0,
        }
    }

    #[inline(always)]
    pub fn get_name(&self) -> &str {
        self.name.as_str()
    }

    pub fn get_data_type(&self) -> ShaderDataType {
        self.data_type
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn get_offset(&self) -> u32 {
        self.offset
    }
}

/// Interleaved vertex format: attributes in declaration order, each one
/// bound to the slot matching its position in the layout.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    stride: u32,
}

impl VertexLayout {
    pub fn new(attributes: Vec<VertexAttribute>) -> Self {
        let mut layout = VertexLayout {
            attributes,
            stride: 0,
        };

        layout.compute_offset_and_stride();

        layout
    }

    fn compute_offset_and_stride(&mut self) {
        let mut offset = 0;
        for attribute in self.attributes.iter_mut() {
            attribute.offset = offset;
            offset += attribute.size;
        }

        self.stride = offset;
    }

    #[inline(always)]
    pub fn get_stride(&self) -> u32 {
        self.stride
    }

    #[inline(always)]
    pub fn iter(&self) -> Iter<'_, VertexAttribute> {
        self.attributes.iter()
    }

    /// `(attribute name, slot)` pairs, in declaration order
    pub fn locations(&self) -> Vec<(String, AttributeSlot)> {
        self.attributes
            .iter()
            .enumerate()
            .map(|(slot, attribute)| (attribute.name.clone(), slot as AttributeSlot))
            .collect()
    }

    /// Point every attribute the shader uses at its data in the bound
    /// vertex buffer. Attributes the shader doesn't know are skipped.
    pub fn enable(&self, shader: &mut Shader) {
        let context = Rc::clone(shader.context());
        let driver = context.driver();

        for attribute in self.attributes.iter() {
            let Some(slot) = shader.get_attrib_location(&attribute.name) else {
                continue;
            };

            driver.enable_vertex_attrib_array(slot);
            driver.vertex_attrib_pointer_f32(
                slot,
                attribute.data_type.get_component_count() as i32,
                attribute.data_type.gl_component_type(),
                attribute.normalized,
                self.stride as i32,
                attribute.offset as i32,
            );
        }
    }
}
