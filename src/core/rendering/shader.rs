use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};
use log::{debug, warn};
use thiserror::Error;

use crate::core::assets::{self, AssetError};
use crate::core::platform::driver::{
    AttributeSlot, GlDriver, ProgramId, ShaderObjectId, UniformLocation,
};
use crate::core::rendering::render_state::GlContext;
use crate::core::rendering::uniform::{CachedUniform, UniformValue};
use crate::core::rendering::vertex_layout::VertexLayout;

/// Pipeline stage a shader object belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

impl ShaderStage {
    /// GL enum used to create a shader object of this stage
    pub fn gl_kind(&self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
            ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex shader",
            ShaderStage::Fragment => "fragment shader",
            ShaderStage::Geometry => "geometry shader",
        }
    }

    /// Name used in the `#pragma begin:<tag>` markers of a shader bundle
    pub fn bundle_tag(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Geometry => "geom",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    /// Source text could not be obtained
    #[error(transparent)]
    Resource(#[from] AssetError),
    /// A mandatory section of a shader bundle is missing or malformed
    #[error("missing tag {0} in shader bundle")]
    MissingTag(String),
    /// The driver rejected a stage source
    #[error("failed to compile {stage}: {log}")]
    Compilation { stage: ShaderStage, log: String },
    /// The driver could not link the program
    #[error("error linking shader program: {0}")]
    Link(String),
    /// The driver could not create a program or shader object
    #[error("could not create driver object: {0}")]
    ObjectCreation(String),
}

/// Stage sources found in a shader bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSources {
    pub vertex: String,
    pub fragment: String,
    pub geometry: Option<String>,
}

/// Extract the text between `#pragma begin:<tag>` and `#pragma end:<tag>`.
///
/// Markers are lines, so the line break that ends the begin marker is not
/// part of the source. Returns `None` if either marker is missing, or if the
/// end marker doesn't come after the begin marker.
pub fn bundle_stage_source<'a>(bundle: &'a str, tag: &str) -> Option<&'a str> {
    let start_tag = format!("#pragma begin:{tag}");
    let end_tag = format!("#pragma end:{tag}");

    let start = bundle.find(&start_tag)? + start_tag.len();
    let end = bundle.find(&end_tag)?;
    if end <= start {
        return None;
    }

    let source = &bundle[start..end];
    let source = source
        .strip_prefix("\r\n")
        .or_else(|| source.strip_prefix('\n'))
        .unwrap_or(source);
    Some(source)
}

/// Split a bundle into its stage sources. Vertex and fragment sections are
/// required, the geometry section is optional.
pub fn parse_bundle(bundle: &str) -> Result<BundleSources, ShaderError> {
    let required = |stage: ShaderStage| {
        bundle_stage_source(bundle, stage.bundle_tag())
            .map(str::to_string)
            .ok_or_else(|| {
                let tag = if bundle.contains(&format!("#pragma begin:{}", stage.bundle_tag())) {
                    format!("#pragma end:{}", stage.bundle_tag())
                } else {
                    format!("#pragma begin:{}", stage.bundle_tag())
                };
                warn!("Missing tag {} in shader bundle", tag);
                ShaderError::MissingTag(tag)
            })
    };

    let vertex = required(ShaderStage::Vertex)?;
    let fragment = required(ShaderStage::Fragment)?;
    let geometry =
        bundle_stage_source(bundle, ShaderStage::Geometry.bundle_tag()).map(str::to_string);

    Ok(BundleSources {
        vertex,
        fragment,
        geometry,
    })
}

/// A linked shader program, with its attribute and uniform lookups cached.
///
/// Construction never fails: when a source can't be read, compiled or
/// linked, the problem is logged and the shader is left without a program.
/// Such a shader is inert, [Shader::use_program] and the uniform setters do
/// nothing. Check [Shader::is_valid] to know if construction went well.
///
/// The stage object ids kept here are for information only. Those objects
/// are deleted as soon as the program is linked, so the ids must never be
/// handed back to the driver.
pub struct Shader {
    context: Rc<GlContext>,
    program: Option<ProgramId>,
    vertex_shader: Option<ShaderObjectId>,
    fragment_shader: Option<ShaderObjectId>,
    geometry_shader: Option<ShaderObjectId>,
    uniforms: HashMap<String, UniformLocation>,
    attributes: HashMap<String, AttributeSlot>,
    /// Last value written to each uniform location
    uniform_cache: HashMap<UniformLocation, CachedUniform>,
}

impl Shader {
    /// A shader without program, load sources into it later
    pub fn new(context: Rc<GlContext>) -> Self {
        Shader {
            context,
            program: None,
            vertex_shader: None,
            fragment_shader: None,
            geometry_shader: None,
            uniforms: HashMap::new(),
            attributes: HashMap::new(),
            uniform_cache: HashMap::new(),
        }
    }

    /// Build a program from one source file per stage
    pub fn from_files(
        context: Rc<GlContext>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
        geometry_path: Option<&Path>,
    ) -> Self {
        let mut shader = Shader::new(context);
        let (vertex_path, fragment_path) = (vertex_path.as_ref(), fragment_path.as_ref());

        if let Err(error) = shader.load_files(vertex_path, fragment_path, geometry_path) {
            warn!(
                "Failed to build shader {} {}: {}",
                vertex_path.display(),
                fragment_path.display(),
                error
            );
        }
        shader
    }

    /// Build a program from a bundle file holding every stage
    pub fn from_bundle_file(context: Rc<GlContext>, bundle_path: impl AsRef<Path>) -> Self {
        let mut shader = Shader::new(context);
        let bundle_path = bundle_path.as_ref();

        let result = assets::string_from_path(bundle_path)
            .map_err(ShaderError::from)
            .and_then(|bundle| shader.load_bundle_source(&bundle));
        if let Err(error) = result {
            warn!(
                "Failed to build shader program bundle {}: {}",
                bundle_path.display(),
                error
            );
        }
        shader
    }

    /// Build a program from bundle text already in memory
    pub fn from_bundle_source(context: Rc<GlContext>, bundle: &str) -> Self {
        let mut shader = Shader::new(context);
        if let Err(error) = shader.load_bundle_source(bundle) {
            warn!("Failed to build shader program bundle: {}", error);
        }
        shader
    }

    /// Replace the program with one built from a bundle.
    ///
    /// No driver object is created if a mandatory section is missing.
    pub fn load_bundle_source(&mut self, bundle: &str) -> Result<(), ShaderError> {
        let sources = parse_bundle(bundle)?;
        self.load_sources(&sources.vertex, &sources.fragment, sources.geometry.as_deref())
    }

    pub fn load_files(
        &mut self,
        vertex_path: &Path,
        fragment_path: &Path,
        geometry_path: Option<&Path>,
    ) -> Result<(), ShaderError> {
        let vertex = assets::string_from_path(vertex_path)?;
        let fragment = assets::string_from_path(fragment_path)?;
        let geometry = geometry_path.map(assets::string_from_path).transpose()?;

        self.load_sources(&vertex, &fragment, geometry.as_deref())
    }

    /// Compile every stage and link them into a new program.
    ///
    /// Every present stage has to compile, otherwise the program is deleted
    /// and the first compilation error is returned. Any previous program of
    /// this shader is released first. Stage objects are deleted once the
    /// link was attempted, whatever its outcome.
    pub fn load_sources(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
        geometry_src: Option<&str>,
    ) -> Result<(), ShaderError> {
        self.release();

        let context = Rc::clone(&self.context);
        let driver = context.driver();
        let program = driver
            .create_program()
            .map_err(ShaderError::ObjectCreation)?;

        let mut stages = vec![
            (ShaderStage::Vertex, vertex_src),
            (ShaderStage::Fragment, fragment_src),
        ];
        if let Some(geometry_src) = geometry_src.filter(|src| !src.is_empty()) {
            stages.push((ShaderStage::Geometry, geometry_src));
        }

        let mut created_shaders: Vec<(ShaderStage, ShaderObjectId)> = vec![];
        let mut first_error = None;
        for (stage, source) in stages {
            match compile_stage(driver, program, stage, source) {
                Ok(shader) => created_shaders.push((stage, shader)),
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }

        if let Some(error) = first_error {
            warn!("Delete shader program");
            for (_, shader) in created_shaders {
                driver.delete_shader(shader);
            }
            driver.delete_program(program);
            return Err(error);
        }

        let link_result = self.link_program(program);

        for (stage, shader) in created_shaders {
            driver.delete_shader(shader);
            match stage {
                ShaderStage::Vertex => self.vertex_shader = Some(shader),
                ShaderStage::Fragment => self.fragment_shader = Some(shader),
                ShaderStage::Geometry => self.geometry_shader = Some(shader),
            }
        }

        if let Err(error) = link_result {
            driver.delete_program(program);
            self.vertex_shader = None;
            self.fragment_shader = None;
            self.geometry_shader = None;
            return Err(error);
        }

        self.program = Some(program);
        Ok(())
    }

    /// Link `program`. Uniform locations can move when a program is
    /// (re)linked, so every uniform lookup and cached value is dropped.
    fn link_program(&mut self, program: ProgramId) -> Result<(), ShaderError> {
        let driver = self.context.driver();
        self.uniforms.clear();
        self.uniform_cache.clear();

        driver.link_program(program);
        if !driver.get_program_link_status(program) {
            let info_log = driver.get_program_info_log(program);
            if info_log.len() > 1 {
                debug!("Error linking shader program");
                debug!("{}", info_log);
            }
            return Err(ShaderError::Link(info_log));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.program.is_some()
    }

    #[inline(always)]
    pub fn context(&self) -> &Rc<GlContext> {
        &self.context
    }

    #[inline(always)]
    pub fn program(&self) -> Option<ProgramId> {
        self.program
    }

    /// Ids of the stage objects the program was linked from. The objects
    /// themselves are deleted right after linking, don't pass these ids to
    /// the driver.
    #[inline(always)]
    pub fn vertex_shader(&self) -> Option<ShaderObjectId> {
        self.vertex_shader
    }

    #[inline(always)]
    pub fn fragment_shader(&self) -> Option<ShaderObjectId> {
        self.fragment_shader
    }

    #[inline(always)]
    pub fn geometry_shader(&self) -> Option<ShaderObjectId> {
        self.geometry_shader
    }

    /// Make this program the current one. Does nothing if it already is,
    /// or if the shader has no program.
    pub fn use_program(&self) {
        if let Some(program) = self.program {
            self.context.use_program(Some(program));
        }
    }

    pub fn is_in_use(&self) -> bool {
        self.program
            .map(|program| self.context.is_program_current(program))
            .unwrap_or(false)
    }

    /// Slot of a vertex attribute. Misses are logged and not cached.
    pub fn get_attrib_location(&mut self, attribute: &str) -> Option<AttributeSlot> {
        if let Some(slot) = self.attributes.get(attribute) {
            return Some(*slot);
        }

        let program = self.program?;
        match self.context.driver().get_attrib_location(program, attribute) {
            Some(slot) => {
                self.attributes.insert(attribute.to_string(), slot);
                Some(slot)
            }
            None => {
                warn!(
                    "Attribute location not found on shader for attribute {}",
                    attribute
                );
                None
            }
        }
    }

    /// Location of a uniform, asked to the driver on first use.
    ///
    /// A miss is logged and not remembered: the next call asks the driver
    /// again.
    pub fn get_uniform_location(&mut self, uniform_name: &str) -> Option<UniformLocation> {
        if let Some(location) = self.uniforms.get(uniform_name) {
            return Some(*location);
        }

        let program = self.program?;
        match self.context.driver().get_uniform_location(program, uniform_name) {
            Some(location) => {
                self.uniforms.insert(uniform_name.to_string(), location);
                Some(location)
            }
            None => {
                warn!(
                    "Shader uniform {} not found on shader program: {}",
                    uniform_name, program
                );
                None
            }
        }
    }

    /// Bind every attribute of `layout` to its slot in the layout
    pub fn bind_vertex_layout(&mut self, layout: &VertexLayout) -> bool {
        self.bind_attribute_locations(&layout.locations())
    }

    /// Bind attributes to explicit slots and relink if any binding changed.
    ///
    /// The driver only honors bindings made before the last link, so a
    /// relink is required after a change. Returns whether it relinked. A
    /// failed relink deletes the program and leaves the shader inert.
    pub fn bind_attribute_locations(&mut self, locations: &[(String, AttributeSlot)]) -> bool {
        let Some(program) = self.program else {
            return false;
        };
        let context = Rc::clone(&self.context);
        let driver = context.driver();
        let mut need_link = false;

        for (name, slot) in locations {
            if self.attributes.get(name) != Some(slot) {
                warn!("Binding location {} for attribute {}", slot, name);
                driver.bind_attrib_location(program, *slot, name);
                self.attributes.insert(name.clone(), *slot);
                need_link = true;
            }
        }

        if need_link {
            warn!("Relink shader");
            if let Err(error) = self.link_program(program) {
                warn!("Failed to relink shader program {}: {}", program, error);
                self.release();
            }
        }
        need_link
    }

    // -- < Uniforms > ------------------------------------------------------------------------

    /// Write a uniform, skipping the upload when the location already holds
    /// `value` with the same `transpose` flag.
    pub fn set_uniform_value(&mut self, name: &str, value: UniformValue, transpose: bool) {
        if self.program.is_none() {
            return;
        }
        self.use_program();

        let Some(location) = self.get_uniform_location(name) else {
            return;
        };

        let cached = match self.uniform_cache.entry(location) {
            Entry::Occupied(mut entry) => entry.get_mut().update(value, transpose),
            Entry::Vacant(entry) => {
                entry.insert(CachedUniform { value, transpose });
                false
            }
        };

        if !cached {
            self.context
                .driver()
                .upload_uniform(location, &value, transpose);
        }
    }

    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) {
        self.set_uniform_value(name, value.into(), false);
    }

    pub fn set_uniform_i32(&mut self, name: &str, x: i32) {
        self.set_uniform_value(name, UniformValue::Int(x), false);
    }

    pub fn set_uniform_f32(&mut self, name: &str, x: f32) {
        self.set_uniform_value(name, UniformValue::Float(x), false);
    }

    pub fn set_uniform_2f(&mut self, name: &str, x: f32, y: f32) {
        self.set_uniform_value(name, UniformValue::Vec2(Vec2::new(x, y)), false);
    }

    pub fn set_uniform_3f(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.set_uniform_value(name, UniformValue::Vec3(Vec3::new(x, y, z)), false);
    }

    pub fn set_uniform_4f(&mut self, name: &str, x: f32, y: f32, z: f32, w: f32) {
        self.set_uniform_value(name, UniformValue::Vec4(Vec4::new(x, y, z, w)), false);
    }

    pub fn set_uniform_fvec2(&mut self, name: &str, value: &Vec2) {
        self.set_uniform_2f(name, value.x, value.y);
    }

    pub fn set_uniform_fvec3(&mut self, name: &str, value: &Vec3) {
        self.set_uniform_3f(name, value.x, value.y, value.z);
    }

    pub fn set_uniform_fvec4(&mut self, name: &str, value: &Vec4) {
        self.set_uniform_4f(name, value.x, value.y, value.z, value.w);
    }

    pub fn set_uniform_fmat2(&mut self, name: &str, value: &Mat2, transpose: bool) {
        self.set_uniform_value(name, UniformValue::Mat2(*value), transpose);
    }

    pub fn set_uniform_fmat3(&mut self, name: &str, value: &Mat3, transpose: bool) {
        self.set_uniform_value(name, UniformValue::Mat3(*value), transpose);
    }

    pub fn set_uniform_fmat4(&mut self, name: &str, value: &Mat4, transpose: bool) {
        self.set_uniform_value(name, UniformValue::Mat4(*value), transpose);
    }

    /// Delete the program and forget everything cached about it
    fn release(&mut self) {
        if let Some(program) = self.program.take() {
            self.context.driver().delete_program(program);
            self.context.forget_program(program);
        }

        self.vertex_shader = None;
        self.fragment_shader = None;
        self.geometry_shader = None;
        self.uniforms.clear();
        self.attributes.clear();
        self.uniform_cache.clear();
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.release();
    }
}

/// Create a shader object for `stage`, compile it and attach it to `program`.
/// A stage that fails to compile is deleted before returning.
fn compile_stage(
    driver: &dyn GlDriver,
    program: ProgramId,
    stage: ShaderStage,
    source: &str,
) -> Result<ShaderObjectId, ShaderError> {
    let shader = driver
        .create_shader(stage)
        .map_err(ShaderError::ObjectCreation)?;
    driver.shader_source(shader, source);
    driver.compile_shader(shader);

    if !driver.get_shader_compile_status(shader) {
        let info_log = driver.get_shader_info_log(shader);
        if info_log.len() > 1 {
            debug!("Compilation error");
            debug!("{}", info_log);
        }
        driver.delete_shader(shader);

        warn!("Failed to compile shader of type {}", stage);
        warn!("{}", source);
        return Err(ShaderError::Compilation {
            stage,
            log: info_log,
        });
    }

    driver.attach_shader(program, shader);
    Ok(shader)
}
