use std::path::Path;
use std::rc::Rc;

use image::RgbaImage;
use log::warn;
use thiserror::Error;

use crate::core::assets;
use crate::core::platform::driver::TextureId;
use crate::core::rendering::render_state::GlContext;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextureError {
    /// Textures are write-once, their data can't change after the upload
    #[error("texture data was already uploaded")]
    AlreadyUploaded,
    #[error("expected {expected} bytes of pixel data, got {given}")]
    SizeMismatch { expected: usize, given: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureFiltering {
    pub min: u32,
    pub mag: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureWrapping {
    pub wrap_s: u32,
    pub wrap_t: u32,
    /// Only used by cube maps
    pub wrap_r: u32,
}

/// Storage and sampling options. Fixed once the texture is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureOptions {
    pub internal_format: u32,
    pub format: u32,
    pub pixel_type: u32,
    pub filtering: TextureFiltering,
    pub wrapping: TextureWrapping,
}

impl Default for TextureOptions {
    fn default() -> Self {
        TextureOptions {
            internal_format: glow::RGBA8,
            format: glow::RGBA,
            pixel_type: glow::UNSIGNED_BYTE,
            filtering: TextureFiltering {
                min: glow::LINEAR,
                mag: glow::LINEAR,
            },
            wrapping: TextureWrapping {
                wrap_s: glow::CLAMP_TO_EDGE,
                wrap_t: glow::CLAMP_TO_EDGE,
                wrap_r: glow::CLAMP_TO_EDGE,
            },
        }
    }
}

impl TextureOptions {
    /// Bytes used by a single pixel with this format and pixel type
    pub fn bytes_per_pixel(&self) -> usize {
        let components = match self.format {
            glow::RED | glow::DEPTH_COMPONENT => 1,
            glow::RG => 2,
            glow::RGB => 3,
            _ => 4,
        };
        let component_size = match self.pixel_type {
            glow::FLOAT | glow::INT | glow::UNSIGNED_INT => 4,
            glow::HALF_FLOAT | glow::SHORT | glow::UNSIGNED_SHORT => 2,
            _ => 1,
        };
        components * component_size
    }
}

/// A 2D texture.
///
/// The driver object is created the first time the texture is updated or
/// bound, and the pixel data is uploaded at that moment. Pixel data is only
/// kept until the upload.
pub struct Texture {
    context: Rc<GlContext>,
    handle: Option<TextureId>,
    target: u32,
    width: u32,
    height: u32,
    options: TextureOptions,
    generate_mipmaps: bool,
    data: Vec<u8>,
}

impl Texture {
    /// An empty texture of the given size, fill it with [Texture::set_data]
    pub fn new(
        context: Rc<GlContext>,
        width: u32,
        height: u32,
        options: TextureOptions,
        generate_mipmaps: bool,
    ) -> Self {
        Texture {
            context,
            handle: None,
            target: glow::TEXTURE_2D,
            width,
            height,
            options,
            generate_mipmaps,
            data: vec![],
        }
    }

    pub fn from_image(
        context: Rc<GlContext>,
        image: &RgbaImage,
        options: TextureOptions,
        generate_mipmaps: bool,
    ) -> Self {
        let mut texture = Texture::new(
            context,
            image.width(),
            image.height(),
            options,
            generate_mipmaps,
        );
        texture.data = image.as_raw().clone();
        texture
    }

    /// Decode an image file. On failure the problem is logged and the
    /// texture is left empty: updating it does nothing.
    pub fn from_file(
        context: Rc<GlContext>,
        path: impl AsRef<Path>,
        options: TextureOptions,
        generate_mipmaps: bool,
    ) -> Self {
        let path = path.as_ref();
        match assets::image_from_path(path) {
            Ok(image) => Texture::from_image(context, &image, options, generate_mipmaps),
            Err(error) => {
                warn!("Failed to load texture {}: {}", path.display(), error);
                Texture::new(context, 0, 0, options, generate_mipmaps)
            }
        }
    }

    pub(crate) fn with_target(context: Rc<GlContext>, target: u32, options: TextureOptions) -> Self {
        let mut texture = Texture::new(context, 0, 0, options, false);
        texture.target = target;
        texture
    }

    /// Stage the pixel data sent on the first update
    pub fn set_data(&mut self, data: Vec<u8>) -> Result<(), TextureError> {
        if self.is_generated() {
            return Err(TextureError::AlreadyUploaded);
        }

        let expected = self.width as usize * self.height as usize * self.options.bytes_per_pixel();
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                given: data.len(),
            });
        }

        self.data = data;
        Ok(())
    }

    /// Create the driver object on `texture_unit` and set its sampling
    /// parameters. Returns false if the driver couldn't create it.
    pub(crate) fn generate(&mut self, texture_unit: u32) -> bool {
        let driver = self.context.driver();
        let handle = match driver.create_texture() {
            Ok(handle) => handle,
            Err(error) => {
                warn!("Could not create texture: {}", error);
                return false;
            }
        };
        self.handle = Some(handle);
        self.bind_handle(texture_unit);

        let TextureOptions {
            filtering,
            wrapping,
            ..
        } = self.options;
        driver.tex_parameter_i32(self.target, glow::TEXTURE_MIN_FILTER, filtering.min as i32);
        driver.tex_parameter_i32(self.target, glow::TEXTURE_MAG_FILTER, filtering.mag as i32);
        driver.tex_parameter_i32(self.target, glow::TEXTURE_WRAP_S, wrapping.wrap_s as i32);
        driver.tex_parameter_i32(self.target, glow::TEXTURE_WRAP_T, wrapping.wrap_t as i32);
        if self.target == glow::TEXTURE_CUBE_MAP {
            driver.tex_parameter_i32(self.target, glow::TEXTURE_WRAP_R, wrapping.wrap_r as i32);
        }
        true
    }

    /// Upload the pixel data, once. Later calls do nothing.
    pub fn update(&mut self, texture_unit: u32) {
        if self.is_generated() || self.width == 0 || self.height == 0 {
            return;
        }
        if !self.generate(texture_unit) {
            return;
        }

        let pixels = (!self.data.is_empty()).then_some(self.data.as_slice());
        self.upload(self.target, pixels);
        if self.generate_mipmaps {
            self.context.driver().generate_mipmap(self.target);
        }

        self.data = Vec::new();
    }

    pub(crate) fn upload(&self, target: u32, pixels: Option<&[u8]>) {
        self.context.driver().tex_image_2d(
            target,
            self.options.internal_format as i32,
            self.width as i32,
            self.height as i32,
            self.options.format,
            self.options.pixel_type,
            pixels,
        );
    }

    /// Make this texture current on `texture_unit`, uploading it first if
    /// that wasn't done yet.
    pub fn bind(&mut self, texture_unit: u32) {
        self.update(texture_unit);
        self.bind_handle(texture_unit);
    }

    pub(crate) fn bind_handle(&self, texture_unit: u32) {
        self.context.texture_unit(texture_unit);
        self.context.bind_texture(self.target, self.handle);
    }

    pub(crate) fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    #[inline(always)]
    pub fn is_generated(&self) -> bool {
        self.handle.is_some()
    }

    #[inline(always)]
    pub fn handle(&self) -> Option<TextureId> {
        self.handle
    }

    #[inline(always)]
    pub fn target(&self) -> u32 {
        self.target
    }

    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline(always)]
    pub fn options(&self) -> &TextureOptions {
        &self.options
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.context.driver().delete_texture(handle);
            self.context.forget_texture(handle);
        }
    }
}
