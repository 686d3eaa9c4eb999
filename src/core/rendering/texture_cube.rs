use std::path::Path;
use std::rc::Rc;

use image::RgbaImage;
use log::warn;

use crate::core::assets;
use crate::core::rendering::render_state::GlContext;
use crate::core::rendering::texture::{Texture, TextureOptions};

/// Cube faces, in the order the driver numbers them
pub const CUBE_MAP_FACES: [u32; 6] = [
    glow::TEXTURE_CUBE_MAP_POSITIVE_X,
    glow::TEXTURE_CUBE_MAP_NEGATIVE_X,
    glow::TEXTURE_CUBE_MAP_POSITIVE_Y,
    glow::TEXTURE_CUBE_MAP_NEGATIVE_Y,
    glow::TEXTURE_CUBE_MAP_POSITIVE_Z,
    glow::TEXTURE_CUBE_MAP_NEGATIVE_Z,
];

const BYTES_PER_PIXEL: usize = 4;

/// Pixels of one cube face, waiting to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub target: u32,
    pub data: Vec<u8>,
    /// Next byte of `data` to be written while unpacking
    pub offset: usize,
}

/// Index in [CUBE_MAP_FACES] of the face stored in a cell of the cross.
///
/// ```text
///        +Y
///    -X  +Z  +X  -Z
///        -Y
/// ```
fn face_for_cell(column: u32, row: u32) -> Option<usize> {
    match (column, row) {
        (2, 1) => Some(0),
        (0, 1) => Some(1),
        (1, 0) => Some(2),
        (1, 2) => Some(3),
        (1, 1) => Some(4),
        (3, 1) => Some(5),
        _ => None,
    }
}

/// Cut a horizontal cross (4 x 3 cells) of RGBA8 pixels into the six cube
/// faces. Returns no faces if the image is too small to hold a cross.
pub fn unpack_cross(pixels: &[u8], width: u32, height: u32) -> Vec<Face> {
    let face_width = width / 4;
    let face_height = height / 3;
    if face_width == 0 || face_height == 0 {
        return vec![];
    }
    if pixels.len() < width as usize * height as usize * BYTES_PER_PIXEL {
        return vec![];
    }

    let face_size = face_width as usize * face_height as usize * BYTES_PER_PIXEL;
    let mut faces: Vec<Face> = CUBE_MAP_FACES
        .iter()
        .map(|target| Face {
            target: *target,
            data: vec![0; face_size],
            offset: 0,
        })
        .collect();

    let segment = face_width as usize * BYTES_PER_PIXEL;
    for y in 0..face_height * 3 {
        let row = y / face_height;

        for column in 0..4 {
            let Some(index) = face_for_cell(column, row) else {
                continue;
            };
            let face = &mut faces[index];

            let src = (y as usize * width as usize + (column * face_width) as usize) * BYTES_PER_PIXEL;
            face.data[face.offset..face.offset + segment]
                .copy_from_slice(&pixels[src..src + segment]);
            face.offset += segment;
        }
    }

    faces
}

/// Faces are always unpacked as RGBA8, so that is what gets uploaded
/// whatever pixel layout was asked for.
fn cube_options(options: TextureOptions) -> TextureOptions {
    if options.format != glow::RGBA || options.pixel_type != glow::UNSIGNED_BYTE {
        warn!(
            "Texture cube faces are RGBA8, ignoring format {:#x} and pixel type {:#x}",
            options.format, options.pixel_type
        );
    }

    TextureOptions {
        format: glow::RGBA,
        pixel_type: glow::UNSIGNED_BYTE,
        ..options
    }
}

/// Cube map loaded from a single image laid out as a horizontal cross.
///
/// Faces are uploaded as soon as the image is loaded, and their staging
/// buffers are released right after.
pub struct TextureCube {
    texture: Texture,
    faces: Vec<Face>,
}

impl TextureCube {
    /// A cube without faces. Updating it does nothing.
    pub fn empty(context: Rc<GlContext>, options: TextureOptions) -> Self {
        TextureCube {
            texture: Texture::with_target(context, glow::TEXTURE_CUBE_MAP, cube_options(options)),
            faces: vec![],
        }
    }

    pub fn from_file(
        context: Rc<GlContext>,
        path: impl AsRef<Path>,
        options: TextureOptions,
    ) -> Self {
        let path = path.as_ref();
        match assets::image_from_path(path) {
            Ok(image) => TextureCube::from_image(context, &image, options),
            Err(error) => {
                warn!(
                    "Failed to load texture cube resource {}: {}",
                    path.display(),
                    error
                );
                TextureCube::empty(context, options)
            }
        }
    }

    pub fn from_image(context: Rc<GlContext>, image: &RgbaImage, options: TextureOptions) -> Self {
        let mut cube = TextureCube::empty(context, options);

        let faces = unpack_cross(image.as_raw(), image.width(), image.height());
        if faces.is_empty() {
            warn!(
                "Failed to load texture cube resource: a {}x{} image can't hold a cube cross",
                image.width(),
                image.height()
            );
            return cube;
        }

        cube.texture.set_size(image.width() / 4, image.height() / 3);
        cube.faces = faces;
        cube.update(0);
        cube
    }

    /// Upload the six faces, once, then drop their pixels
    pub fn update(&mut self, texture_unit: u32) {
        if self.texture.is_generated() || self.faces.is_empty() {
            return;
        }
        if !self.texture.generate(texture_unit) {
            return;
        }

        for face in self.faces.iter_mut() {
            self.texture.upload(face.target, Some(&face.data));
            face.data = Vec::new();
        }
    }

    pub fn bind(&mut self, texture_unit: u32) {
        self.update(texture_unit);
        self.texture.bind_handle(texture_unit);
    }

    #[inline(always)]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Size of a single face
    #[inline(always)]
    pub fn face_size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    #[inline(always)]
    pub fn texture(&self) -> &Texture {
        &self.texture
    }
}
