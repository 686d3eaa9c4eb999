use std::num::NonZeroU32;

use glam::Vec3;
use image::{Rgba, RgbaImage};
use log::{error, info};
use proto_gl::prelude::*;

const SHADER_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/resources/skybox.glsl");
const FACE_SIZE: u32 = 128;

/// Free-fly camera inside a cube map. Pass a horizontal cross image as
/// first argument, or get a generated one.
struct Skybox {
    cross_path: Option<String>,
    shader: Option<Shader>,
    cube: Option<TextureCube>,
    vertex_array: Option<NonZeroU32>,
}

/// A cross where every face has its own color, darker towards its edges
fn generated_cross(face_size: u32) -> RgbaImage {
    let colors: [(u32, u32, [u8; 3]); 6] = [
        (2, 1, [220, 60, 60]),
        (0, 1, [60, 220, 220]),
        (1, 0, [60, 220, 60]),
        (1, 2, [220, 60, 220]),
        (1, 1, [60, 60, 220]),
        (3, 1, [220, 220, 60]),
    ];

    RgbaImage::from_fn(face_size * 4, face_size * 3, |x, y| {
        let (column, row) = (x / face_size, y / face_size);
        let Some((_, _, color)) = colors.iter().find(|(c, r, _)| *c == column && *r == row) else {
            return Rgba([0, 0, 0, 255]);
        };

        let half = face_size as f32 / 2.0;
        let dx = ((x % face_size) as f32 - half).abs() / half;
        let dy = ((y % face_size) as f32 - half).abs() / half;
        let shade = 1.0 - 0.5 * dx.max(dy);
        Rgba([
            (color[0] as f32 * shade) as u8,
            (color[1] as f32 * shade) as u8,
            (color[2] as f32 * shade) as u8,
            255,
        ])
    })
}

impl Application for Skybox {
    fn init(&mut self, context: &mut AppContext) {
        let gl = context.gl().clone();

        let cube = match self.cross_path.as_deref() {
            Some(path) => {
                info!("Loading cube cross {}", path);
                TextureCube::from_file(gl.clone(), path, TextureOptions::default())
            }
            None => TextureCube::from_image(
                gl.clone(),
                &generated_cross(FACE_SIZE),
                TextureOptions::default(),
            ),
        };

        self.shader = Some(Shader::from_bundle_file(gl.clone(), SHADER_PATH));
        self.cube = Some(cube);
        self.vertex_array = gl.driver().create_vertex_array().ok();

        gl.depth_test(false);
        context.camera.set_position(Vec3::ZERO);
    }

    fn update(&mut self, context: &mut AppContext, delta_time: f32) {
        context.update_free_fly_camera(delta_time, FreeFlyKeys::default(), 0.002, 2.0);
    }

    fn render(&mut self, context: &mut AppContext, _delta_time: f32) {
        let (Some(shader), Some(cube)) = (self.shader.as_mut(), self.cube.as_mut()) else {
            return;
        };
        if !shader.is_valid() {
            return;
        }

        let camera = &context.camera;
        let inverse_view_projection = (camera.projection_matrix() * camera.view_matrix()).inverse();

        cube.bind(0);
        shader.set_uniform_i32("cube", 0);
        shader.set_uniform_fmat4("inverse_view_projection", &inverse_view_projection, false);
        shader.set_uniform_fvec3("camera_position", &camera.position());

        let driver = context.gl().driver();
        driver.bind_vertex_array(self.vertex_array);
        driver.draw_arrays(glow::TRIANGLES, 0, 3);
    }

    fn on_close(&mut self, context: &mut AppContext) {
        if let Some(vertex_array) = self.vertex_array.take() {
            context.gl().driver().delete_vertex_array(vertex_array);
        }
    }
}

fn main() {
    env_logger::builder().init();

    let config = AppConfig::new("Proto GL Skybox", 1280, 720).with_resizable(true);
    let app = Skybox {
        cross_path: std::env::args().nth(1),
        shader: None,
        cube: None,
        vertex_array: None,
    };

    if let Err(err) = App::run(config, app) {
        error!("Application failed: {}", err);
    }
}
