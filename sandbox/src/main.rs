use glam::Vec4;
use log::error;
use proto_gl::prelude::*;

const SHADER_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/resources/checker.glsl");
const CHECKER_SIZE: u32 = 64;

/// Scrolling checkerboard drawn with a single fullscreen triangle
struct Checker {
    shader: Option<Shader>,
    texture: Option<Texture>,
    vertex_array: Option<std::num::NonZeroU32>,
}

fn checker_pixels(size: u32, cell: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / cell) + (y / cell)) % 2 == 0;
            let value = if light { 230 } else { 40 };
            pixels.extend_from_slice(&[value, value, value, 255]);
        }
    }
    pixels
}

impl Application for Checker {
    fn init(&mut self, context: &mut AppContext) {
        let gl = context.gl().clone();

        let shader = Shader::from_bundle_file(gl.clone(), SHADER_PATH);
        if !shader.is_valid() {
            error!("Checker shader is not usable, nothing will be drawn");
        }

        let options = TextureOptions {
            filtering: TextureFiltering {
                min: glow::LINEAR_MIPMAP_LINEAR,
                mag: glow::NEAREST,
            },
            wrapping: TextureWrapping {
                wrap_s: glow::REPEAT,
                wrap_t: glow::REPEAT,
                ..TextureOptions::default().wrapping
            },
            ..Default::default()
        };
        let mut texture = Texture::new(gl.clone(), CHECKER_SIZE, CHECKER_SIZE, options, true);
        if let Err(err) = texture.set_data(checker_pixels(CHECKER_SIZE, 8)) {
            error!("Could not fill checker texture: {}", err);
        }

        self.vertex_array = gl.driver().create_vertex_array().ok();
        gl.clear_color(Vec4::new(0.1, 0.1, 0.12, 1.0));
        gl.depth_test(false);

        self.shader = Some(shader);
        self.texture = Some(texture);
    }

    fn update(&mut self, _context: &mut AppContext, _delta_time: f32) {}

    fn render(&mut self, context: &mut AppContext, _delta_time: f32) {
        let (Some(shader), Some(texture)) = (self.shader.as_mut(), self.texture.as_mut()) else {
            return;
        };
        if !shader.is_valid() {
            return;
        }

        texture.bind(0);
        shader.set_uniform_i32("tex", 0);
        shader.set_uniform_fvec2("resolution", &context.resolution());
        shader.set_uniform_f32("time", context.global_time());
        shader.set_uniform_fvec4("tint", &Vec4::new(1.0, 0.9, 0.8, 1.0));

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

    let config = AppConfig::new("Proto GL Checker", 800, 600)
        .with_resizable(true)
        .with_grab_cursor(false);
    let app = Checker {
        shader: None,
        texture: None,
        vertex_array: None,
    };

    if let Err(err) = App::run(config, app) {
        error!("Application failed: {}", err);
    }
}
