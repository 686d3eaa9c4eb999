#[cfg(test)]
mod app_test {
    use std::time::{Duration, Instant};

    use glam::{Vec2, Vec3};
    use winit::event::ElementState;
    use winit::keyboard::KeyCode;

    use crate::core::app::{AppConfig, AppContext, FreeFlyKeys};
    use crate::core::rendering::camera::Camera;
    use crate::core::time::Time;
    use crate::tests::shared_headless::headless;

    fn approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_config_builder() {
        let config = AppConfig::new("Geometries", 1024, 768)
            .with_fullscreen(true)
            .with_samples(8)
            .with_vsync(false);

        assert_eq!(config.name, "Geometries");
        assert_eq!((config.width, config.height), (1024, 768));
        assert!(config.fullscreen);
        assert!(!config.resizable);
        assert_eq!(config.samples, 8);
        assert!(!config.vsync);
        assert_eq!(AppConfig::default().with_width(1024).width, 1024);
    }

    #[test]
    fn test_context_resolution() {
        let (_driver, gl) = headless::context();
        let context = AppContext::new(gl, AppConfig::new("Test", 800, 600));

        assert_eq!(context.resolution(), Vec2::new(800.0, 600.0));
        assert_eq!(context.physical_resolution(), Vec2::new(800.0, 600.0));
        assert_eq!(context.global_time(), 0.0);
    }

    #[test]
    fn test_free_fly_moves_along_camera_axes() {
        let (_driver, gl) = headless::context();
        let mut context = AppContext::new(gl, AppConfig::default());

        context.input.on_key(KeyCode::KeyW, ElementState::Pressed);
        context.update_free_fly_camera(0.5, FreeFlyKeys::default(), 0.0, 4.0);
        assert!(approx_eq(context.camera.position(), Vec3::new(0.0, 0.0, -2.0)));

        context.input.on_key(KeyCode::KeyW, ElementState::Released);
        context.input.on_key(KeyCode::KeyD, ElementState::Pressed);
        context.update_free_fly_camera(1.0, FreeFlyKeys::default(), 0.0, 1.0);
        assert!(approx_eq(context.camera.position(), Vec3::new(1.0, 0.0, -2.0)));
    }

    #[test]
    fn test_free_fly_turns_with_cursor() {
        let (_driver, gl) = headless::context();
        let mut context = AppContext::new(gl, AppConfig::default());

        // Moving the cursor right turns the camera right
        context.input.on_cursor_motion(100.0, 0.0);
        context.update_free_fly_camera(0.0, FreeFlyKeys::default(), 0.01, 1.0);
        assert!(context.camera.forward().x > 0.0);

        context.input.end_frame();
        assert_eq!(context.input.cursor_delta(), Vec2::ZERO);
    }

    #[test]
    fn test_camera_pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.rotate(Vec2::new(10.0, 0.0));

        let forward = camera.forward();
        assert!(forward.y < 1.0);
        assert!(forward.y > 0.99);
        assert!(camera.right().is_finite());
    }

    #[test]
    fn test_camera_view_looks_down_forward() {
        let mut camera = Camera::default();
        camera.set_position(Vec3::new(0.0, 0.0, 5.0));

        let in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(approx_eq(in_view, Vec3::new(0.0, 0.0, -5.0)));
    }

    #[test]
    fn test_time_steps() {
        let start = Instant::now();
        let mut time = Time::new(start);

        time.step(start + Duration::from_millis(16));
        time.step(start + Duration::from_millis(48));
        assert!((time.delta_milliseconds() - 32.0).abs() < 1e-3);
        assert!((time.global_seconds() - 0.048).abs() < 1e-6);

        // Going back in time counts as a zero step
        time.step(start);
        assert_eq!(time.delta_seconds(), 0.0);
    }
}
