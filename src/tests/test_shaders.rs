#[cfg(test)]
mod shader_test {
    use glam::{Mat4, Vec3};

    use crate::core::platform::headless::{DriverCall, HeadlessDriver};
    use crate::core::rendering::shader::{Shader, ShaderError, ShaderStage};
    use crate::core::rendering::uniform::UniformValue;
    use crate::core::rendering::vertex_layout::{ShaderDataType, VertexAttribute, VertexLayout};
    use crate::tests::shared_headless::headless;

    fn uniform_driver() -> HeadlessDriver {
        HeadlessDriver::new()
            .with_uniform("mvp", 0)
            .with_uniform("tex", 1)
            .with_uniform("color", 2)
    }

    fn position_normal() -> VertexLayout {
        VertexLayout::new(vec![
            VertexAttribute::new("position", ShaderDataType::Float3, false),
            VertexAttribute::new("normal", ShaderDataType::Float3, false),
        ])
    }

    fn bind_calls(driver: &HeadlessDriver) -> usize {
        driver.count_calls(|call| matches!(call, DriverCall::BindAttribLocation { .. }))
    }

    #[test]
    fn test_same_uniform_value_uploads_once() {
        let (driver, context) = headless::context_with(uniform_driver());
        let mut shader = Shader::from_bundle_source(context, headless::SIMPLE_BUNDLE);
        driver.clear_calls();

        shader.set_uniform_fmat4("mvp", &Mat4::IDENTITY, false);
        shader.set_uniform_fmat4("mvp", &Mat4::IDENTITY, false);
        assert_eq!(headless::uploads(&driver), 1);

        // One lookup and one program switch for both calls
        assert_eq!(
            driver.count_calls(|call| matches!(call, DriverCall::GetUniformLocation(_))),
            1
        );
        assert_eq!(
            driver.count_calls(|call| matches!(call, DriverCall::UseProgram(_))),
            1
        );
        assert!(shader.is_in_use());

        shader.set_uniform_fmat4("mvp", &Mat4::from_scale(Vec3::splat(2.0)), false);
        assert_eq!(headless::uploads(&driver), 2);

        // Transpose flag is part of the cached value
        shader.set_uniform_fmat4("mvp", &Mat4::from_scale(Vec3::splat(2.0)), true);
        assert_eq!(headless::uploads(&driver), 3);
    }

    #[test]
    fn test_typed_setters_upload_their_variant() {
        let (driver, context) = headless::context_with(uniform_driver());
        let mut shader = Shader::from_bundle_source(context, headless::SIMPLE_BUNDLE);
        driver.clear_calls();

        shader.set_uniform_i32("tex", 0);
        shader.set_uniform_fvec3("color", &Vec3::new(1.0, 0.5, 0.0));
        shader.set_uniform_3f("color", 1.0, 0.5, 0.0);

        let uploaded: Vec<UniformValue> = driver
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                DriverCall::UploadUniform { value, .. } => Some(value),
                _ => None,
            })
            .collect();
        assert_eq!(
            uploaded,
            vec![
                UniformValue::Int(0),
                UniformValue::Vec3(Vec3::new(1.0, 0.5, 0.0))
            ]
        );
    }

    #[test]
    fn test_uniform_type_change_reuploads() {
        let (driver, context) = headless::context_with(uniform_driver());
        let mut shader = Shader::from_bundle_source(context, headless::SIMPLE_BUNDLE);

        shader.set_uniform("tex", 0i32);
        shader.set_uniform("tex", 0.0f32);
        shader.set_uniform("tex", 0.0f32);
        assert_eq!(headless::uploads(&driver), 2);
    }

    #[test]
    fn test_unknown_uniform_is_queried_every_time() {
        let (driver, context) = headless::context_with(uniform_driver());
        let mut shader = Shader::from_bundle_source(context, headless::SIMPLE_BUNDLE);
        driver.clear_calls();

        shader.set_uniform_f32("missing", 1.0);
        shader.set_uniform_f32("missing", 1.0);
        assert_eq!(shader.get_uniform_location("missing"), None);

        assert_eq!(
            driver.count_calls(
                |call| matches!(call, DriverCall::GetUniformLocation(name) if name == "missing")
            ),
            3
        );
        assert_eq!(headless::uploads(&driver), 0);
    }

    #[test]
    fn test_inert_shader_ignores_calls() {
        let (driver, context) = headless::context_with(uniform_driver());
        let mut shader = Shader::new(context);

        shader.use_program();
        shader.set_uniform_f32("mvp", 1.0);
        assert_eq!(shader.get_attrib_location("position"), None);
        assert!(!shader.bind_vertex_layout(&position_normal()));

        assert!(!shader.is_valid());
        assert!(!shader.is_in_use());
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn test_one_failing_stage_rejects_program_even_if_others_compile() {
        // A legacy build OR-ed the stage results together, so a program with
        // a compiled vertex stage and a broken fragment stage was kept. Every
        // stage has to compile here.
        let (driver, context) = headless::context_with(HeadlessDriver::new().fail_compile_on("BROKEN"));
        let bundle = "#pragma begin:vertex\nV\n#pragma end:vertex\n#pragma begin:fragment\nBROKEN\n#pragma end:fragment";
        let mut shader = Shader::new(context);

        match shader.load_bundle_source(bundle) {
            Err(ShaderError::Compilation { stage, log }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert_eq!(log, "0:1(1): error: syntax error");
            }
            other => panic!("Unexpected load result: {:?}", other),
        }
        assert!(!shader.is_valid());

        let calls = driver.calls();
        let program = match calls[0] {
            DriverCall::CreateProgram(program) => program,
            ref other => panic!("Unexpected first call: {:?}", other),
        };
        let vertex = match calls[1] {
            DriverCall::CreateShader(ShaderStage::Vertex, vertex) => vertex,
            ref other => panic!("Unexpected second call: {:?}", other),
        };

        assert!(calls.contains(&DriverCall::AttachShader(program, vertex)));
        assert!(calls.contains(&DriverCall::DeleteShader(vertex)));
        assert_eq!(calls.last(), Some(&DriverCall::DeleteProgram(program)));
        assert_eq!(headless::links(&driver), 0);
        // The broken stage object is deleted, never attached
        assert_eq!(
            driver.count_calls(|call| matches!(call, DriverCall::AttachShader(..))),
            1
        );
    }

    #[test]
    fn test_link_failure_tears_program_down() {
        let (driver, context) = headless::context();
        driver.set_fail_link(true);

        let mut shader = Shader::new(context);
        match shader.load_bundle_source(headless::SIMPLE_BUNDLE) {
            Err(ShaderError::Link(log)) => assert_eq!(log, "error: linking failed"),
            other => panic!("Unexpected load result: {:?}", other),
        }

        assert!(!shader.is_valid());
        assert_eq!(shader.vertex_shader(), None);
        assert_eq!(
            driver.count_calls(|call| matches!(call, DriverCall::DeleteShader(_))),
            2
        );
        assert_eq!(
            driver.count_calls(|call| matches!(call, DriverCall::DeleteProgram(_))),
            1
        );
    }

    #[test]
    fn test_geometry_stage() {
        let (driver, context) = headless::context();
        let shader = Shader::from_bundle_source(context, headless::GEOMETRY_BUNDLE);

        assert!(shader.is_valid());
        let geometry = shader.geometry_shader().unwrap();
        assert!(driver
            .calls()
            .contains(&DriverCall::CreateShader(ShaderStage::Geometry, geometry)));
        assert_eq!(
            driver.source_of(geometry).as_deref(),
            Some("layout(points) in;\n")
        );
    }

    #[test]
    fn test_stage_files() {
        let dir = std::env::temp_dir();
        let vertex_path = dir.join("proto_gl_stage_test.vert");
        let fragment_path = dir.join("proto_gl_stage_test.frag");
        std::fs::write(&vertex_path, "void main() { gl_Position = vec4(0.0); }").unwrap();
        std::fs::write(&fragment_path, "void main() {}").unwrap();

        let (driver, context) = headless::context();
        let shader = Shader::from_files(context.clone(), &vertex_path, &fragment_path, None);
        assert!(shader.is_valid());
        assert_eq!(
            driver.source_of(shader.fragment_shader().unwrap()).as_deref(),
            Some("void main() {}")
        );

        let mut broken = Shader::new(context);
        match broken.load_files(&vertex_path, &dir.join("proto_gl_missing.frag"), None) {
            Err(ShaderError::Resource(_)) => {}
            other => panic!("Unexpected load result: {:?}", other),
        }
        assert!(!broken.is_valid());

        std::fs::remove_file(&vertex_path).unwrap();
        std::fs::remove_file(&fragment_path).unwrap();
    }

    #[test]
    fn test_reload_releases_previous_program() {
        let (driver, context) = headless::context_with(uniform_driver());
        let mut shader = Shader::from_bundle_source(context.clone(), headless::SIMPLE_BUNDLE);
        let old_program = shader.program().unwrap();
        shader.use_program();
        driver.clear_calls();

        shader.load_bundle_source(headless::SIMPLE_BUNDLE).unwrap();
        let new_program = shader.program().unwrap();

        assert_ne!(old_program, new_program);
        assert_eq!(driver.calls()[0], DriverCall::DeleteProgram(old_program));
        assert_eq!(driver.calls()[1], DriverCall::CreateProgram(new_program));
        assert_eq!(context.state().shader_program.current(), Some(&None));
    }

    #[test]
    fn test_drop_resets_current_program() {
        let (driver, context) = headless::context();
        let shader = Shader::from_bundle_source(context.clone(), headless::SIMPLE_BUNDLE);
        let program = shader.program().unwrap();
        shader.use_program();
        driver.clear_calls();

        drop(shader);
        assert_eq!(driver.calls(), vec![DriverCall::DeleteProgram(program)]);
        assert_eq!(context.state().shader_program.current(), Some(&None));
    }

    #[test]
    fn test_drop_keeps_other_current_program() {
        let (_driver, context) = headless::context();
        let first = Shader::from_bundle_source(context.clone(), headless::SIMPLE_BUNDLE);
        let second = Shader::from_bundle_source(context.clone(), headless::SIMPLE_BUNDLE);
        second.use_program();

        drop(first);
        assert!(second.is_in_use());
    }

    #[test]
    fn test_attribute_lookup() {
        let driver = HeadlessDriver::new().with_attribute("position", 3);
        let (driver, context) = headless::context_with(driver);
        let mut shader = Shader::from_bundle_source(context, headless::SIMPLE_BUNDLE);
        driver.clear_calls();

        assert_eq!(shader.get_attrib_location("position"), Some(3));
        assert_eq!(shader.get_attrib_location("position"), Some(3));
        assert_eq!(shader.get_attrib_location("uv"), None);
        assert_eq!(shader.get_attrib_location("uv"), None);

        assert_eq!(
            driver.calls(),
            vec![
                DriverCall::GetAttribLocation("position".to_string()),
                DriverCall::GetAttribLocation("uv".to_string()),
                DriverCall::GetAttribLocation("uv".to_string()),
            ]
        );
    }

    #[test]
    fn test_bind_layout_relinks_only_on_change() {
        let (driver, context) = headless::context();
        let mut shader = Shader::from_bundle_source(context, headless::SIMPLE_BUNDLE);
        let program = shader.program().unwrap();
        driver.clear_calls();

        assert!(shader.bind_vertex_layout(&position_normal()));
        assert_eq!(bind_calls(&driver), 2);
        assert_eq!(headless::links(&driver), 1);
        assert!(driver.calls().contains(&DriverCall::BindAttribLocation {
            program,
            slot: 1,
            name: "normal".to_string(),
        }));

        driver.clear_calls();
        assert!(!shader.bind_vertex_layout(&position_normal()));
        assert!(driver.calls().is_empty());

        let with_uv = VertexLayout::new(vec![
            VertexAttribute::new("position", ShaderDataType::Float3, false),
            VertexAttribute::new("normal", ShaderDataType::Float3, false),
            VertexAttribute::new("uv", ShaderDataType::Float2, false),
        ]);
        assert!(shader.bind_vertex_layout(&with_uv));
        assert_eq!(bind_calls(&driver), 1);
        assert_eq!(headless::links(&driver), 1);

        driver.clear_calls();
        let swapped = vec![("normal".to_string(), 0), ("position".to_string(), 1)];
        assert!(shader.bind_attribute_locations(&swapped));
        assert_eq!(bind_calls(&driver), 2);
        assert_eq!(headless::links(&driver), 1);
    }

    #[test]
    fn test_relink_drops_uniform_cache() {
        let (driver, context) = headless::context_with(uniform_driver());
        let mut shader = Shader::from_bundle_source(context, headless::SIMPLE_BUNDLE);

        shader.set_uniform_f32("tex", 1.0);
        shader.bind_vertex_layout(&position_normal());
        shader.set_uniform_f32("tex", 1.0);

        assert_eq!(headless::uploads(&driver), 2);
        assert_eq!(
            driver.count_calls(|call| matches!(call, DriverCall::GetUniformLocation(_))),
            2
        );
    }

    #[test]
    fn test_failed_relink_leaves_shader_inert() {
        let (driver, context) = headless::context_with(uniform_driver());
        let mut shader = Shader::from_bundle_source(context.clone(), headless::SIMPLE_BUNDLE);
        let program = shader.program().unwrap();
        shader.set_uniform_f32("mvp", 0.0);
        assert!(shader.is_in_use());

        driver.set_fail_link(true);
        driver.clear_calls();
        assert!(shader.bind_vertex_layout(&position_normal()));

        assert!(!shader.is_valid());
        assert!(!shader.is_in_use());
        assert_eq!(driver.calls().last(), Some(&DriverCall::DeleteProgram(program)));
        assert_eq!(context.state().shader_program.current(), Some(&None));

        driver.clear_calls();
        shader.set_uniform_f32("mvp", 1.0);
        assert!(!shader.bind_vertex_layout(&position_normal()));
        assert!(driver.calls().is_empty());

        // Dropping it later deletes nothing twice
        drop(shader);
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn test_stage_ids_name_deleted_objects() {
        let (driver, context) = headless::context();
        let shader = Shader::from_bundle_source(context, headless::GEOMETRY_BUNDLE);

        let stages = [
            shader.vertex_shader(),
            shader.fragment_shader(),
            shader.geometry_shader(),
        ];
        for id in stages {
            let id = id.unwrap();
            assert!(driver.calls().contains(&DriverCall::DeleteShader(id)));
        }
    }
}
