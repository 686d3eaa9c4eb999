#[cfg(test)]
mod vertex_layout_test {
    use crate::core::platform::headless::{DriverCall, HeadlessDriver};
    use crate::core::rendering::shader::Shader;
    use crate::core::rendering::vertex_layout::{ShaderDataType, VertexAttribute, VertexLayout};
    use crate::tests::shared_headless::headless;

    fn layout() -> VertexLayout {
        VertexLayout::new(vec![
            VertexAttribute::new("position", ShaderDataType::Float3, false),
            VertexAttribute::new("uv", ShaderDataType::Float2, false),
            VertexAttribute::new("color", ShaderDataType::UByte4, true),
        ])
    }

    #[test]
    fn test_offsets_and_stride() {
        let layout = layout();
        assert_eq!(layout.get_stride(), 24);

        let offsets: Vec<u32> = layout.iter().map(|attribute| attribute.get_offset()).collect();
        assert_eq!(offsets, vec![0, 12, 20]);

        assert_eq!(
            layout.locations(),
            vec![
                ("position".to_string(), 0),
                ("uv".to_string(), 1),
                ("color".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_data_type_sizes() {
        assert_eq!(ShaderDataType::Float.get_size(), 4);
        assert_eq!(ShaderDataType::Float4.get_size(), 16);
        assert_eq!(ShaderDataType::UByte4.get_size(), 4);
        assert_eq!(ShaderDataType::UByte4.get_component_count(), 4);
        assert_eq!(ShaderDataType::UByte4.gl_component_type(), glow::UNSIGNED_BYTE);
        assert_eq!(ShaderDataType::Float2.gl_component_type(), glow::FLOAT);
    }

    #[test]
    fn test_enable_skips_unknown_attributes() {
        let driver = HeadlessDriver::new()
            .with_attribute("position", 0)
            .with_attribute("color", 2);
        let (driver, context) = headless::context_with(driver);
        let mut shader = Shader::from_bundle_source(context, headless::SIMPLE_BUNDLE);
        driver.clear_calls();

        layout().enable(&mut shader);

        let pointers: Vec<DriverCall> = driver
            .calls()
            .into_iter()
            .filter(|call| {
                matches!(
                    call,
                    DriverCall::EnableVertexAttribArray(_) | DriverCall::VertexAttribPointer { .. }
                )
            })
            .collect();
        assert_eq!(
            pointers,
            vec![
                DriverCall::EnableVertexAttribArray(0),
                DriverCall::VertexAttribPointer {
                    slot: 0,
                    size: 3,
                    stride: 24,
                    offset: 0,
                },
                DriverCall::EnableVertexAttribArray(2),
                DriverCall::VertexAttribPointer {
                    slot: 2,
                    size: 4,
                    stride: 24,
                    offset: 20,
                },
            ]
        );
    }
}
