#[cfg(test)]
mod uniform_test {
    use glam::{Mat3, Mat4, Vec2, Vec3};

    use crate::core::rendering::uniform::{CachedUniform, UniformValue};

    #[test]
    fn test_equality_is_per_variant() {
        assert_eq!(UniformValue::Int(1), UniformValue::Int(1));
        assert_ne!(UniformValue::Int(1), UniformValue::Int(2));
        assert_ne!(UniformValue::Int(1), UniformValue::Float(1.0));
        assert_ne!(
            UniformValue::Vec2(Vec2::ZERO),
            UniformValue::Vec3(Vec3::ZERO)
        );

        assert!(UniformValue::Float(1.0).same_type(&UniformValue::Float(4.0)));
        assert!(!UniformValue::Mat3(Mat3::IDENTITY).same_type(&UniformValue::Mat4(Mat4::IDENTITY)));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(UniformValue::from(3i32), UniformValue::Int(3));
        assert_eq!(UniformValue::from(0.5f32), UniformValue::Float(0.5));
        assert_eq!(
            UniformValue::from((1.0f32, 2.0f32, 3.0f32)),
            UniformValue::Vec3(Vec3::new(1.0, 2.0, 3.0))
        );
        assert_eq!(
            UniformValue::from(Mat4::IDENTITY),
            UniformValue::Mat4(Mat4::IDENTITY)
        );

        assert_eq!(UniformValue::from(Mat4::IDENTITY).type_name(), "mat4");
        assert!(UniformValue::from(Mat4::IDENTITY).is_matrix());
        assert!(!UniformValue::from((1.0f32, 2.0f32)).is_matrix());
    }

    #[test]
    fn test_cached_uniform_update() {
        let mut cached = CachedUniform {
            value: UniformValue::Mat4(Mat4::IDENTITY),
            transpose: false,
        };

        assert!(cached.update(UniformValue::Mat4(Mat4::IDENTITY), false));
        // Same matrix, other transpose flag: needs an upload
        assert!(!cached.update(UniformValue::Mat4(Mat4::IDENTITY), true));
        assert!(cached.transpose);

        // A value of another type replaces the entry
        assert!(!cached.update(UniformValue::Int(0), false));
        assert_eq!(cached.value, UniformValue::Int(0));
        assert!(cached.update(UniformValue::Int(0), false));
    }
}
