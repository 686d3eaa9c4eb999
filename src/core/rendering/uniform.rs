use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

/// A value that can be uploaded to a shader uniform.
///
/// Two values are only equal when they hold the same variant, so an `Int(1)`
/// never matches a `Float(1.0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            UniformValue::Int(_) => "int",
            UniformValue::Float(_) => "float",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat2(_) => "mat2",
            UniformValue::Mat3(_) => "mat3",
            UniformValue::Mat4(_) => "mat4",
        }
    }

    #[inline(always)]
    pub fn is_matrix(&self) -> bool {
        matches!(
            self,
            UniformValue::Mat2(_) | UniformValue::Mat3(_) | UniformValue::Mat4(_)
        )
    }

    /// Whether `other` holds the same kind of value, regardless of its content
    #[inline(always)]
    pub fn same_type(&self, other: &UniformValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<(f32, f32)> for UniformValue {
    fn from((x, y): (f32, f32)) -> Self {
        UniformValue::Vec2(Vec2::new(x, y))
    }
}

impl From<(f32, f32, f32)> for UniformValue {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        UniformValue::Vec3(Vec3::new(x, y, z))
    }
}

impl From<(f32, f32, f32, f32)> for UniformValue {
    fn from((x, y, z, w): (f32, f32, f32, f32)) -> Self {
        UniformValue::Vec4(Vec4::new(x, y, z, w))
    }
}

impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self {
        UniformValue::Vec2(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        UniformValue::Vec4(value)
    }
}

impl From<Mat2> for UniformValue {
    fn from(value: Mat2) -> Self {
        UniformValue::Mat2(value)
    }
}

impl From<Mat3> for UniformValue {
    fn from(value: Mat3) -> Self {
        UniformValue::Mat3(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        UniformValue::Mat4(value)
    }
}

/// Last value written to a uniform location, along with its transpose flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedUniform {
    pub value: UniformValue,
    pub transpose: bool,
}

impl CachedUniform {
    /// Returns true if `value` is already what the location holds.
    ///
    /// Otherwise the entry takes the new value (even if it changed type) and
    /// false is returned, meaning an upload is needed.
    pub fn update(&mut self, value: UniformValue, transpose: bool) -> bool {
        if self.value == value && self.transpose == transpose {
            return true;
        }

        self.value = value;
        self.transpose = transpose;
        false
    }
}
