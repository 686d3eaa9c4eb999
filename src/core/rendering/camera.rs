use glam::{Mat4, Vec2, Vec3};

/// Free-fly camera: a position plus yaw and pitch angles.
///
/// Right handed, looking down -Z when both angles are zero.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    position: Vec3,
    /// Rotation around the world up axis, in radians
    yaw: f32,
    /// Rotation around the camera right axis, in radians
    pitch: f32,
    aspect_ratio: f32,
    params: PerspectiveParams,
}

#[derive(Debug, Clone, Copy)]
pub struct PerspectiveParams {
    pub y_fov_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera::new(
            Vec3::ZERO,
            4.0 / 3.0,
            PerspectiveParams {
                y_fov_degrees: 45.0,
                z_near: 0.1,
                z_far: 100.0,
            },
        )
    }
}

impl Camera {
    const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

    pub fn new(position: Vec3, aspect_ratio: f32, params: PerspectiveParams) -> Self {
        Camera {
            position,
            yaw: 0.0,
            pitch: 0.0,
            aspect_ratio,
            params,
        }
    }

    #[inline(always)]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline(always)]
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    #[inline(always)]
    pub fn set_aspect_ratio(&mut self, new_aspect_ratio: f32) {
        self.aspect_ratio = new_aspect_ratio;
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            -self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Add `delta.x` to the pitch and `delta.y` to the yaw. Pitch is clamped
    /// short of straight up or down.
    pub fn rotate(&mut self, delta: Vec2) {
        self.pitch = (self.pitch + delta.x).clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
        self.yaw += delta.y;
    }

    /// World space to view space
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    /// View space to clip space
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.params.y_fov_degrees.to_radians(),
            self.aspect_ratio,
            self.params.z_near,
            self.params.z_far,
        )
    }
}
