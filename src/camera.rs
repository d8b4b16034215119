use glam::{Mat4, Vec3};

use crate::math::{Point3, safe_normalize};

pub const PITCH_LIMIT: f32 = 89.0;
pub const DEFAULT_SPEED: f32 = 0.5;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 4] = [
        MoveDirection::Forward,
        MoveDirection::Backward,
        MoveDirection::StrafeLeft,
        MoveDirection::StrafeRight,
    ];
}

/// Free-flying first person camera. Angles are in degrees.
#[derive(Clone, Debug)]
pub struct FlyCamera {
    pub position: Point3,
    front: Vec3,
    up: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub speed: f32,
    pub sensitivity: f32,
}

impl FlyCamera {
    pub fn new(eye: Point3, target: Point3) -> Self {
        let front = safe_normalize(eye.vector_to(target));
        let front = if front == Vec3::ZERO { Vec3::NEG_Z } else { front };
        Self {
            position: eye,
            front,
            up: Vec3::Y,
            pitch: front.y.clamp(-1.0, 1.0).asin().to_degrees(),
            yaw: front.z.atan2(front.x).to_degrees(),
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        safe_normalize(self.front.cross(self.up))
    }

    /// Accumulates a pointer offset from the screen centre. `front` is only
    /// refreshed by the next [`FlyCamera::apply_rotation`].
    pub fn update_rotation(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.sensitivity;
        self.pitch -= y_offset * self.sensitivity;
    }

    pub fn apply_rotation(&mut self) {
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let pitch_rad = self.pitch.to_radians();
        let yaw_rad = self.yaw.to_radians();
        self.front = safe_normalize(Vec3::new(
            pitch_rad.cos() * yaw_rad.cos(),
            pitch_rad.sin(),
            pitch_rad.cos() * yaw_rad.sin(),
        ));
    }

    pub fn apply_movement(&mut self, direction: MoveDirection, speed: f32) {
        let step = match direction {
            MoveDirection::Forward => self.front * speed,
            MoveDirection::Backward => -self.front * speed,
            MoveDirection::StrafeRight => self.right() * speed,
            MoveDirection::StrafeLeft => -self.right() * speed,
        };
        self.position = self.position.offset(step);
    }

    pub fn build_view_matrix(&self) -> Mat4 {
        let eye = self.position.to_vec3();
        Mat4::look_at_rh(eye, eye + self.front, self.up)
    }
}

pub struct Projection {
    aspect: f32,
    fovy: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, fovy_degrees: f32, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: aspect_ratio(width, height),
            fovy: fovy_degrees.to_radians(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn build_projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(1, 1, 90.0, 0.1, 1000.0)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
