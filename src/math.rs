use glam::{Mat3, Vec3};

/// Normalizes `v`, mapping a zero-length vector to the zero vector instead of NaN.
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let length = v.length();
    if length == 0.0 {
        Vec3::ZERO
    } else {
        v / length
    }
}

/// A location in world space. Kept apart from `Vec3` so positions and directions
/// can't be mixed up at call sites.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point3(pub Vec3);

impl Point3 {
    pub const ORIGIN: Self = Self(Vec3::ZERO);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    pub fn distance_to(&self, other: Point3) -> f32 {
        self.0.distance(other.0)
    }

    /// Squared distance, for comparisons that don't need the square root.
    pub fn fast_distance_to(&self, other: Point3) -> f32 {
        self.0.distance_squared(other.0)
    }

    pub fn offset(&self, v: Vec3) -> Point3 {
        Point3(self.0 + v)
    }

    pub fn vector_to(&self, other: Point3) -> Vec3 {
        other.0 - self.0
    }

    pub fn to_vec3(self) -> Vec3 {
        self.0
    }
}

/// Rotation about an arbitrary axis, angle in degrees.
///
/// The 3x3 coefficients are cached and rebuilt whenever the axis or the angle changes.
#[derive(Clone, Copy, Debug)]
pub struct RotationMatrix {
    axis: Vec3,
    angle: f32,
    matrix: Mat3,
}

impl RotationMatrix {
    pub fn new(axis: Vec3, angle_degrees: f32) -> Self {
        let mut rotation = Self {
            axis: safe_normalize(axis),
            angle: angle_degrees,
            matrix: Mat3::IDENTITY,
        };
        rotation.rebuild();
        rotation
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn set_axis(&mut self, axis: Vec3) {
        self.axis = safe_normalize(axis);
        self.rebuild();
    }

    pub fn set_angle(&mut self, angle_degrees: f32) {
        self.angle = angle_degrees;
        self.rebuild();
    }

    pub fn multiply(&self, v: Vec3) -> Vec3 {
        self.matrix * v
    }

    // Rodrigues' rotation formula, written out row by row.
    fn rebuild(&mut self) {
        if self.axis == Vec3::ZERO {
            self.matrix = Mat3::IDENTITY;
            return;
        }
        let (s, c) = self.angle.to_radians().sin_cos();
        let t = 1.0 - c;
        let Vec3 { x, y, z } = self.axis;

        let row0 = Vec3::new(c + x * x * t, x * y * t - z * s, x * z * t + y * s);
        let row1 = Vec3::new(y * x * t + z * s, c + y * y * t, y * z * t - x * s);
        let row2 = Vec3::new(z * x * t - y * s, z * y * t + x * s, c + z * z * t);

        self.matrix = Mat3::from_cols(row0, row1, row2).transpose();
    }
}
