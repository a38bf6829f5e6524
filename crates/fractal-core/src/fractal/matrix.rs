use glam::{Mat3, Mat4, Quat, Vec3, Vec4};

/// GPU-compatible 3x4 transform: 48 bytes, matches the `float3x4` instance
/// buffer read by the shader.
///
/// The three scaled basis columns of the rotation come first, then the
/// translation. The homogeneous bottom row (0, 0, 0, 1) is implied and not
/// stored, which saves a quarter of the upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedMatrix {
    pub x_axis: [f32; 3],
    pub y_axis: [f32; 3],
    pub z_axis: [f32; 3],
    pub translation: [f32; 3],
}

impl PackedMatrix {
    pub const IDENTITY: Self = Self {
        x_axis: [1.0, 0.0, 0.0],
        y_axis: [0.0, 1.0, 0.0],
        z_axis: [0.0, 0.0, 1.0],
        translation: [0.0; 3],
    };

    /// Pack a uniformly scaled rotation and a translation.
    #[inline]
    pub fn pack(rotation: Quat, position: Vec3, scale: f32) -> Self {
        let r = Mat3::from_quat(rotation) * scale;
        Self {
            x_axis: r.x_axis.to_array(),
            y_axis: r.y_axis.to_array(),
            z_axis: r.z_axis.to_array(),
            translation: position.to_array(),
        }
    }

    /// Rotation-scale part as a 3x3 matrix.
    pub fn basis(&self) -> Mat3 {
        Mat3::from_cols(
            Vec3::from_array(self.x_axis),
            Vec3::from_array(self.y_axis),
            Vec3::from_array(self.z_axis),
        )
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::from_array(self.translation)
    }

    /// Expand back to a full 4x4 matrix with the implied bottom row.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols(
            Vec3::from_array(self.x_axis).extend(0.0),
            Vec3::from_array(self.y_axis).extend(0.0),
            Vec3::from_array(self.z_axis).extend(0.0),
            Vec4::new(self.translation[0], self.translation[1], self.translation[2], 1.0),
        )
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.basis() * point + self.translation()
    }
}
