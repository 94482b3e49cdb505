//! The shared per-frame uniform block and controller pose state.
//!
//! Every compiled shader stage sees a single `CommonUniforms` block with the
//! camera transforms, controller poses, grid resolution, and timing for the
//! current frame. The Rust struct here must match the WGSL declaration in
//! [`crate::shaders::COMMON_UNIFORMS_WGSL`] byte for byte; the layout tests
//! below pin the agreed offsets.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3, Vec4};

/// Number of tracked controller slots (left and right hand).
pub const CONTROLLER_COUNT: usize = 2;

/// Per-frame parameters shared by the simulation and shade programs.
///
/// Uploaded once per frame to a single uniform buffer bound at group 0,
/// binding 0. Matrices are column-major. The explicit `_pad` tail keeps the
/// size a multiple of 16 bytes as uniform buffer layout requires.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CommonUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_projection: [[f32; 4]; 4],
    pub inverse_view: [[f32; 4]; 4],
    pub inverse_projection: [[f32; 4]; 4],
    pub inverse_view_projection: [[f32; 4]; 4],
    pub controller_transform: [[[f32; 4]; 4]; CONTROLLER_COUNT],
    pub controller_velocity: [[f32; 4]; CONTROLLER_COUNT],
    pub controller_buttons: [[f32; 4]; CONTROLLER_COUNT],
    pub grid_size: [i32; 2],
    pub resolution: [f32; 2],
    pub time: f32,
    pub time_delta: f32,
    pub frame: u32,
    pub _pad: u32,
}

impl CommonUniforms {
    /// Store the camera matrices and refresh every derived transform.
    ///
    /// Derived values never go stale: they are recomputed on every set, not
    /// lazily.
    pub fn set_view_projection(&mut self, view: Mat4, projection: Mat4) {
        let view_projection = projection * view;

        self.view = view.to_cols_array_2d();
        self.projection = projection.to_cols_array_2d();
        self.view_projection = view_projection.to_cols_array_2d();
        self.inverse_view = view.inverse().to_cols_array_2d();
        self.inverse_projection = projection.inverse().to_cols_array_2d();
        self.inverse_view_projection = view_projection.inverse().to_cols_array_2d();
    }
}

impl Default for CommonUniforms {
    fn default() -> Self {
        let mut uniforms = Self::zeroed();
        uniforms.set_view_projection(Mat4::IDENTITY, Mat4::IDENTITY);
        uniforms
    }
}

/// Pose input for one tracked controller.
#[derive(Debug, Clone, Copy)]
pub struct ControllerPose {
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
    pub buttons: Vec4,
}

impl ControllerPose {
    /// World transform for this pose: translation followed by orientation.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }
}

impl Default for ControllerPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            buttons: Vec4::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_block_size_is_16_byte_aligned() {
        assert_eq!(size_of::<CommonUniforms>(), 608);
        assert_eq!(size_of::<CommonUniforms>() % 16, 0);
    }

    #[test]
    fn test_field_offsets_match_wgsl_layout() {
        // These offsets mirror the WGSL struct in COMMON_UNIFORMS_WGSL;
        // change both together or the GPU reads garbage.
        assert_eq!(offset_of!(CommonUniforms, view), 0);
        assert_eq!(offset_of!(CommonUniforms, projection), 64);
        assert_eq!(offset_of!(CommonUniforms, view_projection), 128);
        assert_eq!(offset_of!(CommonUniforms, inverse_view), 192);
        assert_eq!(offset_of!(CommonUniforms, inverse_projection), 256);
        assert_eq!(offset_of!(CommonUniforms, inverse_view_projection), 320);
        assert_eq!(offset_of!(CommonUniforms, controller_transform), 384);
        assert_eq!(offset_of!(CommonUniforms, controller_velocity), 512);
        assert_eq!(offset_of!(CommonUniforms, controller_buttons), 544);
        assert_eq!(offset_of!(CommonUniforms, grid_size), 576);
        assert_eq!(offset_of!(CommonUniforms, resolution), 584);
        assert_eq!(offset_of!(CommonUniforms, time), 592);
        assert_eq!(offset_of!(CommonUniforms, time_delta), 596);
        assert_eq!(offset_of!(CommonUniforms, frame), 600);
    }

    #[test]
    fn test_set_view_projection_refreshes_inverses() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.01, 1000.0);

        let mut uniforms = CommonUniforms::default();
        uniforms.set_view_projection(view, projection);

        let round_trip = Mat4::from_cols_array_2d(&uniforms.view)
            * Mat4::from_cols_array_2d(&uniforms.inverse_view);
        assert!(round_trip.abs_diff_eq(Mat4::IDENTITY, 1e-5));

        let vp = Mat4::from_cols_array_2d(&uniforms.view_projection);
        assert!(vp.abs_diff_eq(projection * view, 1e-6));
    }

    #[test]
    fn test_controller_transform_order() {
        let pose = ControllerPose {
            position: Vec3::new(1.0, 2.0, 3.0),
            orientation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ..Default::default()
        };

        // Translation applies after rotation: the origin lands on `position`.
        let origin = pose.transform() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin - Vec4::new(1.0, 2.0, 3.0, 1.0)).length() < 1e-6);
    }
}
