use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use neoncity_common::Ray;
use serde::{Deserialize, Serialize};

use crate::mode::Mode;

/// Vertical field of view used for projection and picking.
pub const FOV_Y_DEGREES: f32 = 75.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 5000.0;

/// Screen size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Pixel coordinates to normalized device coordinates (y up).
    pub fn to_ndc(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            screen.x / self.width * 2.0 - 1.0,
            -(screen.y / self.height) * 2.0 + 1.0,
        )
    }
}

/// Camera pose plus the mode that produced it.
///
/// Orientation is yaw about +Y then pitch about the local X axis (Y-X-Z
/// Euler order, no roll). At zero yaw and pitch the camera looks down -Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub mode: Mode,
}

impl CameraState {
    /// Pose at `position` facing `target`. A degenerate target keeps the
    /// default orientation.
    pub fn looking_at(position: Vec3, target: Vec3, mode: Mode) -> Self {
        let (yaw, pitch) = yaw_pitch_towards(target - position).unwrap_or((0.0, 0.0));
        Self {
            position,
            yaw,
            pitch,
            mode,
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    /// Horizontal right vector; pitch does not tilt it.
    pub fn right(&self) -> Vec3 {
        self.orientation() * Vec3::X
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self, viewport: Viewport) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), viewport.aspect(), NEAR, FAR)
    }

    /// World-space ray from the camera through a screen pixel.
    pub fn ray_through(&self, screen: Vec2, viewport: Viewport) -> Ray {
        let ndc = viewport.to_ndc(screen);
        let tan_half = (FOV_Y_DEGREES.to_radians() / 2.0).tan();
        let local = Vec3::new(ndc.x * tan_half * viewport.aspect(), ndc.y * tan_half, -1.0);
        Ray::new(self.position, self.orientation() * local)
    }
}

/// Yaw and pitch that point the forward axis along `direction`.
pub fn yaw_pitch_towards(direction: Vec3) -> Option<(f32, f32)> {
    let d = direction.try_normalize()?;
    Some((f32::atan2(-d.x, -d.z), d.y.clamp(-1.0, 1.0).asin()))
}
