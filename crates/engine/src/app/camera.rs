use std::f32::consts::FRAC_PI_4;

use glam::{Mat4, Vec3};
use tracing::debug;

use super::input::KeyInput;

pub const DEFAULT_ORBIT_DISTANCE: f32 = 12.0;
pub const DEFAULT_ORBIT_HEIGHT: f32 = 8.0;
pub const MIN_ORBIT_DISTANCE: f32 = 8.0;
pub const MAX_ORBIT_DISTANCE: f32 = 16.0;
pub const ORBIT_ZOOM_STEP: f32 = 2.0;
pub const ORBIT_ROTATE_STEP_RADIANS: f32 = FRAC_PI_4;
/// The camera aims this far above the tracked actor's position.
pub const LOOK_AT_LIFT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCommand {
    RotateLeft,
    RotateRight,
    ZoomIn,
    ZoomOut,
}

impl CameraCommand {
    pub fn from_key(key: KeyInput) -> Option<Self> {
        match key {
            KeyInput::ArrowLeft => Some(CameraCommand::RotateLeft),
            KeyInput::ArrowRight => Some(CameraCommand::RotateRight),
            KeyInput::ArrowUp => Some(CameraCommand::ZoomIn),
            KeyInput::ArrowDown => Some(CameraCommand::ZoomOut),
            _ => None,
        }
    }

    pub fn event_name(self) -> &'static str {
        match self {
            CameraCommand::RotateLeft | CameraCommand::RotateRight => "camera_rotated",
            CameraCommand::ZoomIn | CameraCommand::ZoomOut => "camera_zoomed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub orbit_angle: f32,
    pub distance: f32,
    pub height: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            orbit_angle: 0.0,
            distance: DEFAULT_ORBIT_DISTANCE,
            height: DEFAULT_ORBIT_HEIGHT,
        }
    }
}

impl CameraState {
    pub fn apply(&mut self, command: CameraCommand) {
        match command {
            CameraCommand::RotateLeft => self.orbit_angle += ORBIT_ROTATE_STEP_RADIANS,
            CameraCommand::RotateRight => self.orbit_angle -= ORBIT_ROTATE_STEP_RADIANS,
            CameraCommand::ZoomIn => {
                self.distance = clamp_orbit_distance(self.distance - ORBIT_ZOOM_STEP)
            }
            CameraCommand::ZoomOut => {
                self.distance = clamp_orbit_distance(self.distance + ORBIT_ZOOM_STEP)
            }
        }
        debug!(
            command = ?command,
            orbit_angle = self.orbit_angle,
            distance = self.distance,
            "{}",
            command.event_name()
        );
    }

    /// Pose orbiting `subject`; recomputed from scratch every frame.
    pub fn pose_for(&self, subject: Vec3) -> CameraPose {
        let offset = Vec3::new(
            self.orbit_angle.cos() * self.distance,
            self.height,
            self.orbit_angle.sin() * self.distance,
        );
        CameraPose {
            position: subject + offset,
            look_at: subject + Vec3::new(0.0, LOOK_AT_LIFT, 0.0),
        }
    }
}

fn clamp_orbit_distance(distance: f32) -> f32 {
    if !distance.is_finite() {
        return DEFAULT_ORBIT_DISTANCE;
    }
    distance.clamp(MIN_ORBIT_DISTANCE, MAX_ORBIT_DISTANCE)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }
}

/// Perspective lens parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    pub vertical_fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            vertical_fov_degrees: 55.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Lens {
    pub fn projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        Mat4::perspective_rh_gl(
            self.vertical_fov_degrees.to_radians(),
            aspect,
            self.near,
            self.far,
        )
    }
}
