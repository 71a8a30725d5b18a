use glam::{Mat4, Vec2, Vec3};

use super::camera::{CameraPose, Lens};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }
}

/// Window size before the first resize event arrives.
pub const DEFAULT_VIEWPORT: Viewport = Viewport {
    width: 1280,
    height: 720,
};

/// Pixel position plus normalized depth of a projected world point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl ScreenPoint {
    /// False for points behind the camera or past the far plane.
    pub fn is_in_clip_depth(&self) -> bool {
        self.depth.is_finite() && (-1.0..=1.0).contains(&self.depth)
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

pub fn view_projection(pose: &CameraPose, lens: &Lens, viewport: Viewport) -> Mat4 {
    lens.projection(viewport.aspect()) * pose.view_matrix()
}

/// Projects through the current frame's camera to pixel space (y grows downward).
pub fn world_to_screen(
    world: Vec3,
    pose: &CameraPose,
    lens: &Lens,
    viewport: Viewport,
) -> ScreenPoint {
    let ndc = view_projection(pose, lens, viewport).project_point3(world);
    ScreenPoint {
        x: (ndc.x * 0.5 + 0.5) * viewport.width as f32,
        y: (ndc.y * -0.5 + 0.5) * viewport.height as f32,
        depth: ndc.z,
    }
}

/// Casts a ray through a pixel and intersects it with the `y = 0` ground plane.
///
/// Returns `None` when the ray runs parallel to or away from the ground, or when the hit
/// lies outside `[-half_extent, half_extent)` on either axis.
pub fn screen_to_ground(
    screen_px: Vec2,
    pose: &CameraPose,
    lens: &Lens,
    viewport: Viewport,
    half_extent: f32,
) -> Option<Vec3> {
    if viewport.width == 0 || viewport.height == 0 || !screen_px.is_finite() {
        return None;
    }
    let ndc_x = screen_px.x / viewport.width as f32 * 2.0 - 1.0;
    let ndc_y = 1.0 - screen_px.y / viewport.height as f32 * 2.0;

    let inverse = view_projection(pose, lens, viewport).inverse();
    let near = inverse.project_point3(Vec3::new(ndc_x, ndc_y, -1.0));
    let far = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
    let direction = far - near;
    if direction.y.abs() <= f32::EPSILON {
        return None;
    }

    let t = -near.y / direction.y;
    if !t.is_finite() || t < 0.0 {
        return None;
    }
    let hit = near + direction * t;
    let inside = |value: f32| value >= -half_extent && value < half_extent;
    if !inside(hit.x) || !inside(hit.z) {
        return None;
    }
    Some(Vec3::new(hit.x, 0.0, hit.z))
}

pub const DEFAULT_MAP_SCALE: f32 = 0.2;
const MAP_POSITION_GAIN: f32 = 4.0;
const MAP_FOOTPRINT_GAIN: f32 = 10.0;

/// Avatar-centred top-down projection for the overview map. Never rotates with the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProjection {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl MapProjection {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scale: DEFAULT_MAP_SCALE,
        }
    }

    pub fn world_to_map(&self, world: Vec3, tracked: Vec3) -> Vec2 {
        Vec2::new(
            (world.x - tracked.x) * self.scale * MAP_POSITION_GAIN + self.width / 2.0,
            (world.z - tracked.z) * self.scale * MAP_POSITION_GAIN + self.height / 2.0,
        )
    }

    pub fn footprint_marker_size(&self, width: f32, depth: f32) -> Vec2 {
        Vec2::new(
            width * self.scale * MAP_FOOTPRINT_GAIN,
            depth * self.scale * MAP_FOOTPRINT_GAIN,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::camera::CameraState;

    const VIEWPORT: Viewport = Viewport {
        width: 1280,
        height: 720,
    };

    fn default_pose() -> CameraPose {
        CameraState::default().pose_for(Vec3::new(0.0, 0.8, 0.0))
    }

    #[test]
    fn look_at_target_lands_on_viewport_centre() {
        let pose = default_pose();
        let point = world_to_screen(pose.look_at, &pose, &Lens::default(), VIEWPORT);
        assert!((point.x - 640.0).abs() < 0.01);
        assert!((point.y - 360.0).abs() < 0.01);
        assert!(point.is_in_clip_depth());
    }

    #[test]
    fn higher_points_project_higher_on_screen() {
        let pose = default_pose();
        let lens = Lens::default();
        let feet = world_to_screen(Vec3::new(0.0, 0.8, 0.0), &pose, &lens, VIEWPORT);
        let head = world_to_screen(Vec3::new(0.0, 3.3, 0.0), &pose, &lens, VIEWPORT);
        assert!(head.y < feet.y);
    }

    #[test]
    fn points_behind_the_camera_fall_outside_clip_depth() {
        let pose = default_pose();
        let behind = pose.position + (pose.position - pose.look_at);
        let point = world_to_screen(behind, &pose, &Lens::default(), VIEWPORT);
        assert!(!point.is_in_clip_depth());
    }

    #[test]
    fn ground_pick_inverts_screen_projection() {
        let pose = default_pose();
        let lens = Lens::default();
        let ground = Vec3::new(-3.0, 0.0, 2.5);
        let screen = world_to_screen(ground, &pose, &lens, VIEWPORT);

        let picked =
            screen_to_ground(screen.to_vec2(), &pose, &lens, VIEWPORT, 32.0).expect("ground hit");
        assert!(picked.abs_diff_eq(ground, 1e-2), "picked {picked:?}");
    }

    #[test]
    fn ground_pick_near_the_horizon_misses_the_grid() {
        let pose = default_pose();
        let picked = screen_to_ground(
            Vec2::new(640.0, 0.0),
            &pose,
            &Lens::default(),
            VIEWPORT,
            32.0,
        );
        assert_eq!(picked, None);
    }

    #[test]
    fn ground_pick_rejects_empty_viewport() {
        let pose = default_pose();
        let empty = Viewport {
            width: 0,
            height: 0,
        };
        assert_eq!(
            screen_to_ground(Vec2::ZERO, &pose, &Lens::default(), empty, 32.0),
            None
        );
    }

    #[test]
    fn tracked_actor_sits_at_map_centre() {
        let map = MapProjection::new(150.0, 150.0);
        let tracked = Vec3::new(7.0, 0.8, -3.0);
        assert_eq!(map.world_to_map(tracked, tracked), Vec2::new(75.0, 75.0));
    }

    #[test]
    fn map_offset_scales_by_point_eight_per_world_unit() {
        let map = MapProjection::new(150.0, 150.0);
        let point = map.world_to_map(Vec3::new(5.0, 0.0, -3.0), Vec3::ZERO);
        assert!(point.abs_diff_eq(Vec2::new(79.0, 72.6), 1e-4));
    }

    #[test]
    fn footprint_marker_uses_a_larger_gain_than_positions() {
        let map = MapProjection::new(150.0, 150.0);
        assert!(map
            .footprint_marker_size(4.0, 4.0)
            .abs_diff_eq(Vec2::new(8.0, 8.0), 1e-5));
    }
}
