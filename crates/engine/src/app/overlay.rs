use glam::{Vec2, Vec3};

use crate::world::{Actor, ActorKind, Building};

use super::camera::{CameraPose, Lens};
use super::chat::ChatMessage;
use super::projection::{world_to_screen, MapProjection, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Avatar,
    Npc,
}

impl From<ActorKind> for ColorRole {
    fn from(kind: ActorKind) -> Self {
        match kind {
            ActorKind::Avatar => ColorRole::Avatar,
            ActorKind::Npc => ColorRole::Npc,
        }
    }
}

/// Screen-space speech bubble anchored at `(x, y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLabel {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub color_role: ColorRole,
}

/// Building rectangle on the map, centred on `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingMarker {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinimapFrame {
    pub width: f32,
    pub height: f32,
    pub building_markers: Vec<BuildingMarker>,
    pub npc_markers: Vec<Vec2>,
    pub avatar_marker: Vec2,
    /// Starts at the avatar marker when a walk is in progress, empty otherwise.
    pub path_polyline: Vec<Vec2>,
    pub road_polylines: Vec<[Vec2; 2]>,
}

/// Everything the renderer reads for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub viewport: Viewport,
    pub avatar_position: Vec3,
    pub camera: CameraPose,
    pub lens: Lens,
    pub labels: Vec<OverlayLabel>,
    pub minimap: MinimapFrame,
    pub walk_hint: Option<Vec2>,
    pub chat_messages: Vec<ChatMessage>,
    pub composer_line: String,
}

/// Labels for every actor whose bubble is currently visible.
///
/// Anchors projected outside the clip depth (behind the camera) are dropped.
pub fn build_speech_labels<'a>(
    actors: impl IntoIterator<Item = &'a Actor>,
    pose: &CameraPose,
    lens: &Lens,
    viewport: Viewport,
) -> Vec<OverlayLabel> {
    actors
        .into_iter()
        .filter(|actor| actor.bubble_visible() && !actor.speech_text().is_empty())
        .filter_map(|actor| {
            let screen = world_to_screen(actor.label_anchor(), pose, lens, viewport);
            screen.is_in_clip_depth().then(|| OverlayLabel {
                text: actor.speech_text().to_string(),
                x: screen.x,
                y: screen.y,
                color_role: actor.kind().into(),
            })
        })
        .collect()
}

pub fn build_minimap<'a>(
    map: &MapProjection,
    tracked: Vec3,
    buildings: &[Building],
    npcs: &[Actor],
    waypoints: impl IntoIterator<Item = &'a Vec3>,
    road_origin: Vec3,
) -> MinimapFrame {
    let building_markers = buildings
        .iter()
        .map(|building| {
            let size =
                map.footprint_marker_size(building.footprint.width, building.footprint.depth);
            BuildingMarker {
                center: map.world_to_map(building.position(), tracked),
                width: size.x,
                height: size.y,
            }
        })
        .collect();

    let npc_markers = npcs
        .iter()
        .map(|npc| map.world_to_map(npc.position, tracked))
        .collect();

    let avatar_marker = map.world_to_map(tracked, tracked);
    let mut path_polyline: Vec<Vec2> = waypoints
        .into_iter()
        .map(|waypoint| map.world_to_map(*waypoint, tracked))
        .collect();
    if !path_polyline.is_empty() {
        path_polyline.insert(0, avatar_marker);
    }

    let road_start = map.world_to_map(road_origin, tracked);
    let road_polylines = buildings
        .iter()
        .map(|building| [road_start, map.world_to_map(building.position(), tracked)])
        .collect();

    MinimapFrame {
        width: map.width,
        height: map.height,
        building_markers,
        npc_markers,
        avatar_marker,
        path_polyline,
        road_polylines,
    }
}
