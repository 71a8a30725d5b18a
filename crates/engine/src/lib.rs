pub mod app;
pub mod world;

pub use app::{
    build_minimap, build_speech_labels, run_app, run_app_with_metrics, screen_to_ground,
    view_projection, world_to_screen, AppError, BuildingMarker, CameraCommand, CameraPose,
    CameraState, ChatMessage, ChatMode, ChatOutcome, ChatState, ColorRole, FrameSnapshot,
    InputEvent, KeyInput, Lens, LoopConfig, LoopMetricsSnapshot, MapProjection, MessageKind,
    MetricsHandle, MinimapFrame, MovementIntegrator, MovementState, MovementStep, OverlayLabel,
    Renderer, Sandbox, ScreenPoint, Viewport, ARRIVAL_THRESHOLD,
};
pub use world::{
    find_cell_path, find_path, Actor, ActorKind, Building, BuildingKind, Footprint, GridCell,
    GridCoord, Greeting, LayoutError, NpcSpec, TileGrid, WorldLayout,
};

/// Cells per grid side.
pub const GRID_SIZE: u32 = 32;
/// World units per cell side.
pub const TILE_SIZE: f32 = 2.0;
/// Avatar walking speed in world units per second.
pub const PLAYER_SPEED: f32 = 4.0;
/// Seconds advanced per simulation tick when the host does not override it.
pub const NOMINAL_TICK_SECONDS: f32 = 0.016;
