mod camera;
mod chat;
mod input;
mod loop_runner;
mod metrics;
mod movement;
mod overlay;
mod projection;
mod rendering;
mod session;

pub use camera::{
    CameraCommand, CameraPose, CameraState, Lens, DEFAULT_ORBIT_DISTANCE, DEFAULT_ORBIT_HEIGHT,
    LOOK_AT_LIFT, MAX_ORBIT_DISTANCE, MIN_ORBIT_DISTANCE, ORBIT_ROTATE_STEP_RADIANS,
    ORBIT_ZOOM_STEP,
};
pub use chat::{
    ChatMessage, ChatMode, ChatOutcome, ChatState, MessageKind, CARET_BLINK_SECONDS,
    CHAT_VISIBLE_MESSAGES, IDLE_PROMPT,
};
pub use input::{InputEvent, KeyInput};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use movement::{MovementIntegrator, MovementState, MovementStep, ARRIVAL_THRESHOLD};
pub use overlay::{
    build_minimap, build_speech_labels, BuildingMarker, ColorRole, FrameSnapshot, MinimapFrame,
    OverlayLabel,
};
pub use projection::{
    screen_to_ground, view_projection, world_to_screen, MapProjection, ScreenPoint, Viewport,
    DEFAULT_MAP_SCALE, DEFAULT_VIEWPORT,
};
pub use rendering::Renderer;
pub use session::{Sandbox, WALK_HINT_OFFSET_PX};
