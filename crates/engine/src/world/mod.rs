mod actor;
mod grid;
mod layout;
mod nav;

pub use actor::{
    Actor, ActorKind, AVATAR_LABEL_LIFT, AVATAR_SPEECH_SECONDS, NPC_BUBBLE_VISIBLE_ABOVE_SECONDS,
    NPC_CHATTER_MAX_SECONDS, NPC_CHATTER_MIN_SECONDS, NPC_LABEL_LIFT,
};
pub use grid::{Footprint, GridCell, GridCoord, TileGrid};
pub use layout::{Building, BuildingKind, Greeting, LayoutError, NpcSpec, WorldLayout};
pub use nav::{find_cell_path, find_path};
