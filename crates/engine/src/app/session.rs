use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::world::{
    find_path, Actor, Building, LayoutError, TileGrid, WorldLayout, AVATAR_SPEECH_SECONDS,
};

use super::camera::{CameraCommand, CameraPose, CameraState, Lens};
use super::chat::{ChatOutcome, ChatState, MessageKind};
use super::input::{InputEvent, KeyInput};
use super::movement::{MovementIntegrator, MovementStep};
use super::overlay::{build_minimap, build_speech_labels, FrameSnapshot};
use super::projection::{screen_to_ground, MapProjection, Viewport, DEFAULT_VIEWPORT};

/// Offset from the cursor at which the walk-here hint is drawn.
pub const WALK_HINT_OFFSET_PX: Vec2 = Vec2::new(10.0, -20.0);

/// Owned simulation context: the grid, the actors and every controller that mutates them.
///
/// One [`Sandbox::tick`] runs movement, then speech timers, then the chat caret. Input is
/// applied between ticks through [`Sandbox::handle_input`].
pub struct Sandbox {
    grid: TileGrid,
    buildings: Vec<Building>,
    spawn: Vec3,
    avatar: Actor,
    npcs: Vec<Actor>,
    movement: MovementIntegrator,
    camera: CameraState,
    lens: Lens,
    chat: ChatState,
    viewport: Viewport,
    walk_hint: Option<Vec2>,
    rng: StdRng,
    path_searches: u64,
}

impl Sandbox {
    /// Builds the world from `layout`. Without a seed the NPC chatter RNG draws from entropy.
    pub fn new(layout: &WorldLayout, seed: Option<u64>) -> Result<Self, LayoutError> {
        layout.validate()?;

        let mut grid = TileGrid::default();
        for building in &layout.buildings {
            grid.register_obstacle(&building.footprint);
        }

        let spawn = Vec3::from_array(layout.player_spawn);
        let npcs = layout
            .npcs
            .iter()
            .map(|spec| {
                Actor::npc(
                    &spec.name,
                    Vec3::from_array(spec.position),
                    &spec.speech,
                )
            })
            .collect::<Vec<_>>();

        let mut chat = ChatState::default();
        for greeting in &layout.greetings {
            chat.push_message(&greeting.speaker, &greeting.text, MessageKind::Npc);
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            buildings = layout.buildings.len(),
            npcs = npcs.len(),
            blocked_cells = grid.blocked_cell_count(),
            seeded = seed.is_some(),
            "world_built"
        );

        Ok(Self {
            grid,
            buildings: layout.buildings.clone(),
            spawn,
            avatar: Actor::avatar(&layout.player_name, spawn),
            npcs,
            movement: MovementIntegrator::default(),
            camera: CameraState::default(),
            lens: Lens::default(),
            chat,
            viewport: DEFAULT_VIEWPORT,
            walk_hint: None,
            rng,
            path_searches: 0,
        })
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn avatar(&self) -> &Actor {
        &self.avatar
    }

    pub fn npcs(&self) -> &[Actor] {
        &self.npcs
    }

    pub fn movement(&self) -> &MovementIntegrator {
        &self.movement
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn chat(&self) -> &ChatState {
        &self.chat
    }

    pub fn walk_hint(&self) -> Option<Vec2> {
        self.walk_hint
    }

    /// Total path searches issued since construction.
    pub fn path_search_count(&self) -> u64 {
        self.path_searches
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved { screen_px } => self.pointer_moved(screen_px),
            InputEvent::PointerClicked { screen_px } => self.pointer_clicked(screen_px),
            InputEvent::KeyPressed(key) => self.key_pressed(key),
        }
    }

    fn pick_ground(&self, screen_px: Vec2) -> Option<Vec3> {
        screen_to_ground(
            screen_px,
            &self.camera_pose(),
            &self.lens,
            self.viewport,
            self.grid.half_extent(),
        )
    }

    pub fn pointer_moved(&mut self, screen_px: Vec2) {
        self.walk_hint = self
            .pick_ground(screen_px)
            .map(|_| screen_px + WALK_HINT_OFFSET_PX);
    }

    pub fn pointer_clicked(&mut self, screen_px: Vec2) {
        self.walk_hint = None;
        let target = self.pick_ground(screen_px);
        self.click_ground(target);
    }

    /// Walks to the centre of the clicked cell. Returns the number of waypoints queued.
    ///
    /// The search result always replaces the queue, so an unreachable target stops the
    /// avatar. `None` (no ground under the cursor) issues no search.
    pub fn click_ground(&mut self, ground: Option<Vec3>) -> usize {
        let Some(ground) = ground else {
            return 0;
        };
        let cell = self.grid.world_to_grid(ground.x, ground.z);
        let target = self.grid.grid_to_world(cell);

        self.path_searches += 1;
        let path = find_path(&self.grid, self.avatar.position, target);
        let queued = path.len();
        self.movement.replace_path(path);
        if queued == 0 {
            debug!(target_cell = ?cell, "walk_stopped");
        } else {
            debug!(target_cell = ?cell, queued, "walk_started");
        }
        queued
    }

    /// Chat sees every key first; only keys it passes through reach the camera.
    pub fn key_pressed(&mut self, key: KeyInput) {
        match self.chat.handle_key(key, self.avatar.display_name()) {
            ChatOutcome::Sent(text) => self.avatar.say(text, AVATAR_SPEECH_SECONDS),
            ChatOutcome::Consumed => {}
            ChatOutcome::PassThrough => {
                if let Some(command) = CameraCommand::from_key(key) {
                    self.camera.apply(command);
                }
            }
        }
    }

    pub fn tick(&mut self, dt_seconds: f32) {
        if let MovementStep::ArrivedAtWaypoint { remaining: 0 } =
            self.movement.tick(&mut self.avatar.position, dt_seconds)
        {
            debug!(position = ?self.avatar.position, "walk_finished");
        }
        self.avatar.tick_speech(dt_seconds, &mut self.rng);
        for npc in &mut self.npcs {
            npc.tick_speech(dt_seconds, &mut self.rng);
        }
        self.chat.tick(dt_seconds);
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.camera.pose_for(self.avatar.position)
    }

    /// Read-only view of the current state for the renderer.
    pub fn frame(&self, map: &MapProjection) -> FrameSnapshot {
        let pose = self.camera_pose();
        let labels = build_speech_labels(
            std::iter::once(&self.avatar).chain(self.npcs.iter()),
            &pose,
            &self.lens,
            self.viewport,
        );
        let minimap = build_minimap(
            map,
            self.avatar.position,
            &self.buildings,
            &self.npcs,
            self.movement.waypoints(),
            self.spawn,
        );

        FrameSnapshot {
            viewport: self.viewport,
            avatar_position: self.avatar.position,
            camera: pose,
            lens: self.lens,
            labels,
            minimap,
            walk_hint: self.walk_hint,
            chat_messages: self.chat.recent_messages().to_vec(),
            composer_line: self.chat.composer_line(),
        }
    }
}
