use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};
use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::chat::{ChatMode, MessageKind};
use crate::app::projection::view_projection;
use crate::app::{ColorRole, FrameSnapshot, LoopMetricsSnapshot, MinimapFrame, Sandbox, Viewport};
use crate::world::{ActorKind, BuildingKind, TileGrid};

use super::font::{draw_text, glyph_advance, line_advance, text_width};
use super::raster::{Canvas, Rgba};

const SKY_COLOR: Rgba = [135, 206, 235, 255];
const GROUND_LINE_COLOR: Rgba = [139, 115, 85, 255];
const BLOCKED_CELL_COLOR: Rgba = [93, 64, 55, 255];
const HOUSE_COLOR: Rgba = [139, 69, 19, 255];
const STALL_COLOR: Rgba = [210, 105, 30, 255];
const AVATAR_COLOR: Rgba = [0, 255, 255, 255];
const NPC_COLOR: Rgba = [255, 230, 0, 255];
const WALK_PATH_COLOR: Rgba = [0, 255, 0, 255];
const TEXT_COLOR: Rgba = [255, 255, 255, 255];
const TEXT_DIM_COLOR: Rgba = [190, 190, 190, 255];
const PLATE_COLOR: Rgba = [0, 0, 0, 255];
const CHAT_PANEL_COLOR: Rgba = [20, 20, 20, 255];
const MAP_BACKGROUND_COLOR: Rgba = [47, 79, 47, 255];
const MAP_GRID_COLOR: Rgba = [58, 95, 58, 255];
const MAP_ROAD_COLOR: Rgba = [210, 180, 140, 255];
const MAP_OUTLINE_COLOR: Rgba = [0, 0, 0, 255];

const TEXT_SCALE: i32 = 2;
const PANEL_MARGIN: i32 = 10;
const PANEL_PADDING: i32 = 6;
const CHAT_PANEL_WIDTH: i32 = 460;
const MAP_GRID_SPACING: i32 = 10;
const ACTOR_BODY_HEIGHT: f32 = 1.6;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render(
        &mut self,
        sandbox: &Sandbox,
        frame: &FrameSnapshot,
        metrics: LoopMetricsSnapshot,
    ) -> Result<(), Error> {
        let Viewport { width, height } = self.viewport;
        let mut canvas = Canvas::new(self.pixels.frame_mut(), width, height);
        draw_scene(&mut canvas, sandbox, frame, metrics);
        self.pixels.render()
    }
}

/// Paints one whole frame: world wireframe, speech labels, chat box, walk hint, minimap, FPS.
pub(crate) fn draw_scene(
    canvas: &mut Canvas<'_>,
    sandbox: &Sandbox,
    frame: &FrameSnapshot,
    metrics: LoopMetricsSnapshot,
) {
    canvas.clear(SKY_COLOR);
    let projector = WorldProjector::new(frame);

    draw_ground(canvas, &projector, sandbox.grid());
    for building in sandbox.buildings() {
        let color = match building.kind {
            BuildingKind::House => HOUSE_COLOR,
            BuildingKind::MarketStall => STALL_COLOR,
        };
        let footprint = building.footprint;
        draw_box(
            canvas,
            &projector,
            Vec3::new(footprint.origin_x, 0.0, footprint.origin_z),
            Vec3::new(
                footprint.origin_x + footprint.width,
                building.kind.height(),
                footprint.origin_z + footprint.depth,
            ),
            color,
        );
    }

    let mut previous = frame.avatar_position;
    for waypoint in sandbox.movement().waypoints() {
        projector.segment(canvas, previous, *waypoint, WALK_PATH_COLOR);
        previous = *waypoint;
    }

    for actor in sandbox.npcs().iter().chain(std::iter::once(sandbox.avatar())) {
        let color = match actor.kind() {
            ActorKind::Avatar => AVATAR_COLOR,
            ActorKind::Npc => NPC_COLOR,
        };
        let head = actor.position + Vec3::new(0.0, ACTOR_BODY_HEIGHT, 0.0);
        projector.segment(canvas, actor.position, head, color);
        if let Some(point) = projector.point(head) {
            canvas.disc(point, 4, color);
        }
    }

    for label in &frame.labels {
        let color = match label.color_role {
            ColorRole::Avatar => AVATAR_COLOR,
            ColorRole::Npc => NPC_COLOR,
        };
        let text_w = text_width(&label.text, TEXT_SCALE);
        let x = label.x.round() as i32 - text_w / 2;
        let y = label.y.round() as i32 - line_advance(TEXT_SCALE);
        draw_plated_text(canvas, x, y, &label.text, color);
    }

    if let Some(hint) = frame.walk_hint {
        draw_plated_text(
            canvas,
            hint.x.round() as i32,
            hint.y.round() as i32,
            "Walk here",
            TEXT_COLOR,
        );
    }

    draw_chat_box(canvas, frame, sandbox.chat().mode());
    draw_minimap(canvas, &frame.minimap);

    let fps_line = format!("FPS {:.0}  TPS {:.0}", metrics.fps, metrics.tps);
    draw_plated_text(canvas, PANEL_MARGIN, PANEL_MARGIN, &fps_line, TEXT_COLOR);
}

/// Clip-space projector for wireframe segments. Segments are cut at the near plane so
/// geometry behind the camera never wraps onto the screen.
struct WorldProjector {
    view_projection: Mat4,
    viewport: Viewport,
    near: f32,
}

impl WorldProjector {
    fn new(frame: &FrameSnapshot) -> Self {
        Self {
            view_projection: view_projection(&frame.camera, &frame.lens, frame.viewport),
            viewport: frame.viewport,
            near: frame.lens.near,
        }
    }

    fn to_screen(&self, clip: Vec4) -> Vec2 {
        let ndc = clip.truncate() / clip.w;
        Vec2::new(
            (ndc.x * 0.5 + 0.5) * self.viewport.width as f32,
            (ndc.y * -0.5 + 0.5) * self.viewport.height as f32,
        )
    }

    fn point(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_projection * world.extend(1.0);
        (clip.w >= self.near).then(|| self.to_screen(clip))
    }

    fn segment(&self, canvas: &mut Canvas<'_>, from: Vec3, to: Vec3, color: Rgba) {
        let mut a = self.view_projection * from.extend(1.0);
        let mut b = self.view_projection * to.extend(1.0);
        if a.w < self.near && b.w < self.near {
            return;
        }
        if a.w < self.near {
            a = a.lerp(b, (self.near - a.w) / (b.w - a.w));
        } else if b.w < self.near {
            b = b.lerp(a, (self.near - b.w) / (a.w - b.w));
        }
        canvas.line(self.to_screen(a), self.to_screen(b), color);
    }
}

fn draw_ground(canvas: &mut Canvas<'_>, projector: &WorldProjector, grid: &TileGrid) {
    let half = grid.half_extent();
    let tile = grid.tile_size();
    for index in 0..=grid.size() {
        let offset = -half + index as f32 * tile;
        projector.segment(
            canvas,
            Vec3::new(offset, 0.0, -half),
            Vec3::new(offset, 0.0, half),
            GROUND_LINE_COLOR,
        );
        projector.segment(
            canvas,
            Vec3::new(-half, 0.0, offset),
            Vec3::new(half, 0.0, offset),
            GROUND_LINE_COLOR,
        );
    }

    let quarter = tile / 4.0;
    for index in 0..grid.cell_count() {
        let Some(coord) = grid.coord_of(index) else {
            continue;
        };
        if grid.is_walkable(coord) {
            continue;
        }
        let center = grid.grid_to_world(coord);
        projector.segment(
            canvas,
            center + Vec3::new(-quarter, 0.0, -quarter),
            center + Vec3::new(quarter, 0.0, quarter),
            BLOCKED_CELL_COLOR,
        );
        projector.segment(
            canvas,
            center + Vec3::new(-quarter, 0.0, quarter),
            center + Vec3::new(quarter, 0.0, -quarter),
            BLOCKED_CELL_COLOR,
        );
    }
}

fn draw_box(
    canvas: &mut Canvas<'_>,
    projector: &WorldProjector,
    min: Vec3,
    max: Vec3,
    color: Rgba,
) {
    let corner = |x: bool, y: bool, z: bool| {
        Vec3::new(
            if x { max.x } else { min.x },
            if y { max.y } else { min.y },
            if z { max.z } else { min.z },
        )
    };
    for y in [false, true] {
        projector.segment(canvas, corner(false, y, false), corner(true, y, false), color);
        projector.segment(canvas, corner(true, y, false), corner(true, y, true), color);
        projector.segment(canvas, corner(true, y, true), corner(false, y, true), color);
        projector.segment(canvas, corner(false, y, true), corner(false, y, false), color);
    }
    for (x, z) in [(false, false), (true, false), (true, true), (false, true)] {
        projector.segment(canvas, corner(x, false, z), corner(x, true, z), color);
    }
}

fn draw_plated_text(canvas: &mut Canvas<'_>, x: i32, y: i32, text: &str, color: Rgba) {
    let text_w = text_width(text, TEXT_SCALE);
    canvas.fill_rect(
        x - 2,
        y - 2,
        text_w + 4,
        line_advance(TEXT_SCALE),
        PLATE_COLOR,
    );
    draw_text(canvas, x, y, text, TEXT_SCALE, color);
}

fn draw_chat_box(canvas: &mut Canvas<'_>, frame: &FrameSnapshot, chat_mode: ChatMode) {
    let line_height = line_advance(TEXT_SCALE);
    let rows = frame.chat_messages.len() as i32 + 1;
    let panel_height = rows * line_height + PANEL_PADDING * 2;
    let panel_y = canvas.height() as i32 - panel_height - PANEL_MARGIN;
    canvas.set_panel(PANEL_MARGIN, panel_y, CHAT_PANEL_WIDTH, panel_height);
    canvas.fill_rect(0, 0, CHAT_PANEL_WIDTH, panel_height, CHAT_PANEL_COLOR);

    let mut y = PANEL_PADDING;
    for message in &frame.chat_messages {
        let name_color = match message.kind {
            MessageKind::Player => AVATAR_COLOR,
            MessageKind::Npc => NPC_COLOR,
        };
        let name = format!("{}:", message.speaker);
        draw_text(canvas, PANEL_PADDING, y, &name, TEXT_SCALE, name_color);
        let text_x = PANEL_PADDING + text_width(&name, TEXT_SCALE) + glyph_advance(TEXT_SCALE);
        draw_text(canvas, text_x, y, &message.text, TEXT_SCALE, TEXT_COLOR);
        y += line_height;
    }

    let composer_color = match chat_mode {
        ChatMode::Composing => TEXT_COLOR,
        ChatMode::Idle => TEXT_DIM_COLOR,
    };
    draw_text(
        canvas,
        PANEL_PADDING,
        y,
        &frame.composer_line,
        TEXT_SCALE,
        composer_color,
    );
    canvas.reset_panel();
}

fn draw_minimap(canvas: &mut Canvas<'_>, minimap: &MinimapFrame) {
    let width = minimap.width.round() as i32;
    let height = minimap.height.round() as i32;
    if width <= 0 || height <= 0 {
        return;
    }
    let left = canvas.width() as i32 - width - PANEL_MARGIN;
    canvas.set_panel(left, PANEL_MARGIN, width, height);
    canvas.fill_rect(0, 0, width, height, MAP_BACKGROUND_COLOR);

    let mut x = 0;
    while x < width {
        canvas.fill_rect(x, 0, 1, height, MAP_GRID_COLOR);
        x += MAP_GRID_SPACING;
    }
    let mut y = 0;
    while y < height {
        canvas.fill_rect(0, y, width, 1, MAP_GRID_COLOR);
        y += MAP_GRID_SPACING;
    }

    for marker in &minimap.building_markers {
        canvas.fill_rect(
            (marker.center.x - marker.width / 2.0).round() as i32,
            (marker.center.y - marker.height / 2.0).round() as i32,
            marker.width.round() as i32,
            marker.height.round() as i32,
            HOUSE_COLOR,
        );
    }

    for [from, to] in &minimap.road_polylines {
        canvas.line(*from, *to, MAP_ROAD_COLOR);
        canvas.line(*from + Vec2::X, *to + Vec2::X, MAP_ROAD_COLOR);
    }

    for npc in &minimap.npc_markers {
        canvas.disc(*npc, 4, MAP_OUTLINE_COLOR);
        canvas.disc(*npc, 3, NPC_COLOR);
    }
    canvas.disc(minimap.avatar_marker, 5, MAP_OUTLINE_COLOR);
    canvas.disc(minimap.avatar_marker, 4, AVATAR_COLOR);

    for pair in minimap.path_polyline.windows(2) {
        canvas.dashed_line(pair[0], pair[1], 2, WALK_PATH_COLOR);
    }

    canvas.rect_outline(0, 0, width, height, 2, HOUSE_COLOR);
    let title = "Map";
    draw_text(
        canvas,
        (width - text_width(title, 1)) / 2,
        4,
        title,
        1,
        TEXT_COLOR,
    );
    canvas.reset_panel();
}
