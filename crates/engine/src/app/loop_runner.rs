use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use glam::Vec2;
use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::NOMINAL_TICK_SECONDS;

use super::input::{InputEvent, KeyInput};
use super::metrics::MetricsAccumulator;
use super::projection::{MapProjection, DEFAULT_MAP_SCALE, DEFAULT_VIEWPORT};
use super::{MetricsHandle, Renderer, Sandbox};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
    pub minimap_size: (u32, u32),
    /// Delta handed to every simulation tick, independent of the pacing rate.
    pub sim_dt_seconds: f32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Lands of Sand".to_string(),
            window_width: DEFAULT_VIEWPORT.width,
            window_height: DEFAULT_VIEWPORT.height,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: None,
            minimap_size: (150, 150),
            sim_dt_seconds: NOMINAL_TICK_SECONDS,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, sandbox: Sandbox) -> Result<(), AppError> {
    let metrics_handle = MetricsHandle::default();
    run_app_with_metrics(config, sandbox, metrics_handle)
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    mut sandbox: Sandbox,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;
    sandbox.set_viewport(renderer.viewport());

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let sim_dt_seconds = normalize_sim_dt(config.sim_dt_seconds);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let map_projection = MapProjection::new(
        config.minimap_size.0 as f32,
        config.minimap_size.1 as f32,
    );

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        sim_dt_seconds,
        minimap_width = config.minimap_size.0,
        minimap_height = config.minimap_size.1,
        minimap_scale = DEFAULT_MAP_SCALE,
        render_fps_cap = %format_render_cap(effective_render_cap),
        "loop_config"
    );

    let mut input_collector = InputCollector::default();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut recorded_path_searches = sandbox.path_search_count();
    let window_for_loop = window;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                        sandbox.set_viewport(renderer.viewport());
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                        sandbox.set_viewport(renderer.viewport());
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        input_collector
                            .set_cursor_position_px(position.x as f32, position.y as f32);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        input_collector.clear_cursor_position();
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        input_collector.handle_mouse_input(button, state);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_key(&event.logical_key, event.state);
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;

                        let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                        accumulator = accumulator.saturating_add(clamped_frame_dt);

                        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                        for _ in 0..step_plan.ticks_to_run {
                            for input in input_collector.drain_for_tick() {
                                sandbox.handle_input(input);
                            }
                            sandbox.tick(sim_dt_seconds);
                            metrics_accumulator.record_tick();
                        }
                        accumulator = step_plan.remaining_accumulator;

                        let path_searches = sandbox.path_search_count();
                        metrics_accumulator.record_path_searches(
                            path_searches.saturating_sub(recorded_path_searches),
                        );
                        recorded_path_searches = path_searches;

                        if step_plan.dropped_backlog > Duration::ZERO {
                            warn!(
                                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                                max_ticks_per_frame, "sim_clamp_triggered"
                            );
                        }

                        let elapsed_since_last_present =
                            Instant::now().saturating_duration_since(last_present_instant);
                        let cap_sleep =
                            compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                        if cap_sleep > Duration::ZERO {
                            thread::sleep(cap_sleep);
                        }

                        let frame = sandbox.frame(&map_projection);
                        if let Err(error) =
                            renderer.render(&sandbox, &frame, metrics_handle.snapshot())
                        {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }
                        last_present_instant = Instant::now();
                        metrics_accumulator.record_frame(raw_frame_dt);

                        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                            metrics_handle.publish(snapshot);
                            let avatar = sandbox.avatar().position;
                            info!(
                                fps = snapshot.fps,
                                tps = snapshot.tps,
                                frame_time_ms = snapshot.frame_time_ms,
                                path_searches_per_second = snapshot.path_searches_per_second,
                                waypoints = sandbox.movement().waypoints().len(),
                                avatar_x = avatar.x,
                                avatar_z = avatar.z,
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                info!(
                    chat_messages = sandbox.chat().log().len(),
                    path_searches = sandbox.path_search_count(),
                    "shutdown"
                );
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Buffers window input until the next simulation tick drains it.
///
/// Consecutive cursor moves collapse into one event so a fast mouse does not flood the queue.
#[derive(Debug, Default)]
struct InputCollector {
    pending: Vec<InputEvent>,
    cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
}

impl InputCollector {
    fn handle_key(&mut self, key: &Key, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }
        if let Some(input) = key_input_from_logical(key) {
            self.pending.push(InputEvent::KeyPressed(input));
        }
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        let screen_px = Vec2::new(x, y);
        self.cursor_position_px = Some(screen_px);
        match self.pending.last_mut() {
            Some(InputEvent::PointerMoved { screen_px: last }) => *last = screen_px,
            _ => self.pending.push(InputEvent::PointerMoved { screen_px }),
        }
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down {
                    if let Some(screen_px) = self.cursor_position_px {
                        self.pending.push(InputEvent::PointerClicked { screen_px });
                    }
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => self.left_mouse_is_down = false,
        }
    }

    fn drain_for_tick(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }
}

fn key_input_from_logical(key: &Key) -> Option<KeyInput> {
    match key {
        Key::Named(NamedKey::Enter) => Some(KeyInput::Enter),
        Key::Named(NamedKey::Escape) => Some(KeyInput::Escape),
        Key::Named(NamedKey::Backspace) => Some(KeyInput::Backspace),
        Key::Named(NamedKey::ArrowLeft) => Some(KeyInput::ArrowLeft),
        Key::Named(NamedKey::ArrowRight) => Some(KeyInput::ArrowRight),
        Key::Named(NamedKey::ArrowUp) => Some(KeyInput::ArrowUp),
        Key::Named(NamedKey::ArrowDown) => Some(KeyInput::ArrowDown),
        Key::Named(NamedKey::Space) => Some(KeyInput::Char(' ')),
        Key::Character(text) => match KeyInput::from_text(text.as_str()) {
            KeyInput::Other => None,
            input => Some(input),
        },
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_sim_dt(seconds: f32) -> f32 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        NOMINAL_TICK_SECONDS
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_the_town_window() {
        let config = LoopConfig::default();
        assert_eq!(config.window_title, "Lands of Sand");
        assert_eq!((config.window_width, config.window_height), (1280, 720));
        assert_eq!(
            (config.window_width, config.window_height),
            (DEFAULT_VIEWPORT.width, DEFAULT_VIEWPORT.height)
        );
        assert_eq!(config.minimap_size, (150, 150));
        assert_eq!(config.sim_dt_seconds, NOMINAL_TICK_SECONDS);
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn plan_sim_steps_keeps_partial_tick() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(20), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 1);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(4));
    }

    #[test]
    fn invalid_sim_dt_falls_back_to_nominal_tick() {
        assert_eq!(normalize_sim_dt(0.0), NOMINAL_TICK_SECONDS);
        assert_eq!(normalize_sim_dt(-1.0), NOMINAL_TICK_SECONDS);
        assert_eq!(normalize_sim_dt(f32::NAN), NOMINAL_TICK_SECONDS);
        assert_eq!(normalize_sim_dt(0.02), 0.02);
    }

    #[test]
    fn named_keys_map_to_sandbox_keys() {
        assert_eq!(
            key_input_from_logical(&Key::Named(NamedKey::Enter)),
            Some(KeyInput::Enter)
        );
        assert_eq!(
            key_input_from_logical(&Key::Named(NamedKey::ArrowLeft)),
            Some(KeyInput::ArrowLeft)
        );
        assert_eq!(
            key_input_from_logical(&Key::Named(NamedKey::Space)),
            Some(KeyInput::Char(' '))
        );
        assert_eq!(key_input_from_logical(&Key::Named(NamedKey::F3)), None);
    }

    #[test]
    fn character_keys_map_to_chars() {
        assert_eq!(
            key_input_from_logical(&Key::Character("q".into())),
            Some(KeyInput::Char('q'))
        );
        assert_eq!(key_input_from_logical(&Key::Character("ab".into())), None);
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut input = InputCollector::default();
        input.handle_key(&Key::Named(NamedKey::Enter), ElementState::Released);
        assert!(input.drain_for_tick().is_empty());

        input.handle_key(&Key::Named(NamedKey::Enter), ElementState::Pressed);
        assert_eq!(
            input.drain_for_tick(),
            vec![InputEvent::KeyPressed(KeyInput::Enter)]
        );
    }

    #[test]
    fn queued_events_are_drained_once() {
        let mut input = InputCollector::default();
        input.handle_key(&Key::Character("h".into()), ElementState::Pressed);
        input.handle_key(&Key::Character("i".into()), ElementState::Pressed);

        let first = input.drain_for_tick();
        let second = input.drain_for_tick();

        assert_eq!(
            first,
            vec![
                InputEvent::KeyPressed(KeyInput::Char('h')),
                InputEvent::KeyPressed(KeyInput::Char('i')),
            ]
        );
        assert!(second.is_empty());
    }

    #[test]
    fn consecutive_cursor_moves_collapse() {
        let mut input = InputCollector::default();
        input.set_cursor_position_px(1.0, 2.0);
        input.set_cursor_position_px(3.0, 4.0);
        input.handle_key(&Key::Character("x".into()), ElementState::Pressed);
        input.set_cursor_position_px(5.0, 6.0);

        assert_eq!(
            input.drain_for_tick(),
            vec![
                InputEvent::PointerMoved {
                    screen_px: Vec2::new(3.0, 4.0)
                },
                InputEvent::KeyPressed(KeyInput::Char('x')),
                InputEvent::PointerMoved {
                    screen_px: Vec2::new(5.0, 6.0)
                },
            ]
        );
    }

    #[test]
    fn left_click_is_edge_triggered_at_the_cursor() {
        let mut input = InputCollector::default();
        input.set_cursor_position_px(100.0, 200.0);
        input.drain_for_tick();

        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let first = input.drain_for_tick();
        input.handle_mouse_input(MouseButton::Left, ElementState::Released);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let second = input.drain_for_tick();

        let click = InputEvent::PointerClicked {
            screen_px: Vec2::new(100.0, 200.0),
        };
        assert_eq!(first, vec![click]);
        assert_eq!(second, vec![click]);
    }

    #[test]
    fn clicks_without_a_cursor_or_from_other_buttons_are_dropped() {
        let mut input = InputCollector::default();
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_mouse_input(MouseButton::Left, ElementState::Released);
        input.set_cursor_position_px(1.0, 1.0);
        input.clear_cursor_position();
        input.drain_for_tick();

        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        assert!(input.drain_for_tick().is_empty());
    }

    #[test]
    fn target_frame_duration_none_when_cap_off() {
        assert_eq!(target_frame_duration(None), None);
    }

    #[test]
    fn target_frame_duration_for_60hz_is_expected() {
        let duration = target_frame_duration(Some(60)).expect("duration");
        assert!((duration.as_secs_f64() - (1.0 / 60.0)).abs() < 0.000_001);
    }

    #[test]
    fn compute_cap_sleep_zero_when_over_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(20), target_frame_duration(Some(60)));
        assert_eq!(sleep, Duration::ZERO);
    }

    #[test]
    fn compute_cap_sleep_positive_when_under_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(5), target_frame_duration(Some(60)));
        assert!(sleep > Duration::ZERO);
    }

    #[test]
    fn normalize_render_fps_cap_disables_zero() {
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
        assert_eq!(normalize_render_fps_cap(Some(60)), Some(60));
        assert_eq!(format_render_cap(None), "off");
    }
}
