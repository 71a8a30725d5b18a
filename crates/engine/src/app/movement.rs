use std::collections::VecDeque;

use glam::{Vec2, Vec3};

use crate::PLAYER_SPEED;

/// Horizontal distance at which a waypoint counts as reached.
pub const ARRIVAL_THRESHOLD: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementState {
    Idle,
    Following,
}

/// What one tick did to the mover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementStep {
    Idle,
    Moved { delta: Vec3 },
    ArrivedAtWaypoint { remaining: usize },
}

/// Walks a position along a queue of world-space waypoints on the ground plane.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementIntegrator {
    waypoints: VecDeque<Vec3>,
    speed: f32,
}

impl Default for MovementIntegrator {
    fn default() -> Self {
        Self::new(PLAYER_SPEED)
    }
}

impl MovementIntegrator {
    pub fn new(speed: f32) -> Self {
        Self {
            waypoints: VecDeque::new(),
            speed,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn state(&self) -> MovementState {
        if self.waypoints.is_empty() {
            MovementState::Idle
        } else {
            MovementState::Following
        }
    }

    /// Drops whatever is left of the previous path.
    pub fn replace_path(&mut self, path: Vec<Vec3>) {
        self.waypoints = path.into();
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
    }

    pub fn waypoints(&self) -> impl ExactSizeIterator<Item = &Vec3> + '_ {
        self.waypoints.iter()
    }

    pub fn front(&self) -> Option<Vec3> {
        self.waypoints.front().copied()
    }

    /// Either pops the front waypoint (when within [`ARRIVAL_THRESHOLD`]) or moves
    /// `position` toward it by `speed * dt_seconds`. Never both in the same tick.
    ///
    /// The vertical axis is ignored and left untouched.
    pub fn tick(&mut self, position: &mut Vec3, dt_seconds: f32) -> MovementStep {
        let Some(target) = self.waypoints.front().copied() else {
            return MovementStep::Idle;
        };

        let to_target = Vec2::new(target.x - position.x, target.z - position.z);
        if to_target.length() < ARRIVAL_THRESHOLD {
            self.waypoints.pop_front();
            return MovementStep::ArrivedAtWaypoint {
                remaining: self.waypoints.len(),
            };
        }

        let step = to_target.normalize_or_zero() * self.speed * dt_seconds;
        let delta = Vec3::new(step.x, 0.0, step.y);
        *position += delta;
        MovementStep::Moved { delta }
    }
}
