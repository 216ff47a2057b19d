//! Box overlap detection and velocity reflection
//!
//! Minimal stand-in for the engine's collision layer: every entity is an
//! axis-aligned box, contacts resolve along the axis of least penetration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_top_left(top_left: Vec2, size: Vec2) -> Self {
        Self {
            min: top_left,
            max: top_left + size,
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::from_top_left(center - size * 0.5, size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the obstacle (if hit)
    pub point: Vec2,
    /// Surface normal pointing from the obstacle toward the mover
    pub normal: Vec2,
    /// Penetration depth along the normal
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a moving box against an obstacle
pub fn box_collision(mover: &Aabb, obstacle: &Aabb) -> CollisionResult {
    if !mover.overlaps(obstacle) {
        return CollisionResult::miss();
    }

    let overlap_x = mover.max.x.min(obstacle.max.x) - mover.min.x.max(obstacle.min.x);
    let overlap_y = mover.max.y.min(obstacle.max.y) - mover.min.y.max(obstacle.min.y);
    let delta = mover.center() - obstacle.center();

    let (normal, penetration) = if overlap_x < overlap_y {
        (Vec2::new(delta.x.signum(), 0.0), overlap_x)
    } else {
        (Vec2::new(0.0, delta.y.signum()), overlap_y)
    };

    CollisionResult {
        hit: true,
        point: mover.center().clamp(obstacle.min, obstacle.max),
        normal,
        penetration,
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Reflect only when moving into the surface
///
/// Keeps a ball that touches two bricks on the same face from flipping twice.
#[inline]
pub fn bounce(velocity: Vec2, normal: Vec2) -> Vec2 {
    if velocity.dot(normal) < 0.0 {
        reflect_velocity(velocity, normal)
    } else {
        velocity
    }
}
