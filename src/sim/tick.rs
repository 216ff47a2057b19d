//! Fixed timestep simulation tick
//!
//! One call per frame: steer the paddles, integrate motion, run the collision
//! pass, dispatch the impacts in detection order, then let the state settle
//! the round lifecycle.

use glam::Vec2;

use super::collision::{Aabb, CollisionResult, bounce, box_collision};
use super::state::{Ball, Brick, GameState, Heart, RoundPhase};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Left arrow held
    pub left: bool,
    /// Right arrow held
    pub right: bool,
    /// Debug win key
    pub force_win: bool,
    /// Let the autopilot drive the paddle (headless runs)
    pub autopilot: bool,
}

/// A contact found by the collision pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Impact {
    /// The primary ball touched anything
    PrimaryBall,
    /// A ball struck a brick at `at`
    Brick { id: u32, at: Vec2 },
    /// A ball struck the temporary paddle
    TemporaryPaddle,
    /// The main paddle caught a falling heart
    HeartCaught { id: u32 },
}

/// Everything a ball can bounce off this frame
struct Obstacles<'a> {
    walls: [Aabb; 3],
    paddle: Aabb,
    temporary_paddle: Option<Aabb>,
    bricks: &'a [Brick],
}

/// Advance the round by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> RoundPhase {
    if state.phase != RoundPhase::Playing {
        return state.phase;
    }

    let mut input = *input;
    if input.autopilot {
        steer_autopilot(state, &mut input);
    }

    state.time_ticks += 1;

    // Both paddles follow the arrow keys
    let width = state.settings.window_width;
    state.paddle.steer(input.left, input.right, dt, width);
    if let Some(temporary) = state.temporary_paddle.as_mut() {
        temporary.paddle.steer(input.left, input.right, dt, width);
    }

    state.ball.pos += state.ball.vel * dt;
    for ball in &mut state.secondary_balls {
        ball.pos += ball.vel * dt;
    }
    for heart in &mut state.falling_hearts {
        heart.pos += heart.vel * dt;
    }

    let impacts = detect_impacts(state);
    for impact in impacts {
        match impact {
            Impact::PrimaryBall => state.on_primary_ball_impact(),
            Impact::Brick { id, at } => {
                state.on_brick_impact(id, at);
            }
            Impact::TemporaryPaddle => state.on_temporary_paddle_impact(),
            Impact::HeartCaught { id } => {
                state.collect_heart(id);
            }
        }
    }

    state.update(input.force_win)
}

/// Collision pass: bounce balls and list the impacts in detection order
///
/// Ball velocities are resolved here; everything else is left to the
/// dispatch that follows.
pub fn detect_impacts(state: &mut GameState) -> Vec<Impact> {
    let mut impacts = Vec::new();

    let obstacles = Obstacles {
        walls: wall_bounds(state.settings.window_width, state.settings.window_height),
        paddle: state.paddle.bounds(),
        temporary_paddle: state.temporary_paddle.as_ref().map(|t| t.paddle.bounds()),
        bricks: &state.bricks,
    };

    collide_ball(&mut state.ball, &obstacles, &mut impacts);
    for ball in &mut state.secondary_balls {
        collide_ball(ball, &obstacles, &mut impacts);
    }

    let paddles = std::iter::once(&state.paddle)
        .chain(state.temporary_paddle.as_ref().map(|t| &t.paddle))
        .filter(|p| Heart::should_collide_with(p.tag));
    for paddle in paddles {
        let bounds = paddle.bounds();
        for heart in &state.falling_hearts {
            if heart.bounds().overlaps(&bounds) {
                impacts.push(Impact::HeartCaught { id: heart.id });
            }
        }
    }

    impacts
}

/// Bounce one ball off one obstacle, returning the contact point on a hit
///
/// The primary ball's impact is recorded before whatever it struck.
fn contact(ball: &mut Ball, obstacle: &Aabb, impacts: &mut Vec<Impact>) -> Option<Vec2> {
    let result = box_collision(&ball.bounds(), obstacle);
    if !result.hit {
        return None;
    }
    resolve_contact(ball, &result);
    if ball.is_primary() {
        impacts.push(Impact::PrimaryBall);
    }
    Some(result.point)
}

fn collide_ball(ball: &mut Ball, obstacles: &Obstacles<'_>, impacts: &mut Vec<Impact>) {
    for wall in &obstacles.walls {
        contact(ball, wall, impacts);
    }
    contact(ball, &obstacles.paddle, impacts);
    if let Some(temporary) = &obstacles.temporary_paddle {
        if contact(ball, temporary, impacts).is_some() {
            impacts.push(Impact::TemporaryPaddle);
        }
    }
    for brick in obstacles.bricks {
        if let Some(at) = contact(ball, &brick.bounds(), impacts) {
            impacts.push(Impact::Brick { id: brick.id, at });
        }
    }
}

/// Push the ball out of the obstacle and reflect it off the contact normal
pub fn resolve_contact(ball: &mut Ball, result: &CollisionResult) {
    ball.pos += result.normal * result.penetration;
    ball.vel = bounce(ball.vel, result.normal);
}

/// Left, right and top borders; the bottom is open
pub fn wall_bounds(width: f32, height: f32) -> [Aabb; 3] {
    let frame = BORDER_OUTSIDE_FRAME;
    let thickness = frame + BORDER_WIDTH;
    [
        Aabb::from_top_left(Vec2::new(-frame, -frame), Vec2::new(thickness, height + 2.0 * frame)),
        Aabb::from_top_left(
            Vec2::new(width - BORDER_WIDTH, -frame),
            Vec2::new(thickness, height + 2.0 * frame),
        ),
        Aabb::from_top_left(Vec2::new(-frame, -frame), Vec2::new(width + 2.0 * frame, thickness)),
    ]
}

/// Drive the arrow keys toward whatever needs catching
///
/// A descending primary ball comes first, then the lowest falling heart.
/// With nothing to catch the paddle drifts under the ball.
fn steer_autopilot(state: &GameState, input: &mut TickInput) {
    let target = if state.ball.vel.y > 0.0 {
        state.ball.pos.x
    } else {
        state
            .falling_hearts
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|h| h.center().x)
            .unwrap_or(state.ball.pos.x)
    };

    let center = state.paddle.center().x;
    let deadzone = state.paddle.size.x * 0.25;
    input.left = target < center - deadzone;
    input.right = target > center + deadzone;
}
