//! Avatar steering — acceleration, speed cap, friction, heading, lean.
//!
//! Update order per tick:
//! 1. Normalize the input axis (diagonal input must not be faster)
//! 2. Accelerate along it
//! 3. Hard-clamp speed to the (possibly sprinting) cap
//! 4. With the axis idle, decay residual velocity by an exponential,
//!    framerate-independent retention; the drift-prone kind widens the
//!    retention while its velocity disagrees with its facing
//! 5. Integrate position
//! 6. Track a target heading from velocity, rate-limit the rendered
//!    heading toward it, and smooth a cosmetic lean from the gap
//!
//! All math is plain f32 on plain structs; the world is not consulted
//! here (collision is the engine's job).

use serde::{Deserialize, Serialize};

use crate::constants::{HEADING_SPEED_THRESHOLD, INPUT_EPSILON_SQ};

/// Lean target per radian of heading error, before clamping.
const LEAN_GAIN: f32 = 0.6;

/// Cosmetic lean never exceeds this many radians either way.
const LEAN_MAX: f32 = 0.35;

/// Per-tick blend coefficient moving lean toward its target.
const LEAN_BLEND: f32 = 0.18;

/// Gait cycles per second while standing still.
const GAIT_BASE_CADENCE: f32 = 1.2;

/// Extra gait cycles per second per unit of speed.
const GAIT_SPEED_CADENCE: f32 = 0.01;

/// Retention gain applied per radian of velocity/facing disagreement
/// for drift-prone kinds.
const DRIFT_RETENTION_GAIN: f32 = 0.06;

/// Drift can raise retention toward 1 but never reach it, so residual
/// velocity still converges to zero.
const MAX_RETENTION: f32 = 0.995;

// ── Angles ──────────────────────────────────────────────────────────────

/// Normalize an angle into `(-PI, PI]`.
pub fn normalize_angle(a: f32) -> f32 {
    let mut r = a.rem_euclid(std::f32::consts::TAU);
    if r > std::f32::consts::PI {
        r -= std::f32::consts::TAU;
    }
    r
}

/// Shortest signed rotation from `from` to `to`, in `(-PI, PI]`.
pub fn angle_diff(to: f32, from: f32) -> f32 {
    normalize_angle(to - from)
}

// ── Kinds and profiles ──────────────────────────────────────────────────

/// Avatar movement kind. Closed set: every switch site matches
/// exhaustively, so adding a kind is a compile-time, single-point
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvatarKind {
    /// Slow, grippy walker. High drag, quick to stop and turn.
    Strider,
    /// Fast feline runner. Low drag, long coasts.
    Jaguar,
    /// Drift-prone glider. Keeps its old line through sharp turns.
    Hoverboard,
}

impl AvatarKind {
    /// Immutable tuning record for this kind.
    pub fn profile(self) -> MovementProfile {
        match self {
            Self::Strider => MovementProfile {
                max_speed: 150.0,
                acceleration: 900.0,
                friction: 0.78,
                turn_rate: 9.0,
                size: 14.0,
                sprint_multiplier: 1.5,
                drift_factor: 0.0,
            },
            Self::Jaguar => MovementProfile {
                max_speed: 280.0,
                acceleration: 1400.0,
                friction: 0.88,
                turn_rate: 6.5,
                size: 12.0,
                sprint_multiplier: 1.4,
                drift_factor: 0.0,
            },
            Self::Hoverboard => MovementProfile {
                max_speed: 330.0,
                acceleration: 1000.0,
                friction: 0.95,
                turn_rate: 4.0,
                size: 16.0,
                sprint_multiplier: 1.2,
                drift_factor: 1.0,
            },
        }
    }

    /// Next kind in the avatar-switch cycle.
    pub fn cycled(self) -> Self {
        match self {
            Self::Strider => Self::Jaguar,
            Self::Jaguar => Self::Hoverboard,
            Self::Hoverboard => Self::Strider,
        }
    }
}

/// Per-kind movement tuning. All fields strictly positive;
/// `friction` is a per-tick retention factor in (0,1), not a
/// subtractive drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementProfile {
    /// Speed cap without sprint, units/s.
    pub max_speed: f32,
    /// Input acceleration, units/s².
    pub acceleration: f32,
    /// Velocity retained per 1/60 s tick with the axis idle.
    pub friction: f32,
    /// Max rendered-heading change, radians/s.
    pub turn_rate: f32,
    /// Body radius for rendering and collision padding, units.
    pub size: f32,
    /// Speed cap multiplier while sprint is held.
    pub sprint_multiplier: f32,
    /// Oversteer strength for drift-prone kinds; 0 disables drift.
    pub drift_factor: f32,
}

// ── Body ────────────────────────────────────────────────────────────────

/// Pose and motion state of one avatar. Mutated only by [`SteeringBody::update`]
/// (and by the engine's collision resolve).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringBody {
    pub kind: AvatarKind,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Rendered facing, radians in (-PI, PI]. Rate-limited.
    pub heading: f32,
    /// Heading the body is turning toward. Held below the speed
    /// threshold so stopping doesn't jitter the facing.
    pub target_heading: f32,
    /// Cosmetic banking offset added to `heading` by the renderer only.
    pub lean: f32,
    /// Stride animation phase in [0,1), advanced with speed.
    pub gait_phase: f32,
}

impl SteeringBody {
    pub fn new(kind: AvatarKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            heading: 0.0,
            target_heading: 0.0,
            lean: 0.0,
            gait_phase: 0.0,
        }
    }

    /// Current speed, units/s.
    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    /// Swap the movement kind in place. Position, velocity, and
    /// heading carry over untouched; only the tuning changes.
    pub fn set_kind(&mut self, kind: AvatarKind) {
        self.kind = kind;
    }

    /// Advance one tick. `axis` components are -1/0/1 from a keyboard
    /// or an already-normalized stick vector; `dt` is seconds.
    pub fn update(&mut self, dt: f32, axis: (f32, f32), sprint_held: bool) {
        let profile = self.kind.profile();
        self.step_with(&profile, dt, axis, sprint_held);
    }

    fn step_with(&mut self, profile: &MovementProfile, dt: f32, axis: (f32, f32), sprint_held: bool) {
        // 1+2. Normalize and accelerate. The epsilon guard doubles as
        // the "no directional input" test.
        let (raw_x, raw_y) = axis;
        let len_sq = raw_x * raw_x + raw_y * raw_y;
        let has_input = len_sq > INPUT_EPSILON_SQ;
        if has_input {
            let inv = len_sq.sqrt().recip();
            self.vx += raw_x * inv * profile.acceleration * dt;
            self.vy += raw_y * inv * profile.acceleration * dt;
        }

        // 3. Hard clamp after acceleration, every tick.
        let cap = if sprint_held {
            profile.max_speed * profile.sprint_multiplier
        } else {
            profile.max_speed
        };
        let speed_sq = self.vx * self.vx + self.vy * self.vy;
        if speed_sq > cap * cap {
            let scale = cap / speed_sq.sqrt();
            self.vx *= scale;
            self.vy *= scale;
        }

        // 4. Idle retention. Multiplicative, so exactly-zero velocity
        // is a fixed point and decay never overshoots past zero. The
        // drift kind keeps more of its old line the more its velocity
        // disagrees with its facing.
        if !has_input {
            let mut retention = profile.friction;
            if profile.drift_factor > 0.0 && speed_sq > HEADING_SPEED_THRESHOLD * HEADING_SPEED_THRESHOLD {
                let slide = angle_diff(self.vy.atan2(self.vx), self.heading).abs();
                retention =
                    (retention + slide * profile.drift_factor * DRIFT_RETENTION_GAIN).min(MAX_RETENTION);
            }
            let keep = retention.powf(dt * 60.0);
            self.vx *= keep;
            self.vy *= keep;
        }

        // 5. Integrate.
        self.x += self.vx * dt;
        self.y += self.vy * dt;

        // 6. Facing. Velocity sets the target above the threshold;
        // the rendered heading follows at the turn rate.
        let speed = (self.vx * self.vx + self.vy * self.vy).sqrt();
        if speed > HEADING_SPEED_THRESHOLD {
            self.target_heading = self.vy.atan2(self.vx);
        }
        let delta = angle_diff(self.target_heading, self.heading);
        let max_turn = profile.turn_rate * dt;
        self.heading = normalize_angle(self.heading + delta.clamp(-max_turn, max_turn));

        // Lean eases toward its target at a fixed rate, independent of
        // the physical heading.
        let lean_target = (delta.sin() * LEAN_GAIN).clamp(-LEAN_MAX, LEAN_MAX);
        let blend = 1.0 - (1.0 - LEAN_BLEND).powf(dt * 60.0);
        self.lean += (lean_target - self.lean) * blend;

        // Gait phase: base cadence plus a speed term. Renderer-only.
        self.gait_phase =
            (self.gait_phase + dt * (GAIT_BASE_CADENCE + speed * GAIT_SPEED_CADENCE)).fract();
    }
}
