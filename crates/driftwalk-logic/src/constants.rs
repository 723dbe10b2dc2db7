//! Shared tuning constants.
//!
//! Values that more than one module (or the host) needs to agree on.
//! Module-local tuning (lean gain, gait cadence, ...) stays in the
//! module that owns it.

/// Interaction range for structure prompts, world units.
pub const INTERACT_RADIUS: f32 = 180.0;

/// Upper bound on a single integration step, seconds.
///
/// A backgrounded tab or a debugger pause can hand the loop an
/// arbitrarily large elapsed time; one giant step through the friction
/// and integration math is not stable. The host clamps, and `step`
/// clamps again.
pub const MAX_STEP_SECONDS: f32 = 0.04;

/// Full-screen wipe duration, seconds (first trigger to mode toggle).
pub const WIPE_SECONDS: f32 = 0.8;

/// Edge length of one world tile, world units.
pub const TILE_SIZE: f32 = 16.0;

/// Maximum retained lines in the event log; oldest dropped first.
pub const EVENT_LOG_CAPACITY: usize = 32;

/// Below this speed (units/s) the facing heading holds its last value
/// instead of tracking velocity, so near-zero drift cannot jitter it.
pub const HEADING_SPEED_THRESHOLD: f32 = 2.0;

/// Input axes with squared length under this are treated as "no
/// directional input" rather than normalized.
pub const INPUT_EPSILON_SQ: f32 = 1.0e-4;
