//! Pure movement and interaction logic for Driftwalk.
//!
//! This crate contains the portfolio game's simulation core,
//! independent of any renderer, DOM, or runtime. Functions take plain
//! data and return results, making them unit-testable headless and
//! portable across hosts (canvas front end, native harness, tests).
//!
//! The host owns the frame loop and the drawing; the core is a step
//! function over plain state plus two collaborator seams
//! ([`world::WorldView`], [`world::InputSource`]).
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`camera`] | Exponential-smoothing viewport follow |
//! | [`constants`] | Shared tuning constants (radii, clamps, durations) |
//! | [`engine`] | Per-frame step function and render snapshot |
//! | [`interaction`] | Structure effects, wipe transition, event log |
//! | [`layout`] | World layout JSON model and validation |
//! | [`pathfinding`] | Grid route solver and patrol playback for the ruin demo |
//! | [`proximity`] | Structures and the nearest-in-radius query |
//! | [`steering`] | Avatar kinds, movement profiles, velocity/heading integrator |
//! | [`world`] | Collaborator traits, tile world, manual input |
//!
//! # Example
//!
//! ```
//! use driftwalk_logic::engine::Simulation;
//! use driftwalk_logic::pathfinding::{GridPos, PatrolPath};
//! use driftwalk_logic::steering::AvatarKind;
//! use driftwalk_logic::world::{Button, ManualInput, WorldView};
//! use driftwalk_logic::proximity::Structure;
//!
//! struct OpenField;
//! impl WorldView for OpenField {
//!     fn is_blocked(&self, _x: i32, _y: i32) -> bool { false }
//!     fn structures(&self) -> &[Structure] { &[] }
//! }
//!
//! let mut sim = Simulation::new(
//!     AvatarKind::Strider,
//!     (0.0, 0.0),
//!     PatrolPath::new(vec![GridPos::new(0, 0)], 0.08),
//! );
//! let mut input = ManualInput::default();
//! input.set_axis(1.0, 0.0);
//! input.press(Button::Sprint);
//! for _ in 0..60 {
//!     sim.step(&OpenField, &mut input, 1.0 / 60.0);
//! }
//! assert!(sim.avatar.x > 0.0);
//! ```

pub mod camera;
pub mod constants;
pub mod engine;
pub mod interaction;
pub mod layout;
pub mod pathfinding;
pub mod proximity;
pub mod steering;
pub mod world;
