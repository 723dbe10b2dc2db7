//! Structures (points of interest) and the nearest-in-radius query.
//!
//! The query is a flat squared-distance scan. Deliberate: the world
//! holds a handful of structures, and O(n) beats any index at that
//! count. Above a few hundred structures the right upgrade is a
//! uniform grid or a k-d tree — revisit then, not before.

use serde::{Deserialize, Serialize};

use crate::constants::INTERACT_RADIUS;

/// Structure type tag. Closed set; interaction dispatch matches
/// exhaustively on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StructureKind {
    /// Swaps the world biome on activation.
    PortalGate,
    /// Starts the full-screen wipe that toggles the overlay.
    TerminalGate,
    /// Lore marker; logs its title on activation.
    Monolith,
    /// Decorative pathfinding ruin.
    RuinAlpha,
    /// Decorative parser ruin.
    RuinBeta,
}

/// A static point of interest. Created at world construction, never
/// mutated or destroyed for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub kind: StructureKind,
    pub x: f32,
    pub y: f32,
    /// Interaction radius, world units.
    ///
    /// Carried in data but not consulted by [`nearest_structure`]: the
    /// query tests the globally nearest structure against the caller's
    /// radius only, matching the shipped behavior. Whether this field
    /// should be authoritative instead is an open product question.
    #[serde(default = "default_radius")]
    pub radius: f32,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
}

fn default_radius() -> f32 {
    INTERACT_RADIUS
}

/// Index of the structure nearest to `(x, y)`, if that nearest one is
/// within `max_distance`. Ties on exact distance go to the first-found
/// entry; exact tie order is not part of the contract.
pub fn nearest_structure(
    structures: &[Structure],
    x: f32,
    y: f32,
    max_distance: f32,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, s) in structures.iter().enumerate() {
        let dx = s.x - x;
        let dy = s.y - y;
        let d_sq = dx * dx + dy * dy;
        if best.map_or(true, |(_, b)| d_sq < b) {
            best = Some((i, d_sq));
        }
    }
    match best {
        Some((i, d_sq)) if d_sq <= max_distance * max_distance => Some(i),
        _ => None,
    }
}
