//! World layout data model and validation.
//!
//! The session's static world ships as JSON (`data/world_layout.json`):
//! a collision tile field, the structure list, the spawn point, and the
//! ruin demo's obstacle grid. Validation is a set of pure functions
//! that return errors with context instead of panicking — a bad layout
//! is a data bug to report, not a runtime condition to limp through.

use serde::{Deserialize, Serialize};

use crate::constants::TILE_SIZE;
use crate::pathfinding::{GridPos, ObstacleGrid};
use crate::proximity::Structure;

/// Default patrol phase advance, cycles per second.
fn default_patrol_rate() -> f32 {
    0.08
}

/// Complete static world description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldLayout {
    /// Avatar spawn, world units.
    pub spawn: [f32; 2],
    /// Collision field rows, `'0'` free / `'1'` blocked, one tile per
    /// character.
    pub tiles: Vec<String>,
    pub structures: Vec<Structure>,
    pub ruin: RuinDemo,
}

/// The decorative pathfinding ruin: its own obstacle grid and the
/// patrol endpoints solved once at load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuinDemo {
    pub rows: Vec<String>,
    pub start: GridPos,
    pub goal: GridPos,
    #[serde(default = "default_patrol_rate")]
    pub patrol_rate: f32,
}

/// A layout validation finding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Finding severity. Construction refuses layouts with any `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

fn grid_errors(category: &'static str, rows: &[String]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if rows.is_empty() || rows.iter().all(|r| r.is_empty()) {
        errors.push(ValidationError {
            category,
            severity: Severity::Error,
            message: "grid has no rows".to_string(),
        });
        return errors;
    }
    let width = rows[0].chars().count();
    for (i, row) in rows.iter().enumerate() {
        let len = row.chars().count();
        if len != width {
            errors.push(ValidationError {
                category,
                severity: Severity::Error,
                message: format!("row {i} has {len} cells, expected {width}"),
            });
        }
        if let Some(bad) = row.chars().find(|c| *c != '0' && *c != '1') {
            errors.push(ValidationError {
                category,
                severity: Severity::Error,
                message: format!("row {i} contains {bad:?}, expected '0' or '1'"),
            });
        }
    }
    errors
}

/// Check the collision tile field.
pub fn check_tiles(layout: &WorldLayout) -> Vec<ValidationError> {
    grid_errors("tiles", &layout.tiles)
}

/// Check the ruin grid and that both patrol endpoints sit on free
/// cells. An unsolvable-but-well-formed grid is only a warning: the
/// solver degrades to the two-point fallback by contract.
pub fn check_ruin(ruin: &RuinDemo) -> Vec<ValidationError> {
    let mut errors = grid_errors("ruin", &ruin.rows);
    if !errors.is_empty() {
        return errors;
    }
    if ruin.patrol_rate <= 0.0 {
        errors.push(ValidationError {
            category: "ruin",
            severity: Severity::Error,
            message: format!("patrol_rate must be positive, got {}", ruin.patrol_rate),
        });
    }
    if let Some(grid) = ObstacleGrid::from_rows(&ruin.rows) {
        for (name, pos) in [("start", ruin.start), ("goal", ruin.goal)] {
            if !grid.in_bounds(pos) {
                errors.push(ValidationError {
                    category: "ruin",
                    severity: Severity::Error,
                    message: format!("{name} {pos:?} is outside the {}x{} grid", grid.width(), grid.height()),
                });
            } else if grid.is_wall(pos) {
                errors.push(ValidationError {
                    category: "ruin",
                    severity: Severity::Error,
                    message: format!("{name} {pos:?} is a wall cell"),
                });
            }
        }
    }
    errors
}

/// Check structure records: positive radii, non-empty titles.
pub fn check_structures(structures: &[Structure]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, s) in structures.iter().enumerate() {
        if s.radius <= 0.0 {
            errors.push(ValidationError {
                category: "structures",
                severity: Severity::Error,
                message: format!("structure {i} ({:?}) has non-positive radius {}", s.kind, s.radius),
            });
        }
        if s.title.is_empty() {
            errors.push(ValidationError {
                category: "structures",
                severity: Severity::Warning,
                message: format!("structure {i} ({:?}) has an empty title", s.kind),
            });
        }
    }
    errors
}

/// Check the spawn point lands on a free tile of the collision field.
pub fn check_spawn(layout: &WorldLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let Some(grid) = ObstacleGrid::from_rows(&layout.tiles) else {
        return errors; // tile errors already reported
    };
    let [x, y] = layout.spawn;
    let col = (x / TILE_SIZE).floor();
    let row = (y / TILE_SIZE).floor();
    let in_bounds =
        col >= 0.0 && row >= 0.0 && (col as u32) < grid.width() && (row as u32) < grid.height();
    if !in_bounds || grid.is_wall(GridPos::new(row as u32, col as u32)) {
        errors.push(ValidationError {
            category: "spawn",
            severity: Severity::Error,
            message: format!("spawn ({x}, {y}) is not on a free tile"),
        });
    }
    errors
}

/// Run every check.
pub fn validate_layout(layout: &WorldLayout) -> Vec<ValidationError> {
    let mut errors = check_tiles(layout);
    errors.extend(check_ruin(&layout.ruin));
    errors.extend(check_structures(&layout.structures));
    errors.extend(check_spawn(layout));
    errors
}

/// Whether any finding is a hard error.
pub fn has_errors(findings: &[ValidationError]) -> bool {
    findings.iter().any(|f| f.severity == Severity::Error)
}
