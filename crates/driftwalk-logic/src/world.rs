//! Collaborator seams and the concrete tile world.
//!
//! The core consumes a world occupancy/structure query and an input
//! axis/button sampler, and never touches a display surface or a DOM.
//! Hosts implement [`WorldView`] and [`InputSource`]; [`TileWorld`]
//! and [`ManualInput`] are the stock implementations used by the
//! bundled layout and by tests.

use crate::constants::TILE_SIZE;
use crate::layout::{has_errors, validate_layout, ValidationError, WorldLayout};
use crate::pathfinding::{solve_route, GridPos, ObstacleGrid, PatrolPath};
use crate::proximity::Structure;

/// World occupancy and structure queries, in tile coordinates.
pub trait WorldView {
    /// Whether the tile at `(tile_x, tile_y)` blocks movement.
    /// Out-of-bounds tiles block.
    fn is_blocked(&self, tile_x: i32, tile_y: i32) -> bool;

    /// Session-static points of interest, in a stable order.
    fn structures(&self) -> &[Structure];
}

/// Discrete input buttons the core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Interact,
    Sprint,
}

/// Input sampler. `axis` components are -1/0/1 (or a normalized stick
/// vector); edges report `true` at most once per physical press.
pub trait InputSource {
    fn axis(&self) -> (f32, f32);
    fn is_held(&self, button: Button) -> bool;
    fn consume_edge(&mut self, button: Button) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
struct ButtonState {
    held: bool,
    edge: bool,
}

/// Plain-struct input source for hosts and tests: set the axis, press
/// and release buttons, and the edge bookkeeping matches a real
/// keyboard listener (a held key produces one edge per press).
#[derive(Debug, Clone, Default)]
pub struct ManualInput {
    axis: (f32, f32),
    buttons: [ButtonState; 2],
}

fn slot(button: Button) -> usize {
    match button {
        Button::Interact => 0,
        Button::Sprint => 1,
    }
}

impl ManualInput {
    pub fn set_axis(&mut self, x: f32, y: f32) {
        self.axis = (x, y);
    }

    /// Press a button. Arms the edge only on the held→pressed change,
    /// never on key repeat.
    pub fn press(&mut self, button: Button) {
        let state = &mut self.buttons[slot(button)];
        if !state.held {
            state.edge = true;
        }
        state.held = true;
    }

    pub fn release(&mut self, button: Button) {
        self.buttons[slot(button)].held = false;
    }
}

impl InputSource for ManualInput {
    fn axis(&self) -> (f32, f32) {
        self.axis
    }

    fn is_held(&self, button: Button) -> bool {
        self.buttons[slot(button)].held
    }

    fn consume_edge(&mut self, button: Button) -> bool {
        std::mem::take(&mut self.buttons[slot(button)].edge)
    }
}

/// Concrete session world: a collision tile field, the structure list,
/// and the ruin demo's pre-solved patrol route.
#[derive(Debug, Clone)]
pub struct TileWorld {
    tiles: ObstacleGrid,
    structures: Vec<Structure>,
    spawn: (f32, f32),
    ruin: ObstacleGrid,
    ruin_route: Vec<GridPos>,
    patrol_rate: f32,
}

impl TileWorld {
    /// Build from a validated layout. Refuses any layout with hard
    /// validation errors, returning the full findings list.
    ///
    /// The ruin route is solved here, once; an unsolvable ruin grid
    /// degrades to the documented two-point fallback rather than
    /// failing construction.
    pub fn from_layout(layout: &WorldLayout) -> Result<Self, Vec<ValidationError>> {
        let findings = validate_layout(layout);
        if has_errors(&findings) {
            return Err(findings);
        }
        let (tiles, ruin) = match (
            ObstacleGrid::from_rows(&layout.tiles),
            ObstacleGrid::from_rows(&layout.ruin.rows),
        ) {
            (Some(tiles), Some(ruin)) => (tiles, ruin),
            _ => return Err(findings),
        };
        let ruin_route = solve_route(&ruin, layout.ruin.start, layout.ruin.goal);
        Ok(Self {
            tiles,
            structures: layout.structures.clone(),
            spawn: (layout.spawn[0], layout.spawn[1]),
            ruin,
            ruin_route,
            patrol_rate: layout.ruin.patrol_rate,
        })
    }

    pub fn spawn(&self) -> (f32, f32) {
        self.spawn
    }

    pub fn ruin_grid(&self) -> &ObstacleGrid {
        &self.ruin
    }

    pub fn ruin_route(&self) -> &[GridPos] {
        &self.ruin_route
    }

    /// Fresh patrol playback over the pre-solved route.
    pub fn patrol(&self) -> PatrolPath {
        PatrolPath::new(self.ruin_route.clone(), self.patrol_rate)
    }

    /// Tile containing a world-unit position.
    pub fn tile_at(x: f32, y: f32) -> (i32, i32) {
        ((x / TILE_SIZE).floor() as i32, (y / TILE_SIZE).floor() as i32)
    }
}

impl WorldView for TileWorld {
    fn is_blocked(&self, tile_x: i32, tile_y: i32) -> bool {
        if tile_x < 0 || tile_y < 0 {
            return true;
        }
        self.tiles
            .is_wall(GridPos::new(tile_y as u32, tile_x as u32))
    }

    fn structures(&self) -> &[Structure] {
        &self.structures
    }
}
