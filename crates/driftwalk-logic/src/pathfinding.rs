//! Grid pathfinding for the decorative ruin demo.
//!
//! A* over a static binary obstacle grid: 4-directional steps at
//! uniform cost 1, Manhattan heuristic (admissible and consistent for
//! this cost model, so the result is optimal). The route is solved
//! once at world load; per-frame work is an index into the finished
//! sequence.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

/// A cell on the obstacle grid, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub row: u32,
    pub col: u32,
}

impl GridPos {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to another cell.
    pub fn manhattan(self, other: Self) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Static binary obstacle grid: `true` cells are walls.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleGrid {
    width: u32,
    height: u32,
    blocked: Vec<bool>,
}

impl ObstacleGrid {
    /// Build from text rows of `'0'` (free) and `'1'` (wall).
    ///
    /// Returns `None` for an empty grid, ragged rows, or any other
    /// character — layout validation reports those with context before
    /// construction is attempted.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Option<Self> {
        let height = rows.len() as u32;
        let width = rows.first()?.as_ref().chars().count() as u32;
        if width == 0 {
            return None;
        }
        let mut blocked = Vec::with_capacity((width * height) as usize);
        for row in rows {
            let mut count = 0;
            for c in row.as_ref().chars() {
                match c {
                    '0' => blocked.push(false),
                    '1' => blocked.push(true),
                    _ => return None,
                }
                count += 1;
            }
            if count != width {
                return None;
            }
        }
        Some(Self {
            width,
            height,
            blocked,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    /// Wall query. Out-of-bounds counts as a wall.
    pub fn is_wall(&self, pos: GridPos) -> bool {
        if !self.in_bounds(pos) {
            return true;
        }
        self.blocked
            .get((pos.row * self.width + pos.col) as usize)
            .copied()
            .unwrap_or(true)
    }

    fn index(&self, pos: GridPos) -> u32 {
        pos.row * self.width + pos.col
    }

    fn pos(&self, index: u32) -> GridPos {
        GridPos::new(index / self.width, index % self.width)
    }

    /// Free orthogonal neighbors of a cell.
    fn neighbors(&self, pos: GridPos, out: &mut Vec<GridPos>) {
        out.clear();
        if pos.row > 0 {
            out.push(GridPos::new(pos.row - 1, pos.col));
        }
        if pos.col > 0 {
            out.push(GridPos::new(pos.row, pos.col - 1));
        }
        out.push(GridPos::new(pos.row + 1, pos.col));
        out.push(GridPos::new(pos.row, pos.col + 1));
        out.retain(|&p| self.in_bounds(p) && !self.is_wall(p));
    }
}

/// Shortest route from `start` to `goal`, both inclusive.
///
/// If no route exists (or either endpoint is a wall / out of bounds),
/// returns the two-point fallback `[start, goal]` — callers index into
/// the result unconditionally and must never see an empty sequence.
/// Equal-`f` frontier ties pop in insertion order; that order is an
/// implementation detail, not a contract.
pub fn solve_route(grid: &ObstacleGrid, start: GridPos, goal: GridPos) -> Vec<GridPos> {
    if !grid.in_bounds(start) || !grid.in_bounds(goal) || grid.is_wall(start) || grid.is_wall(goal)
    {
        return vec![start, goal];
    }
    let start_idx = grid.index(start);
    let goal_idx = grid.index(goal);

    // Frontier ordered by f = g + h; the push counter breaks ties.
    let mut frontier: BinaryHeap<Reverse<(u32, u64, u32)>> = BinaryHeap::new();
    let mut came_from: HashMap<u32, u32> = HashMap::new();
    let mut cost_so_far: HashMap<u32, u32> = HashMap::new();
    let mut pushes: u64 = 0;
    let mut scratch = Vec::with_capacity(4);

    frontier.push(Reverse((start.manhattan(goal), pushes, start_idx)));
    cost_so_far.insert(start_idx, 0);

    while let Some(Reverse((_, _, current))) = frontier.pop() {
        if current == goal_idx {
            // Walk predecessors back to the start, then reverse.
            let mut route = vec![grid.pos(current)];
            let mut node = current;
            while let Some(&prev) = came_from.get(&node) {
                route.push(grid.pos(prev));
                node = prev;
            }
            route.reverse();
            return route;
        }

        grid.neighbors(grid.pos(current), &mut scratch);
        for &next in &scratch {
            let next_idx = grid.index(next);
            let new_cost = cost_so_far
                .get(&current)
                .copied()
                .unwrap_or(u32::MAX)
                .saturating_add(1);
            if cost_so_far.get(&next_idx).map_or(true, |&c| new_cost < c) {
                cost_so_far.insert(next_idx, new_cost);
                came_from.insert(next_idx, current);
                pushes += 1;
                frontier.push(Reverse((
                    new_cost.saturating_add(next.manhattan(goal)),
                    pushes,
                    next_idx,
                )));
            }
        }
    }

    vec![start, goal]
}

/// Solved route plus a monotone phase accumulator driving a looping
/// patrol marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PatrolPath {
    route: Vec<GridPos>,
    /// Cycles per second of phase advance.
    rate: f32,
    phase: f32,
}

impl PatrolPath {
    /// Wrap a solved route. `solve_route` never returns an empty
    /// sequence, and neither does any valid caller; an empty route is
    /// coerced to a single origin cell so `marker` stays total.
    pub fn new(route: Vec<GridPos>, rate: f32) -> Self {
        let route = if route.is_empty() {
            vec![GridPos::new(0, 0)]
        } else {
            route
        };
        Self {
            route,
            rate,
            phase: 0.0,
        }
    }

    pub fn route(&self) -> &[GridPos] {
        &self.route
    }

    /// Advance the phase. Monotone; playback wraps via the fractional
    /// part so the loop has no endpoint pause.
    pub fn advance(&mut self, dt: f32) {
        self.phase += dt * self.rate;
    }

    /// Cell the marker currently occupies:
    /// `route[floor(fract(phase) * len)]`.
    pub fn marker(&self) -> GridPos {
        let len = self.route.len();
        let idx = ((self.phase.fract() * len as f32) as usize).min(len - 1);
        self.route[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> ObstacleGrid {
        ObstacleGrid::from_rows(rows).unwrap()
    }

    /// Consecutive cells differ by exactly one orthogonal step and no
    /// cell is a wall.
    fn assert_connected_and_clear(g: &ObstacleGrid, route: &[GridPos]) {
        for pair in route.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1, "gap between {:?} and {:?}", pair[0], pair[1]);
        }
        for &cell in route {
            assert!(!g.is_wall(cell), "route crosses wall at {cell:?}");
        }
    }

    // ── Grid construction ──

    #[test]
    fn rejects_ragged_and_non_binary_rows() {
        assert!(ObstacleGrid::from_rows(&["00", "0"]).is_none());
        assert!(ObstacleGrid::from_rows(&["0x"]).is_none());
        assert!(ObstacleGrid::from_rows::<&str>(&[]).is_none());
        assert!(ObstacleGrid::from_rows(&[""]).is_none());
    }

    #[test]
    fn out_of_bounds_is_wall() {
        let g = grid(&["00", "00"]);
        assert!(g.is_wall(GridPos::new(2, 0)));
        assert!(g.is_wall(GridPos::new(0, 2)));
        assert!(!g.is_wall(GridPos::new(1, 1)));
    }

    // ── Solving ──

    #[test]
    fn detours_around_center_wall() {
        // The worked example: 3x3 with the center blocked. Corner to
        // corner is 5 cells, never touching (1,1).
        let g = grid(&["000", "010", "000"]);
        let route = solve_route(&g, GridPos::new(0, 0), GridPos::new(2, 2));
        assert_eq!(route.len(), 5);
        assert_connected_and_clear(&g, &route);
        assert!(!route.contains(&GridPos::new(1, 1)));
        assert_eq!(route[0], GridPos::new(0, 0));
        assert_eq!(route[4], GridPos::new(2, 2));
    }

    #[test]
    fn open_grid_route_is_manhattan_optimal() {
        let g = grid(&["0000", "0000", "0000"]);
        let start = GridPos::new(0, 0);
        let goal = GridPos::new(2, 3);
        let route = solve_route(&g, start, goal);
        assert_eq!(route.len() as u32, start.manhattan(goal) + 1);
        assert_connected_and_clear(&g, &route);
    }

    #[test]
    fn enclosed_start_returns_two_point_fallback() {
        let g = grid(&["01000", "11000", "00000"]);
        // (0,0) is boxed in by walls.
        let start = GridPos::new(0, 0);
        let goal = GridPos::new(2, 4);
        let route = solve_route(&g, start, goal);
        assert_eq!(route, vec![start, goal]);
    }

    #[test]
    fn wall_endpoint_returns_fallback() {
        let g = grid(&["010", "000"]);
        let start = GridPos::new(0, 0);
        let wall = GridPos::new(0, 1);
        assert_eq!(solve_route(&g, start, wall), vec![start, wall]);
        assert_eq!(solve_route(&g, wall, start), vec![wall, start]);
    }

    #[test]
    fn start_equals_goal_is_single_cell() {
        let g = grid(&["000", "000"]);
        let here = GridPos::new(1, 1);
        assert_eq!(solve_route(&g, here, here), vec![here]);
    }

    #[test]
    fn corridor_maze_solves() {
        let g = grid(&[
            "0111110",
            "0100010",
            "0101010",
            "0001010",
            "1111000",
        ]);
        let start = GridPos::new(0, 0);
        let goal = GridPos::new(4, 6);
        let route = solve_route(&g, start, goal);
        assert!(route.len() > 2, "maze should need a real route");
        assert_connected_and_clear(&g, &route);
        assert_eq!(*route.first().unwrap(), start);
        assert_eq!(*route.last().unwrap(), goal);
    }

    // ── Playback ──

    #[test]
    fn patrol_loops_without_endpoint_pause() {
        let g = grid(&["000", "010", "000"]);
        let route = solve_route(&g, GridPos::new(0, 0), GridPos::new(2, 2));
        let len = route.len();
        let mut patrol = PatrolPath::new(route.clone(), 1.0);

        // One full cycle visits every index in order.
        let mut seen = Vec::new();
        for _ in 0..len {
            seen.push(patrol.marker());
            patrol.advance(1.0 / len as f32);
        }
        assert_eq!(seen, route);
        // And the next sample wraps straight back to the start.
        assert_eq!(patrol.marker(), route[0]);
    }

    #[test]
    fn marker_indexes_fallback_route_safely() {
        let mut patrol = PatrolPath::new(
            vec![GridPos::new(0, 0), GridPos::new(4, 4)],
            0.25,
        );
        for _ in 0..100 {
            patrol.advance(0.05);
            let m = patrol.marker();
            assert!(m == GridPos::new(0, 0) || m == GridPos::new(4, 4));
        }
    }

    #[test]
    fn single_cell_route_is_stationary() {
        let mut patrol = PatrolPath::new(vec![GridPos::new(2, 3)], 1.0);
        patrol.advance(12.34);
        assert_eq!(patrol.marker(), GridPos::new(2, 3));
    }
}
