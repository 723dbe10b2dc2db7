//! Driftwalk Headless Simulation Harness
//!
//! Validates the pure simulation logic and the bundled world data
//! without a renderer. Runs entirely in-process — no canvas, no DOM,
//! no timing dependence.
//!
//! Usage:
//!   cargo run -p driftwalk-simtest
//!   cargo run -p driftwalk-simtest -- --verbose

use driftwalk_logic::constants::{INTERACT_RADIUS, WIPE_SECONDS};
use driftwalk_logic::engine::Simulation;
use driftwalk_logic::interaction::WipeTransition;
use driftwalk_logic::layout::{has_errors, validate_layout, WorldLayout};
use driftwalk_logic::pathfinding::{solve_route, GridPos, ObstacleGrid};
use driftwalk_logic::proximity::{nearest_structure, StructureKind};
use driftwalk_logic::steering::{angle_diff, AvatarKind, SteeringBody};
use driftwalk_logic::world::{Button, ManualInput, TileWorld, WorldView};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── World data (same JSON a host ships) ─────────────────────────────────
const LAYOUT_JSON: &str = include_str!("../../../data/world_layout.json");

const DT: f32 = 1.0 / 60.0;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed,
        detail,
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Driftwalk Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Bundled layout and world construction
    let world = match validate_world(&mut results, verbose) {
        Some(w) => w,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 2. Steering sweep
    results.extend(validate_steering(verbose));

    // 3. Pathfinding on the worked example and random carved grids
    results.extend(validate_pathfinding(verbose));

    // 4. Proximity cases
    results.extend(validate_proximity(&world, verbose));

    // 5. Wipe timing
    results.extend(validate_wipe(verbose));

    // 6. Full-engine soak on the bundled world
    results.extend(validate_engine_soak(&world, verbose));

    report(&results, verbose);
    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
}

fn report(results: &[TestResult], verbose: bool) {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );
}

// ── 1. Layout & world ───────────────────────────────────────────────────

fn validate_world(results: &mut Vec<TestResult>, _verbose: bool) -> Option<TileWorld> {
    println!("--- Layout & World ---");

    let layout: WorldLayout = match serde_json::from_str(LAYOUT_JSON) {
        Ok(l) => l,
        Err(e) => {
            results.push(check("layout_parse", false, format!("JSON parse error: {e}")));
            return None;
        }
    };
    results.push(check(
        "layout_parse",
        true,
        format!(
            "{} tile rows, {} structures",
            layout.tiles.len(),
            layout.structures.len()
        ),
    ));

    let findings = validate_layout(&layout);
    results.push(check(
        "layout_valid",
        !has_errors(&findings),
        format!("{} findings", findings.len()),
    ));

    let world = match TileWorld::from_layout(&layout) {
        Ok(w) => w,
        Err(errors) => {
            results.push(check("world_build", false, format!("{errors:?}")));
            return None;
        }
    };
    results.push(check(
        "world_build",
        true,
        format!("ruin route: {} cells", world.ruin_route().len()),
    ));

    // Every structure kind should appear exactly once in the shipped
    // world, and the route must be a real solve, not the fallback.
    let mut kind_counts = [0usize; 5];
    for s in world.structures() {
        let slot = match s.kind {
            StructureKind::PortalGate => 0,
            StructureKind::TerminalGate => 1,
            StructureKind::Monolith => 2,
            StructureKind::RuinAlpha => 3,
            StructureKind::RuinBeta => 4,
        };
        kind_counts[slot] += 1;
    }
    results.push(check(
        "world_structures",
        kind_counts.iter().all(|&c| c == 1),
        format!("kind counts {kind_counts:?}"),
    ));
    let connected = world
        .ruin_route()
        .windows(2)
        .all(|p| p[0].manhattan(p[1]) == 1);
    results.push(check(
        "ruin_route_connected",
        connected && world.ruin_route().len() > 2,
        format!("{} cells", world.ruin_route().len()),
    ));

    Some(world)
}

// ── 2. Steering ─────────────────────────────────────────────────────────

fn validate_steering(_verbose: bool) -> Vec<TestResult> {
    println!("--- Steering ---");
    let mut results = Vec::new();

    // Held axis converges to the cap for every kind.
    for kind in [AvatarKind::Strider, AvatarKind::Jaguar, AvatarKind::Hoverboard] {
        let profile = kind.profile();
        let mut body = SteeringBody::new(kind, 0.0, 0.0);
        for _ in 0..60 {
            body.update(DT, (1.0, 0.0), false);
        }
        let ok = (body.speed() - profile.max_speed).abs() <= profile.max_speed * 0.01;
        results.push(check(
            &format!("steer_converge_{kind:?}"),
            ok,
            format!("speed {:.1} vs cap {:.1}", body.speed(), profile.max_speed),
        ));
    }

    // Fuzzed input never breaks the sprint cap and decays to rest.
    let mut rng = StdRng::seed_from_u64(7);
    let mut worst = 0.0_f32;
    let mut ok = true;
    for kind in [AvatarKind::Strider, AvatarKind::Jaguar, AvatarKind::Hoverboard] {
        let profile = kind.profile();
        let cap = profile.max_speed * profile.sprint_multiplier;
        let mut body = SteeringBody::new(kind, 0.0, 0.0);
        for _ in 0..600 {
            let axis = (
                rng.gen_range(-1i32..=1) as f32,
                rng.gen_range(-1i32..=1) as f32,
            );
            let sprint = rng.gen_bool(0.3);
            let dt = rng.gen_range(0.004..0.04);
            body.update(dt, axis, sprint);
            let over = body.speed() / cap;
            worst = worst.max(over);
            ok &= over <= 1.001;
        }
        for _ in 0..1200 {
            body.update(DT, (0.0, 0.0), false);
        }
        ok &= body.speed() < 1.0;
    }
    results.push(check(
        "steer_fuzz_cap_and_decay",
        ok,
        format!("worst cap utilization {worst:.4}"),
    ));

    // Heading rate limit under a forced reversal.
    let mut body = SteeringBody::new(AvatarKind::Jaguar, 0.0, 0.0);
    let turn_rate = body.kind.profile().turn_rate;
    body.vx = 200.0;
    let mut prev = body.heading;
    let mut bounded = true;
    for _ in 0..240 {
        body.update(DT, (-1.0, 0.2), false);
        bounded &= angle_diff(body.heading, prev).abs() <= turn_rate * DT + 1e-4;
        prev = body.heading;
    }
    results.push(check(
        "steer_turn_rate_bound",
        bounded,
        format!("limit {:.4} rad/tick", turn_rate * DT),
    ));

    results
}

// ── 3. Pathfinding ──────────────────────────────────────────────────────

/// Carve a random orthogonal walk from corner to corner through a
/// field of walls; the carved rows are solvable by construction.
fn carve_rows(rng: &mut StdRng, width: u32, height: u32) -> (Vec<String>, GridPos, GridPos) {
    let mut rows: Vec<Vec<u8>> = (0..height).map(|_| vec![b'1'; width as usize]).collect();
    let start = GridPos::new(0, 0);
    let goal = GridPos::new(height - 1, width - 1);
    let (mut r, mut c) = (0u32, 0u32);
    rows[0][0] = b'0';
    while (r, c) != (goal.row, goal.col) {
        // Biased toward the goal so the walk terminates quickly.
        let toward_goal = rng.gen_bool(0.7);
        let go_row = rng.gen_bool(0.5);
        if go_row {
            if toward_goal && r < goal.row {
                r += 1;
            } else if r > 0 && !toward_goal {
                r -= 1;
            } else if r < goal.row {
                r += 1;
            }
        } else if toward_goal && c < goal.col {
            c += 1;
        } else if c > 0 && !toward_goal {
            c -= 1;
        } else if c < goal.col {
            c += 1;
        }
        rows[r as usize][c as usize] = b'0';
    }
    let rows = rows
        .into_iter()
        .map(|row| row.into_iter().map(char::from).collect())
        .collect();
    (rows, start, goal)
}

fn validate_pathfinding(verbose: bool) -> Vec<TestResult> {
    println!("--- Pathfinding ---");
    let mut results = Vec::new();

    // Worked example: 3x3 with a center wall, corner to corner.
    if let Some(grid) = ObstacleGrid::from_rows(&["000", "010", "000"]) {
        let route = solve_route(&grid, GridPos::new(0, 0), GridPos::new(2, 2));
        let ok = route.len() == 5 && !route.contains(&GridPos::new(1, 1));
        results.push(check(
            "astar_center_wall",
            ok,
            format!("{} cells", route.len()),
        ));
    }

    // Open grids: length must equal the Manhattan optimum.
    let mut rng = StdRng::seed_from_u64(11);
    let mut optimal = true;
    for _ in 0..50 {
        let w = rng.gen_range(2..20);
        let h = rng.gen_range(2..20);
        let rows: Vec<String> = (0..h).map(|_| "0".repeat(w)).collect();
        let Some(grid) = ObstacleGrid::from_rows(&rows) else {
            optimal = false;
            break;
        };
        let start = GridPos::new(rng.gen_range(0..h as u32), rng.gen_range(0..w as u32));
        let goal = GridPos::new(rng.gen_range(0..h as u32), rng.gen_range(0..w as u32));
        let route = solve_route(&grid, start, goal);
        optimal &= route.len() as u32 == start.manhattan(goal) + 1;
    }
    results.push(check("astar_open_optimal", optimal, "50 random open grids".to_string()));

    // Carved mazes: always solvable, route connected and wall-free.
    let mut carved_ok = true;
    let mut total_cells = 0usize;
    for _ in 0..50 {
        let w = rng.gen_range(3u32..24);
        let h = rng.gen_range(3u32..24);
        let (rows, start, goal) = carve_rows(&mut rng, w, h);
        let Some(grid) = ObstacleGrid::from_rows(&rows) else {
            carved_ok = false;
            break;
        };
        let route = solve_route(&grid, start, goal);
        total_cells += route.len();
        carved_ok &= route.first() == Some(&start) && route.last() == Some(&goal);
        carved_ok &= route.windows(2).all(|p| p[0].manhattan(p[1]) == 1);
        carved_ok &= route.iter().all(|&c| !grid.is_wall(c));
    }
    results.push(check(
        "astar_carved_solvable",
        carved_ok,
        format!("50 carved grids, {total_cells} route cells total"),
    ));

    // Sealed start: the exact two-point fallback, never a crash.
    if let Some(grid) = ObstacleGrid::from_rows(&["01", "11"]) {
        let start = GridPos::new(0, 0);
        let goal = GridPos::new(1, 1);
        let route = solve_route(&grid, start, goal);
        results.push(check(
            "astar_fallback",
            route == vec![start, goal],
            format!("{route:?}"),
        ));
    }

    if verbose {
        println!("  (grids seeded for reproducibility)");
    }
    results
}

// ── 4. Proximity ────────────────────────────────────────────────────────

fn validate_proximity(world: &TileWorld, _verbose: bool) -> Vec<TestResult> {
    println!("--- Proximity ---");
    let mut results = Vec::new();
    let structures = world.structures();

    // From spawn, nothing is in interact range (by data design).
    let (sx, sy) = world.spawn();
    results.push(check(
        "prox_spawn_clear",
        nearest_structure(structures, sx, sy, INTERACT_RADIUS).is_none(),
        format!("spawn ({sx}, {sy})"),
    ));

    // Standing on each structure, that structure is the nearest hit.
    let mut each_ok = true;
    for (i, s) in structures.iter().enumerate() {
        let hit = nearest_structure(structures, s.x, s.y, INTERACT_RADIUS);
        each_ok &= hit == Some(i);
    }
    results.push(check(
        "prox_on_structure",
        each_ok,
        format!("{} structures", structures.len()),
    ));

    // A point far outside the field sees nothing.
    results.push(check(
        "prox_far_none",
        nearest_structure(structures, 10_000.0, 10_000.0, INTERACT_RADIUS).is_none(),
        "query at (10000, 10000)".to_string(),
    ));

    results
}

// ── 5. Wipe timing ──────────────────────────────────────────────────────

fn validate_wipe(_verbose: bool) -> Vec<TestResult> {
    println!("--- Wipe ---");
    let mut results = Vec::new();

    let mut wipe = WipeTransition::default();
    let started = wipe.begin();
    let restarted = wipe.begin();
    let mut ticks = 0;
    let mut completions = 0;
    for _ in 0..200 {
        if wipe.active {
            ticks += 1;
        }
        if wipe.advance(DT) {
            completions += 1;
        }
    }
    let elapsed = ticks as f32 * DT;
    results.push(check(
        "wipe_single_completion",
        started && !restarted && completions == 1,
        format!("{completions} completions"),
    ));
    results.push(check(
        "wipe_duration",
        (elapsed - WIPE_SECONDS).abs() <= 2.0 * DT,
        format!("{elapsed:.3} s vs {WIPE_SECONDS} s"),
    ));

    results
}

// ── 6. Engine soak ──────────────────────────────────────────────────────

fn validate_engine_soak(world: &TileWorld, verbose: bool) -> Vec<TestResult> {
    println!("--- Engine Soak ---");
    let mut results = Vec::new();

    let mut sim = Simulation::from_world(world);
    let mut input = ManualInput::default();
    let mut rng = StdRng::seed_from_u64(23);

    let mut cap_ok = true;
    let mut walls_ok = true;
    let mut patrol_ok = true;
    // 60 simulated seconds of random play, switching kinds on the fly.
    for i in 0..3600 {
        if i % 240 == 0 {
            input.set_axis(
                rng.gen_range(-1i32..=1) as f32,
                rng.gen_range(-1i32..=1) as f32,
            );
        }
        if i % 600 == 0 && rng.gen_bool(0.5) {
            sim.cycle_avatar_kind();
        }
        if rng.gen_bool(0.02) {
            input.press(Button::Interact);
        } else {
            input.release(Button::Interact);
        }
        if rng.gen_bool(0.01) {
            input.press(Button::Sprint);
        } else if rng.gen_bool(0.05) {
            input.release(Button::Sprint);
        }
        // The host's overlay-close path, so the soak doesn't stall
        // behind an opened terminal.
        if sim.overlay_active && !sim.wipe.active && rng.gen_bool(0.05) {
            sim.request_overlay_wipe();
        }

        let frozen = sim.wipe.active || sim.overlay_active;
        sim.step(world, &mut input, DT);

        // The cap is enforced by the steering update; frozen frames
        // carry velocity untouched (a kind switch mid-freeze may hold
        // it above the new kind's cap until the sim resumes).
        if !frozen {
            let profile = sim.avatar.kind.profile();
            cap_ok &= sim.avatar.speed() <= profile.max_speed * profile.sprint_multiplier * 1.001;
        }
        let (tx, ty) = TileWorld::tile_at(sim.avatar.x, sim.avatar.y);
        walls_ok &= !world.is_blocked(tx, ty);
        patrol_ok &= world.ruin_route().contains(&sim.patrol.marker());
    }

    results.push(check(
        "soak_speed_cap",
        cap_ok,
        "60 s of random input".to_string(),
    ));
    results.push(check(
        "soak_no_wall_standing",
        walls_ok,
        format!("final pos ({:.0}, {:.0})", sim.avatar.x, sim.avatar.y),
    ));
    results.push(check(
        "soak_patrol_on_route",
        patrol_ok,
        format!("marker {:?}", sim.patrol.marker()),
    ));
    results.push(check(
        "soak_snapshot",
        serde_json::to_string(&sim.snapshot(world)).is_ok(),
        format!("log lines: {}", sim.log.len()),
    ));

    if verbose {
        for line in sim.log.iter() {
            println!("    log: {line}");
        }
    }

    results
}
