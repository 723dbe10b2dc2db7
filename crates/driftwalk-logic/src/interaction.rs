//! Activate-edge dispatch: structure effects, the wipe transition, and
//! the bounded event log.
//!
//! Two states: idle and transitioning. Only the terminal gate enters
//! the transitioning state (a timed full-screen wipe that toggles the
//! overlay flag on completion); every other structure dispatches its
//! effect immediately and tolerates being re-triggered while the
//! avatar stands in range.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::constants::{EVENT_LOG_CAPACITY, WIPE_SECONDS};
use crate::proximity::{Structure, StructureKind};

/// World biome flag, toggled by the portal gate. Palette data for the
/// biomes lives with the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Biome {
    #[default]
    Jungle,
    City,
}

impl Biome {
    pub fn toggled(self) -> Self {
        match self {
            Self::Jungle => Self::City,
            Self::City => Self::Jungle,
        }
    }
}

/// Typed result of activating a structure.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Portal gate: swap the world biome.
    ToggleBiome,
    /// Terminal gate: begin the overlay wipe (no-op while one runs).
    BeginWipe,
    /// Monolith and ruins: append a line to the event log.
    Log(String),
}

/// Effect a structure produces when activated. Exhaustive over the
/// closed kind set; adding a kind fails to compile until handled here.
pub fn dispatch(structure: &Structure) -> Effect {
    match structure.kind {
        StructureKind::PortalGate => Effect::ToggleBiome,
        StructureKind::TerminalGate => Effect::BeginWipe,
        StructureKind::Monolith => {
            Effect::Log(format!("{}: lore archive synced.", structure.title))
        }
        StructureKind::RuinAlpha => Effect::Log("Ruin A online: A* route stabilized.".to_string()),
        StructureKind::RuinBeta => {
            Effect::Log("Ruin B online: stream parser active.".to_string())
        }
    }
}

/// Timed full-screen wipe gating the overlay toggle.
///
/// Progress runs 0 → 1 over [`WIPE_SECONDS`] of simulated time and is
/// clamped at 1; a second trigger while active neither restarts nor
/// queues another wipe.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WipeTransition {
    pub active: bool,
    /// Normalized progress in [0,1].
    pub t: f32,
}

impl WipeTransition {
    /// Start the wipe. Returns `false` (and changes nothing) if one is
    /// already running.
    pub fn begin(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.t = 0.0;
        true
    }

    /// Advance progress; returns `true` on the tick the wipe
    /// completes — the caller applies the gated toggle exactly then.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.t += dt / WIPE_SECONDS;
        if self.t >= 1.0 {
            self.t = 1.0;
            self.active = false;
            return true;
        }
        false
    }
}

/// Bounded log of interaction lines; oldest dropped past capacity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    lines: VecDeque<String>,
}

impl EventLog {
    pub fn push(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > EVENT_LOG_CAPACITY {
            self.lines.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::INTERACT_RADIUS;

    const DT: f32 = 1.0 / 60.0;

    fn structure(kind: StructureKind, title: &str) -> Structure {
        Structure {
            kind,
            x: 0.0,
            y: 0.0,
            radius: INTERACT_RADIUS,
            title: title.to_string(),
            subtitle: String::new(),
        }
    }

    // ── Dispatch ──

    #[test]
    fn portal_gate_toggles_biome() {
        let s = structure(StructureKind::PortalGate, "Verdant Arch");
        assert_eq!(dispatch(&s), Effect::ToggleBiome);
        assert_eq!(Biome::Jungle.toggled(), Biome::City);
        assert_eq!(Biome::City.toggled(), Biome::Jungle);
    }

    #[test]
    fn monolith_logs_its_title() {
        let s = structure(StructureKind::Monolith, "Black Slab");
        match dispatch(&s) {
            Effect::Log(line) => assert_eq!(line, "Black Slab: lore archive synced."),
            other => panic!("expected Log, got {other:?}"),
        }
    }

    #[test]
    fn ruins_log_fixed_lines() {
        assert!(matches!(
            dispatch(&structure(StructureKind::RuinAlpha, "x")),
            Effect::Log(_)
        ));
        assert!(matches!(
            dispatch(&structure(StructureKind::RuinBeta, "x")),
            Effect::Log(_)
        ));
    }

    #[test]
    fn log_dispatch_is_idempotent_to_repeats() {
        // Standing in range and hammering activate must never throw;
        // it just appends lines.
        let s = structure(StructureKind::Monolith, "Slab");
        let mut log = EventLog::default();
        for _ in 0..10 {
            if let Effect::Log(line) = dispatch(&s) {
                log.push(line);
            }
        }
        assert_eq!(log.len(), 10);
    }

    // ── Wipe ──

    #[test]
    fn wipe_runs_exactly_to_duration() {
        let mut wipe = WipeTransition::default();
        assert!(wipe.begin());
        let mut calls = 0;
        loop {
            calls += 1;
            assert!(calls < 100, "wipe never completed");
            if wipe.advance(DT) {
                break;
            }
        }
        // 0.8 s at 60 Hz: completion on the 48th tick, give or take one
        // tick of float rounding in the accumulator.
        let elapsed = calls as f32 * DT;
        assert!((elapsed - WIPE_SECONDS).abs() <= DT, "completed after {elapsed} s");
        assert_eq!(wipe.t, 1.0);
        assert!(!wipe.active);
    }

    #[test]
    fn retrigger_during_wipe_neither_restarts_nor_stacks() {
        let mut wipe = WipeTransition::default();
        assert!(wipe.begin());
        for _ in 0..24 {
            assert!(!wipe.advance(DT));
        }
        let halfway = wipe.t;
        assert!(!wipe.begin(), "second trigger must be a no-op");
        assert_eq!(wipe.t, halfway, "second trigger must not rewind progress");

        // Completes once, on the original schedule.
        let mut completions = 0;
        for _ in 0..48 {
            if wipe.advance(DT) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
    }

    #[test]
    fn progress_clamps_at_one() {
        let mut wipe = WipeTransition::default();
        wipe.begin();
        // One oversized (already-clamped-by-engine) step.
        wipe.advance(0.04);
        for _ in 0..60 {
            wipe.advance(0.04);
        }
        assert!(wipe.t <= 1.0);
    }

    #[test]
    fn idle_wipe_does_not_advance() {
        let mut wipe = WipeTransition::default();
        assert!(!wipe.advance(DT));
        assert_eq!(wipe.t, 0.0);
    }

    // ── Log ──

    #[test]
    fn log_drops_oldest_past_capacity() {
        let mut log = EventLog::default();
        for i in 0..40 {
            log.push(format!("line {i}"));
        }
        assert_eq!(log.len(), EVENT_LOG_CAPACITY);
        assert_eq!(log.iter().next(), Some("line 8"));
        assert_eq!(log.last(), Some("line 39"));
    }
}
