use runner_schema::{Lane, Seconds, LANE_COUNT};
use serde::{Deserialize, Serialize};

use crate::actions;
use crate::grid::CENTER_LANE;
use crate::RhythmError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub segment_duration: Seconds,
    pub start_difficulty_budget: f64,
    pub max_difficulty_budget: f64,
    /// Budget increase applied after every segment.
    pub difficulty_ramp_rate: f64,
    pub first_answer_gate_time: Seconds,
    pub answer_gate_interval: Seconds,
    pub answer_gate_jitter: Seconds,
    /// Cursor advance when no action is eligible.
    pub idle_step: Seconds,
    pub start_lane: Lane,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            segment_duration: 8.0,
            start_difficulty_budget: 5.0,
            max_difficulty_budget: 15.0,
            difficulty_ramp_rate: 0.1,
            first_answer_gate_time: 15.0,
            answer_gate_interval: 15.0,
            answer_gate_jitter: 5.0,
            idle_step: 1.0,
            start_lane: CENTER_LANE,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), RhythmError> {
        if !(self.segment_duration > 0.0 && self.segment_duration.is_finite()) {
            return Err(RhythmError::new("E1001", "segment_duration must be finite and > 0")
                .with_field("segment_duration"));
        }
        if !(self.idle_step > 0.0 && self.idle_step.is_finite()) {
            return Err(RhythmError::new("E1001", "idle_step must be finite and > 0").with_field("idle_step"));
        }
        if !(self.start_difficulty_budget >= 0.0) {
            return Err(RhythmError::new("E1003", "start_difficulty_budget must be >= 0")
                .with_field("start_difficulty_budget"));
        }
        if !(self.max_difficulty_budget >= self.start_difficulty_budget) {
            return Err(RhythmError::new(
                "E1003",
                "max_difficulty_budget must be >= start_difficulty_budget",
            )
            .with_field("max_difficulty_budget"));
        }
        if !(self.difficulty_ramp_rate >= 0.0) {
            return Err(RhythmError::new("E1003", "difficulty_ramp_rate must be >= 0")
                .with_field("difficulty_ramp_rate"));
        }
        if self.start_difficulty_budget < actions::ANSWER_GATE.difficulty_weight {
            return Err(RhythmError::new(
                "E1004",
                format!(
                    "start_difficulty_budget {} cannot fit an answer gate (weight {})",
                    self.start_difficulty_budget,
                    actions::ANSWER_GATE.difficulty_weight
                ),
            )
            .with_field("start_difficulty_budget"));
        }
        if !(self.first_answer_gate_time >= 0.0 && self.first_answer_gate_time.is_finite()) {
            return Err(RhythmError::new("E1006", "first_answer_gate_time must be finite and >= 0")
                .with_field("first_answer_gate_time"));
        }
        if !(self.answer_gate_interval >= actions::ANSWER_GATE.min_time_between_same
            && self.answer_gate_interval.is_finite())
        {
            return Err(RhythmError::new(
                "E1006",
                format!(
                    "answer_gate_interval must be finite and >= {}",
                    actions::ANSWER_GATE.min_time_between_same
                ),
            )
            .with_field("answer_gate_interval"));
        }
        if !(self.answer_gate_jitter >= 0.0 && self.answer_gate_jitter.is_finite()) {
            return Err(RhythmError::new("E1006", "answer_gate_jitter must be finite and >= 0")
                .with_field("answer_gate_jitter"));
        }
        if self.start_lane as usize >= LANE_COUNT {
            return Err(RhythmError::new("E1003", "start_lane must be a grid lane (0..9)")
                .with_field("start_lane"));
        }
        Ok(())
    }
}

/// How `LevelManager::update` decides an event is due.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DuePolicy {
    /// Due when `now - width < spawn_time <= now`. Anything older is dropped.
    Window { width: Seconds },
    /// Due when `spawn_time <= now`; nothing is ever dropped.
    CatchUp,
}

impl Default for DuePolicy {
    fn default() -> Self {
        DuePolicy::Window { width: 0.1 }
    }
}

impl DuePolicy {
    pub fn is_due(&self, spawn_time: Seconds, now: Seconds) -> bool {
        match *self {
            DuePolicy::Window { width } => spawn_time <= now && spawn_time > now - width,
            DuePolicy::CatchUp => spawn_time <= now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LevelManagerConfig {
    pub segment_lookahead: usize,
    /// Segments are evicted once their end is this far behind the clock.
    pub eviction_slack: Seconds,
    pub due_policy: DuePolicy,
    pub obstacle_speed: f64,
    pub answer_gate_speed: f64,
    /// Relative speed variation, `speed * (1 ± jitter)`.
    pub speed_jitter: f64,
    pub generator: GeneratorConfig,
}

impl Default for LevelManagerConfig {
    fn default() -> Self {
        Self {
            segment_lookahead: 3,
            eviction_slack: 10.0,
            due_policy: DuePolicy::default(),
            obstacle_speed: 12.0,
            answer_gate_speed: 5.5,
            speed_jitter: 0.0,
            generator: GeneratorConfig::default(),
        }
    }
}

impl LevelManagerConfig {
    pub fn validate(&self) -> Result<(), RhythmError> {
        if self.segment_lookahead == 0 {
            return Err(RhythmError::new("E1002", "segment_lookahead must be >= 1")
                .with_field("segment_lookahead"));
        }
        if !(self.eviction_slack >= 0.0) {
            return Err(RhythmError::new("E1005", "eviction_slack must be >= 0")
                .with_field("eviction_slack"));
        }
        if let DuePolicy::Window { width } = self.due_policy {
            if !(width > 0.0) {
                return Err(RhythmError::new("E1005", "due window width must be > 0")
                    .with_field("due_policy"));
            }
        }
        if !(self.obstacle_speed > 0.0) || !(self.answer_gate_speed > 0.0) {
            return Err(RhythmError::new("E1007", "spawn speeds must be > 0")
                .with_field("obstacle_speed"));
        }
        if !(0.0..1.0).contains(&self.speed_jitter) {
            return Err(RhythmError::new("E1007", "speed_jitter must be in [0, 1)")
                .with_field("speed_jitter"));
        }
        self.generator.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RhythmServiceConfig {
    pub seed: u32,
    /// How far ahead `next_answer_gate` looks.
    pub answer_gate_lookahead: Seconds,
    pub level: LevelManagerConfig,
}

impl Default for RhythmServiceConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            answer_gate_lookahead: 20.0,
            level: LevelManagerConfig::default(),
        }
    }
}

impl RhythmServiceConfig {
    pub fn validate(&self) -> Result<(), RhythmError> {
        if !(self.answer_gate_lookahead > 0.0) {
            return Err(RhythmError::new("E1005", "answer_gate_lookahead must be > 0")
                .with_field("answer_gate_lookahead"));
        }
        self.level.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub max_health: u32,
    pub slow_mo_duration: Seconds,
    pub slow_mo_multiplier: f64,
    pub slow_mo_ease: Seconds,
    pub performance_report_interval: Seconds,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_health: 10,
            slow_mo_duration: 4.0,
            slow_mo_multiplier: 0.08,
            slow_mo_ease: 0.4,
            performance_report_interval: 5.0,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), RhythmError> {
        if self.max_health == 0 {
            return Err(RhythmError::new("E1008", "max_health must be >= 1").with_field("max_health"));
        }
        if !(self.slow_mo_multiplier > 0.0 && self.slow_mo_multiplier <= 1.0) {
            return Err(RhythmError::new("E1008", "slow_mo_multiplier must be in (0, 1]")
                .with_field("slow_mo_multiplier"));
        }
        if !(self.slow_mo_ease >= 0.0 && self.slow_mo_ease.is_finite()) {
            return Err(RhythmError::new("E1008", "slow_mo_ease must be finite and >= 0")
                .with_field("slow_mo_ease"));
        }
        // the ease-in starts at `slow_mo_duration`, after the ease-out ends
        if !(self.slow_mo_duration >= self.slow_mo_ease && self.slow_mo_duration.is_finite()) {
            return Err(RhythmError::new("E1008", "slow_mo_duration must be finite and >= slow_mo_ease")
                .with_field("slow_mo_duration"));
        }
        if !(self.performance_report_interval >= 0.0 && self.performance_report_interval.is_finite()) {
            return Err(RhythmError::new("E1008", "performance_report_interval must be finite and >= 0")
                .with_field("performance_report_interval"));
        }
        Ok(())
    }
}
