use std::collections::VecDeque;

use log::{debug, warn};
use runner_schema::{
    ActionType, AnswerGateSpawnData, LevelEvent, LevelEventKind, LevelEventPayload, LevelSegment, ObstacleMetadata,
    ObstacleShape, ObstacleSpawnData, PlayerPerformance, Question, RhythmNote, Seconds, SegmentType,
};
use serde::Serialize;

use crate::generator::{GeneratorState, RhythmLevelGenerator};
use crate::rng::SeededRng;
use crate::{LevelManagerConfig, RhythmError};

/// Separates the speed-jitter stream from the generator's stream.
const SPEED_STREAM: u32 = 0x9E37_79B9;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SegmentSummary {
    pub id: String,
    pub segment_type: SegmentType,
    pub actual_difficulty: f64,
    pub difficulty_budget: f64,
    pub notes_count: usize,
}

impl SegmentSummary {
    /// `"actual/budget"`, e.g. `"4/5.2"`.
    pub fn difficulty(&self) -> String {
        format!("{}/{:.1}", self.actual_difficulty, self.difficulty_budget)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpcomingEvent {
    pub id: String,
    pub kind: LevelEventKind,
    pub spawn_time: Seconds,
    pub time_until_spawn: Seconds,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LevelDebugInfo {
    pub current_game_time: Seconds,
    pub segments_generated: usize,
    pub events_queued: usize,
    pub events_dropped: u64,
    pub current_segment: Option<SegmentSummary>,
    pub upcoming_events: Vec<UpcomingEvent>,
    pub generator_state: GeneratorState,
}

/// Rolling window of generated segments flattened into a time-ordered event
/// queue. `update` hands out the events that are due and forgets the rest of
/// the past.
#[derive(Debug, Clone)]
pub struct LevelManager {
    config: LevelManagerConfig,
    generator: RhythmLevelGenerator,
    speed_rng: SeededRng,
    seed: u32,
    segments: VecDeque<LevelSegment>,
    events: VecDeque<LevelEvent>,
    current_game_time: Seconds,
    dropped_events: u64,
    last_performance: Option<PlayerPerformance>,
}

impl LevelManager {
    pub fn new(config: LevelManagerConfig, questions: Vec<Question>, seed: u32) -> Result<Self, RhythmError> {
        config.validate()?;
        let generator = RhythmLevelGenerator::new(config.generator.clone(), questions, seed)?;

        let mut manager = Self {
            speed_rng: SeededRng::new(seed ^ SPEED_STREAM),
            seed,
            generator,
            segments: VecDeque::new(),
            events: VecDeque::new(),
            current_game_time: 0.0,
            dropped_events: 0,
            last_performance: None,
            config,
        };
        manager.fill_segment_buffer();
        Ok(manager)
    }

    pub fn config(&self) -> &LevelManagerConfig {
        &self.config
    }

    pub fn generator(&self) -> &RhythmLevelGenerator {
        &self.generator
    }

    /// Advances to `game_time` and returns the events due now, in spawn order.
    ///
    /// `game_time` must not decrease between calls.
    pub fn update(&mut self, game_time: Seconds) -> Vec<LevelEvent> {
        self.current_game_time = game_time;
        self.ensure_segment_buffer();

        let policy = self.config.due_policy;
        let mut due = Vec::new();
        let mut dropped = 0u64;
        while let Some(front) = self.events.front() {
            if front.spawn_time > game_time {
                break;
            }
            let Some(event) = self.events.pop_front() else {
                break;
            };
            if policy.is_due(event.spawn_time, game_time) {
                due.push(event);
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            self.dropped_events += dropped;
            warn!(
                "{dropped} event(s) fell outside the due window at {game_time:.3}s; update cadence is too slow"
            );
        }
        due
    }

    fn ensure_segment_buffer(&mut self) {
        let horizon = self.current_game_time - self.config.eviction_slack;
        while self.segments.front().is_some_and(|s| s.end_time <= horizon) {
            self.segments.pop_front();
        }
        self.fill_segment_buffer();
    }

    fn fill_segment_buffer(&mut self) {
        while self.segments.len() < self.config.segment_lookahead {
            let segment = self.generator.generate_next_segment();
            self.enqueue_segment(&segment);
            self.segments.push_back(segment);
        }
    }

    fn enqueue_segment(&mut self, segment: &LevelSegment) {
        let before = self.events.len();
        for note in &segment.notes {
            let event = match note.action_type {
                ActionType::Rest => continue,
                ActionType::AnswerGate => self.answer_gate_event(note),
                _ => Some(self.obstacle_event(note)),
            };
            if let Some(event) = event {
                self.insert_event(event);
            }
        }
        debug!("{} queued {} event(s)", segment.id, self.events.len() - before);
    }

    /// Keeps the queue sorted by spawn time; equal times keep insertion order.
    fn insert_event(&mut self, event: LevelEvent) {
        let at = self.events.partition_point(|e| e.spawn_time <= event.spawn_time);
        self.events.insert(at, event);
    }

    fn jittered_speed(&mut self, base: f64) -> f64 {
        let jitter = self.config.speed_jitter;
        if jitter == 0.0 {
            return base;
        }
        base * (1.0 + jitter * (2.0 * self.speed_rng.next() - 1.0))
    }

    fn answer_gate_event(&mut self, note: &RhythmNote) -> Option<LevelEvent> {
        let (Some(question), Some(answer_mapping)) = (&note.question, &note.answer_mapping) else {
            warn!("answer gate note {} carries no question; skipped", note.id);
            return None;
        };
        let speed = self.jittered_speed(self.config.answer_gate_speed);

        Some(LevelEvent {
            id: note.id.clone(),
            spawn_time: note.start_time,
            payload: LevelEventPayload::AnswerGate(AnswerGateSpawnData {
                id: note.id.clone(),
                question: question.clone(),
                answer_mapping: answer_mapping.clone(),
                spawn_time: note.start_time,
                speed,
                run_up_duration: note.run_up_duration,
                action_duration: note.action_duration,
            }),
        })
    }

    fn obstacle_event(&mut self, note: &RhythmNote) -> LevelEvent {
        let speed = self.jittered_speed(self.config.obstacle_speed);

        LevelEvent {
            id: note.id.clone(),
            spawn_time: note.start_time,
            payload: LevelEventPayload::Obstacle(ObstacleSpawnData {
                id: note.id.clone(),
                shape: ObstacleShape::for_action(note.action_type),
                lanes: note.obstacle_lanes.clone(),
                spawn_time: note.start_time,
                speed,
                metadata: ObstacleMetadata {
                    action_type: note.action_type,
                    is_forced: true,
                },
            }),
        }
    }

    /// Recorded for future difficulty adaptation; has no effect on generation.
    pub fn on_player_performance(&mut self, performance: PlayerPerformance) {
        self.last_performance = Some(performance);
    }

    pub fn last_performance(&self) -> Option<PlayerPerformance> {
        self.last_performance
    }

    pub fn current_segment(&self) -> Option<&LevelSegment> {
        let t = self.current_game_time;
        self.segments.iter().find(|s| s.start_time <= t && s.end_time > t)
    }

    pub fn segments(&self) -> impl Iterator<Item = &LevelSegment> {
        self.segments.iter()
    }

    /// Queued events spawning in `(now, now + look_ahead]`.
    pub fn upcoming_events(&self, look_ahead: Seconds) -> Vec<&LevelEvent> {
        let now = self.current_game_time;
        self.events
            .iter()
            .filter(|e| e.spawn_time > now && e.spawn_time <= now + look_ahead)
            .collect()
    }

    pub fn current_game_time(&self) -> Seconds {
        self.current_game_time
    }

    pub fn queued_event_count(&self) -> usize {
        self.events.len()
    }

    /// Events that were past due but outside the window, over the session.
    pub fn dropped_event_count(&self) -> u64 {
        self.dropped_events
    }

    pub fn reset(&mut self) {
        self.generator.reset();
        self.speed_rng = SeededRng::new(self.seed ^ SPEED_STREAM);
        self.segments.clear();
        self.events.clear();
        self.current_game_time = 0.0;
        self.dropped_events = 0;
        self.last_performance = None;
        self.fill_segment_buffer();
    }

    pub fn debug_info(&self) -> LevelDebugInfo {
        let now = self.current_game_time;
        LevelDebugInfo {
            current_game_time: now,
            segments_generated: self.segments.len(),
            events_queued: self.events.len(),
            events_dropped: self.dropped_events,
            current_segment: self.current_segment().map(|s| SegmentSummary {
                id: s.id.clone(),
                segment_type: s.segment_type,
                actual_difficulty: s.actual_difficulty,
                difficulty_budget: s.difficulty_budget,
                notes_count: s.notes.len(),
            }),
            upcoming_events: self
                .upcoming_events(10.0)
                .into_iter()
                .map(|e| UpcomingEvent {
                    id: e.id.clone(),
                    kind: e.kind(),
                    spawn_time: e.spawn_time,
                    time_until_spawn: e.spawn_time - now,
                })
                .collect(),
            generator_state: self.generator.state(),
        }
    }
}
