use log::debug;
use runner_schema::{
    ActionType, Answer, AnswerMapping, Lane, LevelSegment, Question, RhythmNote, Seconds, SegmentType,
    LANE_COUNT,
};
use serde::Serialize;

use crate::actions::{self, ActionDefinition};
use crate::grid::LaneMask;
use crate::occupancy::LaneOccupancy;
use crate::questions::validate_questions;
use crate::rng::SeededRng;
use crate::{GeneratorConfig, RhythmError};

/// Snapshot of the generator's session cursors.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GeneratorState {
    pub current_time: Seconds,
    pub current_difficulty_budget: f64,
    pub current_player_lane: Lane,
    pub current_question_index: usize,
    pub next_answer_gate_time: Seconds,
    pub segments_generated: u64,
    pub last_action: Option<ActionType>,
}

/// Produces `LevelSegment`s of rhythm notes for one play session.
///
/// Notes are packed into each segment while they fit the segment's difficulty
/// budget, respect each action's minimum recurrence gap and predecessor rules,
/// and never block a lane that holds a live answer. Answer gates are forced in
/// once the clock reaches `next_answer_gate_time`, consuming questions in order.
#[derive(Debug, Clone)]
pub struct RhythmLevelGenerator {
    config: GeneratorConfig,
    questions: Vec<Question>,
    seed: u32,
    rng: SeededRng,

    current_time: Seconds,
    difficulty_budget: f64,
    player_lane: Lane,
    question_index: usize,
    next_answer_gate_time: Seconds,
    segment_counter: u64,

    last_action_times: [Option<Seconds>; ActionType::COUNT],
    last_action: Option<ActionType>,
    occupancy: LaneOccupancy,
}

impl RhythmLevelGenerator {
    pub fn new(config: GeneratorConfig, questions: Vec<Question>, seed: u32) -> Result<Self, RhythmError> {
        config.validate()?;
        validate_questions(&questions)?;

        Ok(Self {
            current_time: 0.0,
            difficulty_budget: config.start_difficulty_budget,
            player_lane: config.start_lane,
            question_index: 0,
            next_answer_gate_time: config.first_answer_gate_time,
            segment_counter: 0,
            last_action_times: [None; ActionType::COUNT],
            last_action: None,
            occupancy: LaneOccupancy::default(),
            rng: SeededRng::new(seed),
            seed,
            questions,
            config,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn generate_next_segment(&mut self) -> LevelSegment {
        self.generate_segment(self.config.segment_duration)
    }

    pub fn generate_segment(&mut self, duration: Seconds) -> LevelSegment {
        let start = self.current_time;
        let mut segment = LevelSegment {
            id: format!("segment_{}", self.segment_counter),
            index: self.segment_counter,
            start_time: start,
            end_time: start + duration,
            notes: Vec::new(),
            segment_type: self.segment_type(),
            difficulty_budget: self.difficulty_budget,
            actual_difficulty: 0.0,
        };

        self.occupancy.prune(start);

        let mut offset = 0.0;
        while offset < duration {
            let time = start + offset;
            match self.next_note(time, &segment) {
                Some(note) => {
                    offset += note.total_duration();
                    segment.actual_difficulty += note.difficulty_weight;
                    self.record(&note);
                    segment.notes.push(note);
                }
                None => {
                    debug!("no eligible action at {time:.2}s, idling {}s", self.config.idle_step);
                    offset += self.config.idle_step;
                }
            }
        }

        self.current_time += duration;
        self.difficulty_budget =
            (self.difficulty_budget + self.config.difficulty_ramp_rate).min(self.config.max_difficulty_budget);
        self.segment_counter += 1;

        debug!(
            "{} ({}) {:.1}-{:.1}s: {} notes, difficulty {}/{:.1}",
            segment.id,
            segment.segment_type.as_str(),
            segment.start_time,
            segment.end_time,
            segment.notes.len(),
            segment.actual_difficulty,
            segment.difficulty_budget
        );

        segment
    }

    /// Rewinds every cursor, including the random stream, to the session start.
    pub fn reset(&mut self) {
        self.current_time = 0.0;
        self.difficulty_budget = self.config.start_difficulty_budget;
        self.player_lane = self.config.start_lane;
        self.question_index = 0;
        self.next_answer_gate_time = self.config.first_answer_gate_time;
        self.segment_counter = 0;
        self.last_action_times = [None; ActionType::COUNT];
        self.last_action = None;
        self.occupancy.clear();
        self.rng = SeededRng::new(self.seed);
    }

    pub fn state(&self) -> GeneratorState {
        GeneratorState {
            current_time: self.current_time,
            current_difficulty_budget: self.difficulty_budget,
            current_player_lane: self.player_lane,
            current_question_index: self.question_index,
            next_answer_gate_time: self.next_answer_gate_time,
            segments_generated: self.segment_counter,
            last_action: self.last_action,
        }
    }

    fn segment_type(&self) -> SegmentType {
        let n = self.segment_counter;
        if n % 4 == 3 {
            SegmentType::Rest
        } else if n % 6 == 5 {
            SegmentType::Bridge
        } else if n % 2 == 0 {
            SegmentType::Verse
        } else {
            SegmentType::Chorus
        }
    }

    fn questions_remaining(&self) -> bool {
        self.question_index < self.questions.len()
    }

    /// Budget kept free for a gate that falls due before the segment ends.
    fn gate_reserve(&self, segment: &LevelSegment) -> f64 {
        if self.questions_remaining() && self.next_answer_gate_time < segment.end_time {
            actions::ANSWER_GATE.difficulty_weight
        } else {
            0.0
        }
    }

    fn next_note(&mut self, time: Seconds, segment: &LevelSegment) -> Option<RhythmNote> {
        if time >= self.next_answer_gate_time && self.questions_remaining() {
            if self.gate_fits(time, segment) {
                return Some(self.answer_gate_note(time));
            }
            debug!("answer gate due at {time:.2}s deferred");
            return Some(self.action_note(ActionType::Rest, time));
        }

        let candidates = self.available_actions(time, segment);
        if candidates.is_empty() {
            return None;
        }
        let action = self.select_weighted(&candidates, segment.segment_type);
        Some(self.action_note(action, time))
    }

    /// A due gate is placed only when the segment budget can pay for it and
    /// enough lanes are free of live obstacles to hold every answer.
    fn gate_fits(&self, time: Seconds, segment: &LevelSegment) -> bool {
        let def = &actions::ANSWER_GATE;
        if segment.actual_difficulty + def.difficulty_weight > segment.difficulty_budget {
            return false;
        }
        let blocked = self.occupancy.blocked(time, time + def.min_run_up + def.action_duration);
        LANE_COUNT - blocked.len() >= self.questions[self.question_index].answers.len()
    }

    fn available_actions(&self, time: Seconds, segment: &LevelSegment) -> Vec<ActionType> {
        let headroom = segment.difficulty_budget - self.gate_reserve(segment) - segment.actual_difficulty;

        ActionType::ALL
            .into_iter()
            .filter(|&action| action != ActionType::AnswerGate)
            .filter(|&action| {
                let def = actions::definition(action);
                def.difficulty_weight <= headroom
                    && self.recurrence_allows(def, time)
                    && def.allows_predecessor(self.last_action)
                    && self.lanes_allow(def, time)
            })
            .collect()
    }

    fn recurrence_allows(&self, def: &ActionDefinition, time: Seconds) -> bool {
        match self.last_action_times[def.action_type.index()] {
            Some(last) => time - last >= def.min_time_between_same,
            None => true,
        }
    }

    fn lanes_allow(&self, def: &ActionDefinition, time: Seconds) -> bool {
        let blocked = LaneMask::from_lanes(&def.placement(self.player_lane).obstacle_lanes);
        if blocked.is_empty() {
            return true;
        }
        let live_until = time + def.max_run_up + def.action_duration;
        !self.occupancy.reserved_answers(time, live_until).intersects(blocked)
    }

    fn select_weighted(&mut self, candidates: &[ActionType], segment_type: SegmentType) -> ActionType {
        let weights: Vec<f64> = candidates
            .iter()
            .map(|&action| match segment_type {
                SegmentType::Verse => {
                    if action == ActionType::Rest {
                        0.3
                    } else {
                        1.0
                    }
                }
                SegmentType::Chorus => {
                    if self.last_action_times[action.index()].is_some() {
                        1.5
                    } else {
                        1.0
                    }
                }
                SegmentType::Bridge => actions::definition(action).difficulty_weight,
                SegmentType::Rest => {
                    if action == ActionType::Rest {
                        3.0
                    } else {
                        0.2
                    }
                }
            })
            .collect();

        let total: f64 = weights.iter().sum();
        let mut roll = self.rng.next() * total;
        for (action, weight) in candidates.iter().zip(&weights) {
            roll -= weight;
            if roll <= 0.0 {
                return *action;
            }
        }
        candidates[0]
    }

    fn action_note(&mut self, action: ActionType, time: Seconds) -> RhythmNote {
        let def = actions::definition(action);
        let run_up = self.rng.range(def.min_run_up, def.max_run_up);
        let placement = def.placement(self.player_lane);

        RhythmNote {
            id: format!("{}_{time:.3}", action.as_str()),
            action_type: action,
            start_time: time,
            run_up_duration: run_up,
            action_duration: def.action_duration,
            recovery_duration: def.recovery_duration,
            difficulty_weight: def.difficulty_weight,
            target_lanes: placement.target_lanes,
            obstacle_lanes: placement.obstacle_lanes,
            question: None,
            answer_mapping: None,
        }
    }

    fn answer_gate_note(&mut self, time: Seconds) -> RhythmNote {
        let def = &actions::ANSWER_GATE;
        let question = self.questions[self.question_index].clone();
        let live_until = time + def.min_run_up + def.action_duration;
        let answer_mapping = self.answer_mapping(&question.answers, time, live_until);

        self.next_answer_gate_time =
            time + self.config.answer_gate_interval + self.rng.next() * self.config.answer_gate_jitter;
        self.question_index += 1;

        debug!(
            "answer gate for {} at {time:.2}s, next due at {:.2}s",
            question.id, self.next_answer_gate_time
        );

        RhythmNote {
            id: format!("answer_gate_{time:.3}"),
            action_type: ActionType::AnswerGate,
            start_time: time,
            run_up_duration: def.min_run_up,
            action_duration: def.action_duration,
            recovery_duration: def.recovery_duration,
            difficulty_weight: def.difficulty_weight,
            target_lanes: Vec::new(),
            obstacle_lanes: Vec::new(),
            question: Some(question),
            answer_mapping: Some(answer_mapping),
        }
    }

    /// Answers go to shuffled slots, preferring lanes no live obstacle blocks.
    fn answer_mapping(&mut self, answers: &[Answer], from: Seconds, until: Seconds) -> AnswerMapping {
        let blocked = self.occupancy.blocked(from, until);
        let slots: Vec<Lane> = (0..LANE_COUNT as Lane).collect();
        let (mut order, taken): (Vec<Lane>, Vec<Lane>) =
            self.rng.shuffle(&slots).into_iter().partition(|&lane| !blocked.contains(lane));
        order.extend(taken);

        let mut mapping: AnswerMapping = std::array::from_fn(|_| None);
        for (answer, &lane) in answers.iter().zip(&order) {
            mapping[lane as usize] = Some(answer.clone());
        }
        mapping
    }

    fn record(&mut self, note: &RhythmNote) {
        let action = note.action_type;
        self.last_action_times[action.index()] = Some(note.start_time);
        self.last_action = Some(action);

        let live_until = note.start_time + note.run_up_duration + note.action_duration;
        match (action, &note.answer_mapping) {
            (ActionType::AnswerGate, Some(mapping)) => {
                let lanes = mapping
                    .iter()
                    .enumerate()
                    .filter(|(_, slot)| slot.is_some())
                    .fold(LaneMask::EMPTY, |mask, (lane, _)| mask.with(lane as Lane));
                self.occupancy.reserve_answers(lanes, note.start_time, live_until);
            }
            _ if action.is_movement() => {
                self.occupancy
                    .block(LaneMask::from_lanes(&note.obstacle_lanes), note.start_time, live_until);
                if let Some(&lane) = note.target_lanes.first() {
                    self.player_lane = lane;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_grid_question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            question: "?".to_string(),
            sources: Vec::new(),
            answers: (0..LANE_COUNT)
                .map(|i| Answer {
                    id: format!("{id}-{i}"),
                    label: i.to_string(),
                    is_correct: i == 0,
                })
                .collect(),
        }
    }

    #[test]
    fn blocked_lanes_push_a_due_gate_back_with_rests() {
        let config = GeneratorConfig {
            first_answer_gate_time: 0.0,
            ..GeneratorConfig::default()
        };
        let mut gen = RhythmLevelGenerator::new(config, vec![full_grid_question("q")], 3).unwrap();
        gen.occupancy.block(LaneMask::from_lanes(&[4]), 0.0, 3.0);

        let first = gen.generate_segment(1.0);
        assert_eq!(first.notes.len(), 1);
        assert_eq!(first.notes[0].action_type, ActionType::Rest);
        assert_eq!(first.notes[0].start_time, 0.0);
        assert_eq!(gen.state().current_question_index, 0);
        assert_eq!(gen.state().next_answer_gate_time, 0.0);

        let second = gen.generate_next_segment();
        let kinds: Vec<(ActionType, Seconds)> = second.notes.iter().map(|n| (n.action_type, n.start_time)).collect();
        assert_eq!(
            kinds[..3],
            [
                (ActionType::Rest, 1.0),
                (ActionType::Rest, 2.5),
                (ActionType::AnswerGate, 4.0),
            ]
        );
        let gate = &second.notes[2];
        assert_eq!(gate.question.as_ref().map(|q| q.id.as_str()), Some("q"));
        assert!(gate.answer_mapping.as_ref().is_some_and(|m| m.iter().all(Option::is_some)));
        assert_eq!(gen.state().current_question_index, 1);
    }

    #[test]
    fn spent_budget_holds_a_due_gate_until_the_next_segment() {
        let config = GeneratorConfig {
            segment_duration: 30.0,
            first_answer_gate_time: 0.0,
            answer_gate_interval: 15.0,
            answer_gate_jitter: 0.0,
            ..GeneratorConfig::default()
        };
        let questions = vec![full_grid_question("a"), full_grid_question("b")];
        let mut gen = RhythmLevelGenerator::new(config, questions, 5).unwrap();

        let first = gen.generate_next_segment();
        let gates: Vec<&RhythmNote> = first
            .notes
            .iter()
            .filter(|n| n.action_type == ActionType::AnswerGate)
            .collect();
        assert_eq!(gates.len(), 1);
        assert_eq!(gates[0].start_time, 0.0);
        assert!(first.actual_difficulty <= first.difficulty_budget);

        let after_due: Vec<&RhythmNote> = first.notes.iter().filter(|n| n.start_time >= 15.0).collect();
        assert!(!after_due.is_empty());
        assert!(after_due.iter().all(|n| n.action_type == ActionType::Rest));
        assert_eq!(gen.state().current_question_index, 1);

        let second = gen.generate_next_segment();
        assert_eq!(second.notes[0].action_type, ActionType::AnswerGate);
        assert_eq!(second.notes[0].start_time, 30.0);
        assert_eq!(second.notes[0].question.as_ref().map(|q| q.id.as_str()), Some("b"));
        assert_eq!(gen.state().current_question_index, 2);
    }
}
