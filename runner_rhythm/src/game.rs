//! Session-wide game state the rhythm system reads from and reports into:
//! stage, game clock and its time multiplier (slow-mo), health, streak and
//! the answer/obstacle tallies behind `PlayerPerformance`.

use log::info;
use runner_schema::{PlayerPerformance, Seconds};
use serde::{Deserialize, Serialize};

use crate::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStage {
    Intro,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerHit {
    pub answer_id: String,
    pub is_correct: bool,
    pub game_time: Seconds,
}

#[derive(Debug, Clone)]
pub struct GameStore {
    config: GameConfig,
    stage: GameStage,
    game_time: Seconds,
    time_multiplier: f64,
    /// Real seconds since slow-mo was triggered.
    slow_mo_elapsed: Option<Seconds>,
    health: u32,
    streak: u32,
    question_index: usize,
    answers_hit: Vec<AnswerHit>,
    obstacle_hits: u32,
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameStore {
    pub fn new(config: GameConfig) -> Self {
        Self {
            stage: GameStage::Intro,
            game_time: 0.0,
            time_multiplier: 1.0,
            slow_mo_elapsed: None,
            health: config.max_health,
            streak: 0,
            question_index: 0,
            answers_hit: Vec::new(),
            obstacle_hits: 0,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn stage(&self) -> GameStage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: GameStage) {
        if self.stage != stage {
            info!("stage {:?} -> {:?}", self.stage, stage);
            self.stage = stage;
        }
    }

    pub fn game_time(&self) -> Seconds {
        self.game_time
    }

    pub fn time_multiplier(&self) -> f64 {
        self.time_multiplier
    }

    pub fn is_slow_mo(&self) -> bool {
        self.slow_mo_elapsed.is_some()
    }

    /// Real seconds left on the slow-mo bar; full when idle.
    pub fn slow_mo_time_remaining(&self) -> Seconds {
        match self.slow_mo_elapsed {
            Some(elapsed) => (self.config.slow_mo_duration - elapsed).max(0.0),
            None => self.config.slow_mo_duration,
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn answers_hit(&self) -> &[AnswerHit] {
        &self.answers_hit
    }

    /// Advances slow-mo by `real_delta` and, while playing, the game clock by
    /// `real_delta * time_multiplier`. Returns the game time.
    pub fn advance(&mut self, real_delta: Seconds) -> Seconds {
        let real_delta = real_delta.max(0.0);
        self.tick_slow_mo(real_delta);
        if self.stage == GameStage::Playing {
            self.game_time += real_delta * self.time_multiplier;
        }
        self.game_time
    }

    /// Starts a slow-mo cycle. No-op (returns false) while one is running.
    pub fn go_slow_mo(&mut self) -> bool {
        if self.slow_mo_elapsed.is_some() {
            return false;
        }
        info!("slow-mo at {:.2}s", self.game_time);
        self.slow_mo_elapsed = Some(0.0);
        true
    }

    fn tick_slow_mo(&mut self, real_delta: Seconds) {
        let Some(elapsed) = self.slow_mo_elapsed else {
            return;
        };
        let elapsed = elapsed + real_delta;
        let GameConfig {
            slow_mo_duration: hold,
            slow_mo_multiplier: floor,
            slow_mo_ease: ease,
            ..
        } = self.config;

        if elapsed >= hold + ease {
            self.slow_mo_elapsed = None;
            self.time_multiplier = 1.0;
            return;
        }

        self.slow_mo_elapsed = Some(elapsed);
        self.time_multiplier = if elapsed < ease {
            // quadratic ease-out toward the floor
            let p = elapsed / ease;
            1.0 + (floor - 1.0) * (1.0 - (1.0 - p) * (1.0 - p))
        } else if elapsed < hold {
            floor
        } else {
            // quadratic ease-in back to normal speed
            let p = (elapsed - hold) / ease;
            floor + (1.0 - floor) * p * p
        };
    }

    pub fn on_obstacle_hit(&mut self) {
        self.obstacle_hits += 1;
        self.damage();
    }

    pub fn on_answer_hit(&mut self, answer_id: impl Into<String>, is_correct: bool) {
        self.answers_hit.push(AnswerHit {
            answer_id: answer_id.into(),
            is_correct,
            game_time: self.game_time,
        });
        self.question_index += 1;

        if is_correct {
            self.streak += 1;
            self.health = (self.health + 1).min(self.config.max_health);
        } else {
            self.streak = 0;
            self.damage();
        }
    }

    fn damage(&mut self) {
        self.health = self.health.saturating_sub(1);
        if self.health == 0 && self.stage == GameStage::Playing {
            self.set_stage(GameStage::GameOver);
        }
    }

    pub fn performance(&self) -> PlayerPerformance {
        let correct = self.answers_hit.iter().filter(|h| h.is_correct).count() as u32;
        PlayerPerformance {
            correct_answers: correct,
            incorrect_answers: self.answers_hit.len() as u32 - correct,
            obstacle_hits: self.obstacle_hits,
            current_streak: self.streak,
        }
    }

    /// Back to a fresh intro state.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }
}
