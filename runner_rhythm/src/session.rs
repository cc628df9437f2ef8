use runner_schema::{Question, Seconds, SpawnEvent};

use crate::game::{GameStage, GameStore};
use crate::service::RhythmService;
use crate::{GameConfig, RhythmError, RhythmServiceConfig};

/// Collision outcome reported back by the renderer/physics bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    ObstacleHit,
    AnswerHit { answer_id: String, is_correct: bool },
}

/// One play session: the game store plus the rhythm service it drives.
///
/// `tick` is the per-frame entry point. It advances the clock, pulls due
/// spawn events and periodically reports performance to the generator side.
#[derive(Debug, Clone)]
pub struct PlaySession {
    store: GameStore,
    rhythm: RhythmService,
    last_report_bucket: Option<u64>,
}

impl PlaySession {
    pub fn new(
        game: GameConfig,
        rhythm: RhythmServiceConfig,
        questions: Vec<Question>,
    ) -> Result<Self, RhythmError> {
        game.validate()?;
        Ok(Self {
            store: GameStore::new(game),
            rhythm: RhythmService::new(rhythm, questions)?,
            last_report_bucket: None,
        })
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GameStore {
        &mut self.store
    }

    pub fn rhythm(&self) -> &RhythmService {
        &self.rhythm
    }

    pub fn begin(&mut self) {
        if self.store.stage() == GameStage::Intro {
            self.store.set_stage(GameStage::Playing);
            self.rhythm.start();
        }
    }

    pub fn tick(&mut self, real_delta: Seconds) -> Vec<SpawnEvent> {
        let game_time = self.store.advance(real_delta);
        if self.store.stage() != GameStage::Playing {
            return Vec::new();
        }

        let events = self.rhythm.update(game_time);

        let interval = self.store.config().performance_report_interval;
        if interval > 0.0 {
            let bucket = (game_time / interval).floor() as u64;
            if self.last_report_bucket != Some(bucket) {
                self.last_report_bucket = Some(bucket);
                self.rhythm.report_player_performance(self.store.performance());
            }
        }
        events
    }

    pub fn report(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::ObstacleHit => self.store.on_obstacle_hit(),
            Outcome::AnswerHit { answer_id, is_correct } => self.store.on_answer_hit(answer_id, is_correct),
        }
        if self.store.stage() == GameStage::GameOver {
            self.rhythm.stop();
        }
    }

    /// Back to the intro with a fresh store and a rewound generator.
    pub fn restart(&mut self) {
        self.rhythm.stop();
        self.rhythm.reset();
        self.store.reset();
        self.last_report_bucket = None;
    }
}
