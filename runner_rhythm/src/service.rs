use log::info;
use runner_schema::{
    AnswerGateSpawnData, LevelEventPayload, ObstacleSpawnData, PlayerPerformance, Question, Seconds, SpawnEvent,
};
use serde::Serialize;

use crate::level_manager::{LevelDebugInfo, LevelManager};
use crate::{RhythmError, RhythmServiceConfig};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RhythmDebugInfo {
    pub is_active: bool,
    pub last_update_time: Seconds,
    pub level: LevelDebugInfo,
}

/// Game-loop façade over one session's `LevelManager`.
#[derive(Debug, Clone)]
pub struct RhythmService {
    config: RhythmServiceConfig,
    manager: LevelManager,
    is_active: bool,
    last_update_time: Seconds,
}

impl RhythmService {
    pub fn new(config: RhythmServiceConfig, questions: Vec<Question>) -> Result<Self, RhythmError> {
        config.validate()?;
        let manager = LevelManager::new(config.level.clone(), questions, config.seed)?;
        Ok(Self {
            config,
            manager,
            is_active: false,
            last_update_time: 0.0,
        })
    }

    pub fn start(&mut self) {
        info!("rhythm service started");
        self.is_active = true;
        self.last_update_time = 0.0;
    }

    /// Suppresses emission; generation state is kept.
    pub fn stop(&mut self) {
        info!("rhythm service stopped at {:.2}s", self.last_update_time);
        self.is_active = false;
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn reset(&mut self) {
        info!("rhythm service reset");
        self.manager.reset();
        self.last_update_time = 0.0;
    }

    /// Spawn events due at `game_time`. Call once per frame.
    pub fn update(&mut self, game_time: Seconds) -> Vec<SpawnEvent> {
        if !self.is_active {
            return Vec::new();
        }
        self.last_update_time = game_time;
        self.manager
            .update(game_time)
            .into_iter()
            .filter_map(SpawnEvent::from_level_event)
            .collect()
    }

    pub fn report_player_performance(&mut self, performance: PlayerPerformance) {
        self.manager.on_player_performance(performance);
    }

    pub fn next_answer_gate(&self) -> Option<&AnswerGateSpawnData> {
        self.manager
            .upcoming_events(self.config.answer_gate_lookahead)
            .into_iter()
            .find_map(|e| match &e.payload {
                LevelEventPayload::AnswerGate(data) => Some(data),
                _ => None,
            })
    }

    pub fn upcoming_obstacles(&self, look_ahead: Seconds) -> Vec<&ObstacleSpawnData> {
        self.manager
            .upcoming_events(look_ahead)
            .into_iter()
            .filter_map(|e| match &e.payload {
                LevelEventPayload::Obstacle(data) => Some(data),
                _ => None,
            })
            .collect()
    }

    pub fn is_ready_for_answer_gates(&self) -> bool {
        self.is_active && self.next_answer_gate().is_some()
    }

    pub fn level_manager(&self) -> &LevelManager {
        &self.manager
    }

    pub fn debug_info(&self) -> RhythmDebugInfo {
        RhythmDebugInfo {
            is_active: self.is_active,
            last_update_time: self.last_update_time,
            level: self.manager.debug_info(),
        }
    }
}
