//! Rhythm-based level generation for the lane-grid quiz runner.
//!
//! Player-forced actions (lane changes, vertical moves, answer gates, rests)
//! are treated as beats with a run-up, an action window and a recovery. The
//! generator packs them into segments under a rising difficulty budget; the
//! level manager flattens segments into a spawn queue that the game loop
//! drains once per frame through `RhythmService`.

pub mod actions;
mod config;
mod error;
pub mod game;
mod generator;
pub mod grid;
mod level_manager;
pub mod occupancy;
mod questions;
mod rng;
mod service;
pub mod session;

pub use config::{DuePolicy, GameConfig, GeneratorConfig, LevelManagerConfig, RhythmServiceConfig};
pub use error::{RhythmError, RhythmErrorKind};
pub use game::{GameStage, GameStore};
pub use generator::{GeneratorState, RhythmLevelGenerator};
pub use level_manager::{LevelDebugInfo, LevelManager, SegmentSummary, UpcomingEvent};
pub use questions::{question_errors, validate_questions};
pub use rng::SeededRng;
pub use service::{RhythmDebugInfo, RhythmService};
pub use session::{Outcome, PlaySession};
