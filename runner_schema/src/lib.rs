use serde::{Deserialize, Serialize};

pub type Seconds = f64;

/// Row-major index into the 3x3 lane grid (`y * GRID_WIDTH + x`).
pub type Lane = u8;

pub const GRID_WIDTH: u8 = 3;
pub const GRID_HEIGHT: u8 = 3;
pub const LANE_COUNT: usize = (GRID_WIDTH as usize) * (GRID_HEIGHT as usize);

pub type AnswerMapping = [Option<Answer>; LANE_COUNT];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub id: String,
    pub label: String,
    #[serde(alias = "isCorrect")]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    pub url: String,
    #[serde(default)]
    pub passage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    pub answers: Vec<Answer>,
}

impl Question {
    pub fn correct_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|a| a.is_correct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    LaneChangeLeft,
    LaneChangeRight,
    MoveUp,
    MoveDown,
    AnswerGate,
    Rest,
}

impl ActionType {
    pub const COUNT: usize = 6;

    pub const ALL: [ActionType; Self::COUNT] = [
        ActionType::LaneChangeLeft,
        ActionType::LaneChangeRight,
        ActionType::MoveUp,
        ActionType::MoveDown,
        ActionType::AnswerGate,
        ActionType::Rest,
    ];

    pub fn index(self) -> usize {
        match self {
            ActionType::LaneChangeLeft => 0,
            ActionType::LaneChangeRight => 1,
            ActionType::MoveUp => 2,
            ActionType::MoveDown => 3,
            ActionType::AnswerGate => 4,
            ActionType::Rest => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::LaneChangeLeft => "LANE_CHANGE_LEFT",
            ActionType::LaneChangeRight => "LANE_CHANGE_RIGHT",
            ActionType::MoveUp => "MOVE_UP",
            ActionType::MoveDown => "MOVE_DOWN",
            ActionType::AnswerGate => "ANSWER_GATE",
            ActionType::Rest => "REST",
        }
    }

    /// Lane changes and vertical moves: the actions that relocate the player.
    pub fn is_movement(self) -> bool {
        matches!(
            self,
            ActionType::LaneChangeLeft
                | ActionType::LaneChangeRight
                | ActionType::MoveUp
                | ActionType::MoveDown
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    Verse,
    Chorus,
    Bridge,
    Rest,
}

impl SegmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentType::Verse => "verse",
            SegmentType::Chorus => "chorus",
            SegmentType::Bridge => "bridge",
            SegmentType::Rest => "rest",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RhythmNote {
    pub id: String,
    pub action_type: ActionType,
    pub start_time: Seconds,
    pub run_up_duration: Seconds,
    pub action_duration: Seconds,
    pub recovery_duration: Seconds,
    pub difficulty_weight: f64,
    pub target_lanes: Vec<Lane>,
    pub obstacle_lanes: Vec<Lane>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_mapping: Option<AnswerMapping>,
}

impl RhythmNote {
    pub fn total_duration(&self) -> Seconds {
        self.run_up_duration + self.action_duration + self.recovery_duration
    }

    pub fn end_time(&self) -> Seconds {
        self.start_time + self.total_duration()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelSegment {
    pub id: String,
    pub index: u64,
    pub start_time: Seconds,
    pub end_time: Seconds,
    pub notes: Vec<RhythmNote>,
    pub segment_type: SegmentType,
    pub difficulty_budget: f64,
    pub actual_difficulty: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleShape {
    Sphere,
    Beam,
}

impl ObstacleShape {
    pub fn for_action(action: ActionType) -> Self {
        match action {
            ActionType::MoveDown => ObstacleShape::Beam,
            _ => ObstacleShape::Sphere,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObstacleMetadata {
    pub action_type: ActionType,
    pub is_forced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObstacleSpawnData {
    pub id: String,
    pub shape: ObstacleShape,
    pub lanes: Vec<Lane>,
    pub spawn_time: Seconds,
    pub speed: f64,
    pub metadata: ObstacleMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerGateSpawnData {
    pub id: String,
    pub question: Question,
    pub answer_mapping: AnswerMapping,
    pub spawn_time: Seconds,
    pub speed: f64,
    pub run_up_duration: Seconds,
    pub action_duration: Seconds,
}

impl AnswerGateSpawnData {
    /// Lanes holding an answer, in lane order.
    pub fn answer_lanes(&self) -> Vec<Lane> {
        self.answer_mapping
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(lane, _)| lane as Lane)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelEventKind {
    Obstacle,
    AnswerGate,
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum LevelEventPayload {
    Obstacle(ObstacleSpawnData),
    AnswerGate(AnswerGateSpawnData),
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelEvent {
    pub id: String,
    pub spawn_time: Seconds,
    pub payload: LevelEventPayload,
}

impl LevelEvent {
    pub fn kind(&self) -> LevelEventKind {
        match self.payload {
            LevelEventPayload::Obstacle(_) => LevelEventKind::Obstacle,
            LevelEventPayload::AnswerGate(_) => LevelEventKind::AnswerGate,
            LevelEventPayload::Rest => LevelEventKind::Rest,
        }
    }
}

/// What the renderer/physics bridge receives each frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum SpawnEvent {
    Obstacle(ObstacleSpawnData),
    AnswerGate(AnswerGateSpawnData),
}

impl SpawnEvent {
    /// Rest events spawn nothing and map to `None`.
    pub fn from_level_event(event: LevelEvent) -> Option<Self> {
        match event.payload {
            LevelEventPayload::Obstacle(data) => Some(SpawnEvent::Obstacle(data)),
            LevelEventPayload::AnswerGate(data) => Some(SpawnEvent::AnswerGate(data)),
            LevelEventPayload::Rest => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            SpawnEvent::Obstacle(data) => &data.id,
            SpawnEvent::AnswerGate(data) => &data.id,
        }
    }

    pub fn spawn_time(&self) -> Seconds {
        match self {
            SpawnEvent::Obstacle(data) => data.spawn_time,
            SpawnEvent::AnswerGate(data) => data.spawn_time,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerPerformance {
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub obstacle_hits: u32,
    pub current_streak: u32,
}
