//! Static table of player-forced actions.
//!
//! Each action knows how long the player gets to see it coming (run-up), how
//! long it takes to perform, how long the cooldown is, what it costs against
//! a segment's difficulty budget, which actions may directly precede it, and
//! which lanes must be blocked to force it.

use runner_schema::{ActionType, Lane, Seconds, GRID_HEIGHT, GRID_WIDTH};

use crate::grid::{grid_position, lane_index, rows_from, rows_through};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    /// Safe lanes once the action is performed.
    pub target_lanes: Vec<Lane>,
    /// Lanes to block so the action is forced.
    pub obstacle_lanes: Vec<Lane>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionDefinition {
    pub action_type: ActionType,
    pub difficulty_weight: f64,
    pub min_run_up: Seconds,
    pub max_run_up: Seconds,
    pub action_duration: Seconds,
    pub recovery_duration: Seconds,
    /// Empty means any predecessor is fine.
    pub can_follow: &'static [ActionType],
    pub cannot_follow: &'static [ActionType],
    pub min_time_between_same: Seconds,
}

impl ActionDefinition {
    pub fn allows_predecessor(&self, previous: Option<ActionType>) -> bool {
        let Some(previous) = previous else {
            return true;
        };
        if self.cannot_follow.contains(&previous) {
            return false;
        }
        self.can_follow.is_empty() || self.can_follow.contains(&previous)
    }

    pub fn placement(&self, current_lane: Lane) -> Placement {
        placement(self.action_type, current_lane)
    }
}

const AFTER_VERTICAL: &[ActionType] = &[ActionType::Rest, ActionType::MoveUp, ActionType::MoveDown];
const AFTER_LATERAL: &[ActionType] = &[
    ActionType::Rest,
    ActionType::LaneChangeLeft,
    ActionType::LaneChangeRight,
];
const ANYTHING_BUT_GATE: &[ActionType] = &[
    ActionType::LaneChangeLeft,
    ActionType::LaneChangeRight,
    ActionType::MoveUp,
    ActionType::MoveDown,
    ActionType::Rest,
];

pub const LANE_CHANGE_LEFT: ActionDefinition = ActionDefinition {
    action_type: ActionType::LaneChangeLeft,
    difficulty_weight: 1.0,
    min_run_up: 1.0,
    max_run_up: 2.0,
    action_duration: 0.8,
    recovery_duration: 0.5,
    can_follow: AFTER_VERTICAL,
    cannot_follow: &[ActionType::LaneChangeLeft],
    min_time_between_same: 2.0,
};

pub const LANE_CHANGE_RIGHT: ActionDefinition = ActionDefinition {
    action_type: ActionType::LaneChangeRight,
    difficulty_weight: 1.0,
    min_run_up: 1.0,
    max_run_up: 2.0,
    action_duration: 0.8,
    recovery_duration: 0.5,
    can_follow: AFTER_VERTICAL,
    cannot_follow: &[ActionType::LaneChangeRight],
    min_time_between_same: 2.0,
};

pub const MOVE_UP: ActionDefinition = ActionDefinition {
    action_type: ActionType::MoveUp,
    difficulty_weight: 2.0,
    min_run_up: 1.2,
    max_run_up: 2.5,
    action_duration: 1.0,
    recovery_duration: 0.8,
    can_follow: AFTER_LATERAL,
    cannot_follow: &[ActionType::MoveDown],
    min_time_between_same: 3.0,
};

pub const MOVE_DOWN: ActionDefinition = ActionDefinition {
    action_type: ActionType::MoveDown,
    difficulty_weight: 2.0,
    min_run_up: 1.0,
    max_run_up: 2.0,
    action_duration: 0.8,
    recovery_duration: 0.6,
    can_follow: AFTER_LATERAL,
    cannot_follow: &[ActionType::MoveUp],
    min_time_between_same: 3.0,
};

pub const ANSWER_GATE: ActionDefinition = ActionDefinition {
    action_type: ActionType::AnswerGate,
    difficulty_weight: 3.0,
    min_run_up: 2.0,
    max_run_up: 3.0,
    action_duration: 2.0,
    recovery_duration: 1.5,
    can_follow: ANYTHING_BUT_GATE,
    cannot_follow: &[ActionType::AnswerGate],
    min_time_between_same: 15.0,
};

pub const REST: ActionDefinition = ActionDefinition {
    action_type: ActionType::Rest,
    difficulty_weight: 0.0,
    min_run_up: 0.0,
    max_run_up: 0.0,
    action_duration: 1.5,
    recovery_duration: 0.0,
    can_follow: &[],
    cannot_follow: &[],
    min_time_between_same: 0.0,
};

pub fn definition(action: ActionType) -> &'static ActionDefinition {
    match action {
        ActionType::LaneChangeLeft => &LANE_CHANGE_LEFT,
        ActionType::LaneChangeRight => &LANE_CHANGE_RIGHT,
        ActionType::MoveUp => &MOVE_UP,
        ActionType::MoveDown => &MOVE_DOWN,
        ActionType::AnswerGate => &ANSWER_GATE,
        ActionType::Rest => &REST,
    }
}

/// Lanes to block and lanes left safe for `action` when the player sits in
/// `current_lane`. At a grid edge the target equals the current lane.
pub fn placement(action: ActionType, current_lane: Lane) -> Placement {
    let (x, y) = grid_position(current_lane);
    let current = lane_index(x, y);

    match action {
        ActionType::LaneChangeLeft => Placement {
            target_lanes: vec![lane_index(x.saturating_sub(1), y)],
            obstacle_lanes: vec![current],
        },
        ActionType::LaneChangeRight => Placement {
            target_lanes: vec![lane_index((x + 1).min(GRID_WIDTH - 1), y)],
            obstacle_lanes: vec![current],
        },
        // y grows downward: row 0 is the top row
        ActionType::MoveUp => Placement {
            target_lanes: vec![lane_index(x, y.saturating_sub(1))],
            obstacle_lanes: rows_from(y).collect(),
        },
        ActionType::MoveDown => Placement {
            target_lanes: vec![lane_index(x, (y + 1).min(GRID_HEIGHT - 1))],
            obstacle_lanes: rows_through(y).collect(),
        },
        ActionType::AnswerGate | ActionType::Rest => Placement::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_authoritative_values() {
        let lcl = definition(ActionType::LaneChangeLeft);
        assert_eq!(lcl.difficulty_weight, 1.0);
        assert_eq!((lcl.min_run_up, lcl.max_run_up), (1.0, 2.0));
        assert_eq!(lcl.min_time_between_same, 2.0);

        let up = definition(ActionType::MoveUp);
        assert_eq!((up.min_run_up, up.max_run_up), (1.2, 2.5));
        assert_eq!((up.action_duration, up.recovery_duration), (1.0, 0.8));

        let gate = definition(ActionType::AnswerGate);
        assert_eq!(gate.difficulty_weight, 3.0);
        assert_eq!(gate.min_time_between_same, 15.0);

        let rest = definition(ActionType::Rest);
        assert_eq!(rest.difficulty_weight, 0.0);
        assert_eq!(rest.action_duration, 1.5);

        for action in ActionType::ALL {
            assert_eq!(definition(action).action_type, action);
        }
    }

    #[test]
    fn lane_change_blocks_current_lane_only() {
        let p = placement(ActionType::LaneChangeLeft, 4);
        assert_eq!(p.obstacle_lanes, vec![4]);
        assert_eq!(p.target_lanes, vec![3]);

        let p = placement(ActionType::LaneChangeRight, 4);
        assert_eq!(p.target_lanes, vec![5]);
    }

    #[test]
    fn lane_change_at_edge_is_a_no_op() {
        let p = placement(ActionType::LaneChangeLeft, 3);
        assert_eq!(p.target_lanes, vec![3]);
        assert_eq!(p.obstacle_lanes, vec![3]);

        let p = placement(ActionType::LaneChangeRight, 8);
        assert_eq!(p.target_lanes, vec![8]);
    }

    #[test]
    fn vertical_moves_block_whole_rows() {
        let up = placement(ActionType::MoveUp, 4);
        assert_eq!(up.obstacle_lanes, vec![3, 4, 5, 6, 7, 8]);
        assert_eq!(up.target_lanes, vec![1]);

        let down = placement(ActionType::MoveDown, 4);
        assert_eq!(down.obstacle_lanes, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(down.target_lanes, vec![7]);

        let up_top = placement(ActionType::MoveUp, 1);
        assert_eq!(up_top.target_lanes, vec![1]);
        assert_eq!(up_top.obstacle_lanes.len(), 9);
    }

    #[test]
    fn gate_and_rest_block_nothing() {
        assert_eq!(placement(ActionType::AnswerGate, 4), Placement::default());
        assert_eq!(placement(ActionType::Rest, 0), Placement::default());
    }

    #[test]
    fn predecessor_rules() {
        assert!(MOVE_UP.allows_predecessor(None));
        assert!(!MOVE_UP.allows_predecessor(Some(ActionType::MoveDown)));
        assert!(!MOVE_DOWN.allows_predecessor(Some(ActionType::MoveUp)));
        assert!(MOVE_UP.allows_predecessor(Some(ActionType::LaneChangeLeft)));
        assert!(!LANE_CHANGE_LEFT.allows_predecessor(Some(ActionType::LaneChangeLeft)));
        assert!(!LANE_CHANGE_LEFT.allows_predecessor(Some(ActionType::AnswerGate)));
        assert!(REST.allows_predecessor(Some(ActionType::AnswerGate)));
        assert!(!ANSWER_GATE.allows_predecessor(Some(ActionType::AnswerGate)));
    }
}
