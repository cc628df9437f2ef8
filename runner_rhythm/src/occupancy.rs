use runner_schema::Seconds;

use crate::grid::LaneMask;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    lanes: LaneMask,
    from: Seconds,
    until: Seconds,
}

impl Window {
    fn overlaps(&self, from: Seconds, until: Seconds) -> bool {
        self.from < until && from < self.until
    }
}

/// Which lanes are claimed, and over which time span, by scheduled obstacles
/// and by the answer slots of scheduled gates.
///
/// An obstacle must never block a lane that holds an answer of a gate that is
/// live at the same time.
#[derive(Debug, Clone, Default)]
pub struct LaneOccupancy {
    blocked: Vec<Window>,
    answers: Vec<Window>,
}

impl LaneOccupancy {
    pub fn block(&mut self, lanes: LaneMask, from: Seconds, until: Seconds) {
        if !lanes.is_empty() {
            self.blocked.push(Window { lanes, from, until });
        }
    }

    pub fn reserve_answers(&mut self, lanes: LaneMask, from: Seconds, until: Seconds) {
        if !lanes.is_empty() {
            self.answers.push(Window { lanes, from, until });
        }
    }

    /// Answer lanes reserved at any point of `[from, until)`.
    pub fn reserved_answers(&self, from: Seconds, until: Seconds) -> LaneMask {
        Self::union_overlapping(&self.answers, from, until)
    }

    /// Lanes blocked by obstacles at any point of `[from, until)`.
    pub fn blocked(&self, from: Seconds, until: Seconds) -> LaneMask {
        Self::union_overlapping(&self.blocked, from, until)
    }

    /// Drops every window that ended before `time`.
    pub fn prune(&mut self, time: Seconds) {
        self.blocked.retain(|w| w.until > time);
        self.answers.retain(|w| w.until > time);
    }

    pub fn clear(&mut self) {
        self.blocked.clear();
        self.answers.clear();
    }

    pub fn len(&self) -> usize {
        self.blocked.len() + self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn union_overlapping(windows: &[Window], from: Seconds, until: Seconds) -> LaneMask {
        windows
            .iter()
            .filter(|w| w.overlaps(from, until))
            .fold(LaneMask::EMPTY, |acc, w| acc.union(w.lanes))
    }
}
