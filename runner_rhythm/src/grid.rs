use runner_schema::{Lane, GRID_HEIGHT, GRID_WIDTH, LANE_COUNT};

pub const CENTER_LANE: Lane = 4;

pub fn lane_index(x: u8, y: u8) -> Lane {
    y * GRID_WIDTH + x
}

/// `(x, y)` of a lane; out-of-range lanes are clamped onto the grid.
pub fn grid_position(lane: Lane) -> (u8, u8) {
    let lane = lane.min(LANE_COUNT as Lane - 1);
    (lane % GRID_WIDTH, lane / GRID_WIDTH)
}

pub fn row_lanes(y: u8) -> impl Iterator<Item = Lane> {
    (0..GRID_WIDTH).map(move |x| lane_index(x, y))
}

pub fn rows_from(y: u8) -> impl Iterator<Item = Lane> {
    (y..GRID_HEIGHT).flat_map(row_lanes)
}

pub fn rows_through(y: u8) -> impl Iterator<Item = Lane> {
    (0..=y).flat_map(row_lanes)
}

/// Set of grid lanes, one bit per lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LaneMask(u16);

impl LaneMask {
    pub const EMPTY: LaneMask = LaneMask(0);

    pub fn from_lanes<'a>(lanes: impl IntoIterator<Item = &'a Lane>) -> Self {
        lanes.into_iter().fold(Self::EMPTY, |mask, &lane| mask.with(lane))
    }

    pub fn with(self, lane: Lane) -> Self {
        if (lane as usize) < LANE_COUNT {
            LaneMask(self.0 | (1 << lane))
        } else {
            self
        }
    }

    pub fn contains(self, lane: Lane) -> bool {
        (lane as usize) < LANE_COUNT && self.0 & (1 << lane) != 0
    }

    pub fn union(self, other: LaneMask) -> Self {
        LaneMask(self.0 | other.0)
    }

    pub fn intersects(self, other: LaneMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn lanes(self) -> Vec<Lane> {
        (0..LANE_COUNT as Lane).filter(|&l| self.contains(l)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_position_are_row_major() {
        assert_eq!(lane_index(0, 0), 0);
        assert_eq!(lane_index(2, 0), 2);
        assert_eq!(lane_index(1, 1), CENTER_LANE);
        assert_eq!(lane_index(2, 2), 8);
        assert_eq!(grid_position(5), (2, 1));
        assert_eq!(grid_position(200), (2, 2));
    }

    #[test]
    fn row_ranges() {
        assert_eq!(rows_from(1).collect::<Vec<_>>(), vec![3, 4, 5, 6, 7, 8]);
        assert_eq!(rows_through(0).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn mask_ops() {
        let a = LaneMask::from_lanes(&[0, 4, 8]);
        let b = LaneMask::EMPTY.with(4).with(42);
        assert!(a.intersects(b));
        assert_eq!(b.len(), 1);
        assert_eq!(a.union(b).lanes(), vec![0, 4, 8]);
        assert!(!LaneMask::from_lanes(&[1]).intersects(a));
        assert!(LaneMask::EMPTY.is_empty());
    }
}
