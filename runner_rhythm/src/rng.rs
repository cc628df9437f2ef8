/// Linear congruential generator (Numerical Recipes constants).
///
/// Same seed, same call sequence, same numbers. The generator and the level
/// manager each own one so a session replays identically from its seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    seed: u32,
}

impl SeededRng {
    const MULTIPLIER: u32 = 1_664_525;
    const INCREMENT: u32 = 1_013_904_223;

    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Current internal state.
    pub fn state(&self) -> u32 {
        self.seed
    }

    /// `seed = (seed * 1664525 + 1013904223) mod 2^32`, normalized by `2^32 - 1`.
    ///
    /// The single state `u32::MAX` normalizes to exactly 1.0; callers that
    /// turn the value into an index clamp it.
    pub fn next(&mut self) -> f64 {
        self.seed = self
            .seed
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        f64::from(self.seed) / f64::from(u32::MAX)
    }

    /// Uniform draw in `[min, max]`; `max` itself comes back when `next` yields 1.0.
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next() * (max - min)
    }

    /// Fisher-Yates permutation of a copy of `items`.
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        for i in (1..out.len()).rev() {
            let j = ((self.next() * (i + 1) as f64).floor() as usize).min(i);
            out.swap(i, j);
        }
        out
    }
}
