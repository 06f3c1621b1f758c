use rand::Rng;
use serde::{Deserialize, Serialize};

/// Index draw used by the Fisher-Yates shuffle.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleMode {
    /// Draw `j` from `[0, i]` (every permutation equally likely).
    #[default]
    Uniform,
    /// Draw `j` from `[0, i)` (only cyclic permutations, never a fixed point).
    Biased,
}

/// Shuffle a slice in place, swapping from the last index down to 1.
pub fn shuffle_in_place<T, R: Rng + ?Sized>(slice: &mut [T], mode: ShuffleMode, rng: &mut R) {
    for i in (1..slice.len()).rev() {
        let j = match mode {
            ShuffleMode::Uniform => rng.random_range(0..=i),
            ShuffleMode::Biased => rng.random_range(0..i),
        };
        slice.swap(i, j);
    }
}

/// Return a shuffled copy of a slice, leaving the original untouched.
pub fn shuffle_population<T: Clone, R: Rng + ?Sized>(
    slice: &[T],
    mode: ShuffleMode,
    rng: &mut R,
) -> Vec<T> {
    let mut shuffled = slice.to_vec();
    shuffle_in_place(&mut shuffled, mode, rng);
    shuffled
}
