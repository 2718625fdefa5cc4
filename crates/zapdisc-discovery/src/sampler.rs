//! Uniform sampling without replacement.

use rand::Rng;

/// Chooses `min(k, items.len())` distinct items uniformly at random.
///
/// Runs a partial Fisher-Yates shuffle over indices, so every element has
/// the same selection probability and no element is chosen twice. The order
/// of the returned items is itself random.
pub fn choose_k<T: Clone, R: Rng>(items: &[T], k: usize, rng: &mut R) -> Vec<T> {
    let take = k.min(items.len());
    let mut indices: Vec<usize> = (0..items.len()).collect();

    for i in 0..take {
        let j = rng.random_range(i..indices.len());
        indices.swap(i, j);
    }

    indices[..take].iter().map(|&i| items[i].clone()).collect()
}
