use crate::distance::squared_euclidean;
use ndarray::{Array2, ArrayView2};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Strategy for choosing the first centroid. Remaining centroids are always
/// drawn with k-means++ weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitMethod {
    /// First centroid is a uniformly random point
    #[default]
    KMeansPlusPlus,
    /// First centroid is the first point in the dataset
    FirstPoint,
}

/// Initialize `k` centroids with k-means++ seeding
///
/// After the first centroid, each next centroid is sampled with probability
/// proportional to its squared distance from the nearest centroid chosen so
/// far. Centroids always come from `k` distinct rows of `data`: once every
/// unused row coincides with a chosen centroid the remaining picks are drawn
/// uniformly from the unused rows.
///
/// Requires `1 <= k <= data.nrows()`.
pub fn initialize_centroids(
    data: &ArrayView2<f64>,
    k: usize,
    method: InitMethod,
    rng: &mut ChaCha8Rng,
) -> Array2<f64> {
    let n_samples = data.nrows();
    let n_features = data.ncols();

    let first = match method {
        InitMethod::KMeansPlusPlus => rng.gen_range(0..n_samples),
        InitMethod::FirstPoint => 0,
    };

    let mut selected = Vec::with_capacity(k);
    let mut used = vec![false; n_samples];
    selected.push(first);
    used[first] = true;

    // Squared distance from each point to its nearest chosen centroid
    let mut closest: Vec<f64> = data
        .rows()
        .into_iter()
        .map(|row| squared_euclidean(&row, &data.row(first)))
        .collect();

    while selected.len() < k {
        let next = match WeightedIndex::new(&closest) {
            Ok(weights) => weights.sample(rng),
            Err(_) => {
                // Every unused point duplicates a chosen centroid
                let unused: Vec<usize> = (0..n_samples).filter(|&i| !used[i]).collect();
                debug!(
                    remaining = unused.len(),
                    "k-means++ weights exhausted, falling back to uniform choice"
                );
                match unused.choose(rng) {
                    Some(&idx) => idx,
                    None => break,
                }
            }
        };

        selected.push(next);
        used[next] = true;

        let centroid = data.row(next);
        for (i, row) in data.rows().into_iter().enumerate() {
            let d = squared_euclidean(&row, &centroid);
            if d < closest[i] {
                closest[i] = d;
            }
        }
        closest[next] = 0.0;
    }

    let mut centroids = Array2::zeros((k, n_features));
    for (centroid_idx, &data_idx) in selected.iter().enumerate() {
        centroids.row_mut(centroid_idx).assign(&data.row(data_idx));
    }

    centroids
}
