use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use rayon::prelude::*;

/// Squared Euclidean distance between two vectors of equal length
#[inline]
pub fn squared_euclidean(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Compute the squared distance from every point to every centroid
///
/// # Arguments
/// * `data` - Data points (n_samples, n_features)
/// * `centroids` - Centroids (k, n_features)
///
/// # Returns
/// * Distance matrix of shape (n_samples, k)
///
/// Distances are computed directly rather than through the
/// `||x||^2 + ||c||^2 - 2*x.c` expansion so that equidistant centroids compare
/// exactly equal and ties resolve to the lower cluster index.
pub fn pairwise_squared_distances(
    data: &ArrayView2<f64>,
    centroids: &ArrayView2<f64>,
) -> Array2<f64> {
    let n_samples = data.nrows();
    let k = centroids.nrows();
    let mut distances = Array2::zeros((n_samples, k));

    // Parallel over rows; each row is written by exactly one task
    Zip::from(distances.rows_mut())
        .and(data.rows())
        .par_for_each(|mut dist_row, point| {
            for (j, centroid) in centroids.rows().into_iter().enumerate() {
                dist_row[j] = squared_euclidean(&point, &centroid);
            }
        });

    distances
}

/// Index of the nearest centroid for each row of a distance matrix.
/// Ties resolve to the lower cluster index.
pub fn nearest_centroids(distances: &ArrayView2<f64>) -> Array1<usize> {
    distances
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = 0;
            for (j, &d) in row.iter().enumerate() {
                if d < row[best] {
                    best = j;
                }
            }
            best
        })
        .collect()
}

/// Compute centroid shift (sum of L2 norms of centroid movements)
pub fn compute_centroid_shift(
    old_centroids: &ArrayView2<f64>,
    new_centroids: &ArrayView2<f64>,
) -> f64 {
    let k = old_centroids.nrows();

    let shifts: Vec<f64> = (0..k)
        .into_par_iter()
        .map(|i| squared_euclidean(&old_centroids.row(i), &new_centroids.row(i)).sqrt())
        .collect();

    // Serial sum keeps the result independent of thread scheduling
    shifts.iter().sum()
}
