use crate::distance::squared_euclidean;
use ndarray::{Array1, Array2, ArrayView2};

/// Recompute each centroid as the mean of its assigned points.
///
/// Clusters with no points keep their previous centroid. Returns the indices
/// of those empty clusters.
pub fn update_centroids(
    data: &ArrayView2<f64>,
    labels: &Array1<usize>,
    centroids: &mut Array2<f64>,
) -> Vec<usize> {
    let k = centroids.nrows();
    let n_features = centroids.ncols();

    let mut cluster_sums: Array2<f64> = Array2::zeros((k, n_features));
    let mut cluster_counts = vec![0usize; k];

    for (point, &cluster) in data.rows().into_iter().zip(labels.iter()) {
        cluster_counts[cluster] += 1;
        let mut sum = cluster_sums.row_mut(cluster);
        sum += &point;
    }

    let mut empty_clusters = Vec::new();
    for (cluster_idx, &count) in cluster_counts.iter().enumerate() {
        if count > 0 {
            let mean = &cluster_sums.row(cluster_idx) / count as f64;
            centroids.row_mut(cluster_idx).assign(&mean);
        } else {
            empty_clusters.push(cluster_idx);
        }
    }

    empty_clusters
}

/// Sum of squared distances from each point to its assigned centroid
pub fn objective(data: &ArrayView2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    data.rows()
        .into_iter()
        .zip(labels.iter())
        .map(|(point, &cluster)| squared_euclidean(&point, &centroids.row(cluster)))
        .sum()
}

/// Cost of an assignment read from a precomputed (n_samples, k) distance matrix
pub fn assignment_cost(distances: &ArrayView2<f64>, labels: &Array1<usize>) -> f64 {
    labels
        .iter()
        .enumerate()
        .map(|(i, &cluster)| distances[[i, cluster]])
        .sum()
}
