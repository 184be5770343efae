use crate::error::KMeansError;
use ndarray::ArrayView1;

/// Size bounds applied uniformly to each of `k` clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterConstraint {
    pub k: usize,
    pub size_min: usize,
    pub size_max: usize,
}

impl ClusterConstraint {
    pub fn new(k: usize, size_min: usize, size_max: usize) -> Self {
        Self {
            k,
            size_min,
            size_max,
        }
    }

    /// Check that some partition of `n_samples` points into `k` clusters can
    /// satisfy the bounds, i.e. `k * size_min <= n_samples <= k * size_max`.
    pub fn check_feasibility(&self, n_samples: usize) -> Result<(), KMeansError> {
        if self.k == 0 {
            return Err(KMeansError::InvalidK(
                "k must be greater than 0".to_string(),
            ));
        }

        if self.size_min > self.size_max {
            return Err(KMeansError::InvalidSizeBounds(format!(
                "size_min ({}) is greater than size_max ({})",
                self.size_min, self.size_max
            )));
        }

        let lower = self.k.saturating_mul(self.size_min);
        let upper = self.k.saturating_mul(self.size_max);
        if n_samples < lower || n_samples > upper {
            return Err(KMeansError::InfeasibleConstraint(format!(
                "{} samples cannot form {} clusters of size [{}, {}] (need {} to {} samples)",
                n_samples, self.k, self.size_min, self.size_max, lower, upper
            )));
        }

        Ok(())
    }

    /// Check that `labels` is a full assignment of `n_samples` points whose
    /// cluster sizes stay within the bounds.
    pub fn check_assignment(
        &self,
        labels: &ArrayView1<usize>,
        n_samples: usize,
    ) -> Result<(), KMeansError> {
        if labels.len() != n_samples {
            return Err(KMeansError::InvalidData(format!(
                "assignment has {} labels for {} samples",
                labels.len(),
                n_samples
            )));
        }

        let mut sizes = vec![0usize; self.k];
        for (point, &label) in labels.iter().enumerate() {
            let size = sizes.get_mut(label).ok_or_else(|| {
                KMeansError::InvalidData(format!(
                    "point {} has label {} but there are only {} clusters",
                    point, label, self.k
                ))
            })?;
            *size += 1;
        }

        if let Some((cluster, &size)) = sizes
            .iter()
            .enumerate()
            .find(|(_, &size)| size < self.size_min || size > self.size_max)
        {
            return Err(KMeansError::InfeasibleConstraint(format!(
                "cluster {} has {} points, outside [{}, {}]",
                cluster, size, self.size_min, self.size_max
            )));
        }

        Ok(())
    }
}
