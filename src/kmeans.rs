use crate::algorithm::{kmeans_constrained, predict_labels, KMeansResult};
use crate::config::KMeansConfig;
use crate::error::KMeansError;
use ndarray::{Array1, Array2, ArrayView2};

/// Size-constrained k-means model with a scikit-learn style API.
///
/// Every cluster found by `train()` holds between `size_min` and `size_max`
/// training points.
///
/// # Example
///
/// ```
/// use teamkmeans_rs::{ConstrainedKMeans, KMeansConfig};
/// use ndarray::array;
///
/// let data = array![
///     [0.0, 0.0], [0.0, 1.0], [1.0, 0.0],
///     [10.0, 10.0], [10.0, 11.0], [11.0, 10.0],
/// ];
///
/// let config = KMeansConfig::new(2).with_size_bounds(3, 3).with_seed(42);
/// let mut kmeans = ConstrainedKMeans::with_config(config);
/// let labels = kmeans.fit_predict(&data.view()).unwrap();
///
/// assert_eq!(labels[0], labels[1]);
/// assert_ne!(labels[0], labels[3]);
/// ```
pub struct ConstrainedKMeans {
    /// Model configuration
    config: KMeansConfig,

    /// Number of features (dimensions)
    d: usize,

    /// Result of the last fit (None if not yet fitted)
    result: Option<KMeansResult>,
}

impl ConstrainedKMeans {
    /// Create a new model with default configuration and no size bounds.
    ///
    /// # Arguments
    ///
    /// * `d` - Number of features (dimensions) in the data
    /// * `k` - Number of clusters
    ///
    /// # Panics
    ///
    /// Panics if `k` is 0.
    pub fn new(d: usize, k: usize) -> Self {
        assert!(k > 0, "k must be greater than 0");

        Self {
            config: KMeansConfig::new(k),
            d,
            result: None,
        }
    }

    /// Create a new model with custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config.k` is 0.
    pub fn with_config(config: KMeansConfig) -> Self {
        assert!(config.k > 0, "k must be greater than 0");

        Self {
            d: 0, // Will be set on first train call
            config,
            result: None,
        }
    }

    /// Train the model on the given data.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Number of samples is less than k
    /// - The size bounds cannot be met for this number of samples
    /// - Data dimensions don't match (for subsequent calls)
    pub fn train(&mut self, data: &ArrayView2<f64>) -> Result<(), KMeansError> {
        let n_features = data.ncols();

        // Set dimensions on first call, validate on subsequent calls
        if self.d == 0 {
            self.d = n_features;
        } else if n_features != self.d {
            return Err(KMeansError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                self.d, n_features
            )));
        }

        let result = kmeans_constrained(data, &self.config)?;
        self.result = Some(result);
        Ok(())
    }

    /// Fit the model to the data. Equivalent to `train()`, returns `&mut Self`
    /// for method chaining.
    pub fn fit(&mut self, data: &ArrayView2<f64>) -> Result<&mut Self, KMeansError> {
        self.train(data)?;
        Ok(self)
    }

    /// Assign new data to the nearest trained centroid.
    ///
    /// Size bounds are not enforced on new data.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model has not been fitted yet
    /// - Data dimensions don't match the training data
    pub fn predict(&self, data: &ArrayView2<f64>) -> Result<Array1<usize>, KMeansError> {
        let result = self.result.as_ref().ok_or(KMeansError::NotFitted)?;

        let n_features = data.ncols();
        if n_features != self.d {
            return Err(KMeansError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                self.d, n_features
            )));
        }

        Ok(predict_labels(data, &result.centroids.view()))
    }

    /// Fit the model and return the constrained labels of the training data.
    pub fn fit_predict(&mut self, data: &ArrayView2<f64>) -> Result<Array1<usize>, KMeansError> {
        self.train(data)?;
        self.labels().cloned().ok_or(KMeansError::NotFitted)
    }

    /// Centroids of the fitted model, `None` before fitting.
    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.result.as_ref().map(|r| &r.centroids)
    }

    /// Constrained labels of the training data, `None` before fitting.
    pub fn labels(&self) -> Option<&Array1<usize>> {
        self.result.as_ref().map(|r| &r.labels)
    }

    /// Objective of the fitted model, `None` before fitting.
    pub fn objective(&self) -> Option<f64> {
        self.result.as_ref().map(|r| r.objective)
    }

    /// Full result of the last fit, including convergence diagnostics.
    pub fn result(&self) -> Option<&KMeansResult> {
        self.result.as_ref()
    }

    /// Get the number of clusters.
    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Get the number of features (dimensions).
    pub fn d(&self) -> usize {
        self.d
    }

    /// Get the configuration.
    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }
}
