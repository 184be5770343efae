use crate::constraint::ClusterConstraint;
use crate::init::InitMethod;

/// Configuration for the constrained k-means algorithm
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Number of clusters (teams)
    pub k: usize,

    /// Minimum number of points per cluster
    pub size_min: usize,

    /// Maximum number of points per cluster. `None` means no upper bound
    /// beyond the number of samples.
    pub size_max: Option<usize>,

    /// Maximum number of iterations per run
    pub max_iters: usize,

    /// Convergence tolerance. When the total centroid shift is below this
    /// threshold the run stops early. Set to a negative value to stop only
    /// on an unchanged assignment or the iteration cap.
    pub tol: f64,

    /// Random seed for centroid initialization. Restart `i` uses `seed + i`.
    pub seed: u64,

    /// Number of independent restarts; the run with the lowest objective wins
    pub n_init: usize,

    /// Centroid seeding strategy
    pub init: InitMethod,

    /// Passes of move/swap refinement after the capacity repair phase
    pub refine_passes: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 8,
            size_min: 0,
            size_max: None,
            max_iters: 300,
            tol: 1e-4,
            seed: 0,
            n_init: 10,
            init: InitMethod::KMeansPlusPlus,
            refine_passes: 3,
        }
    }
}

impl KMeansConfig {
    /// Create a new configuration with the specified number of clusters
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set both cluster size bounds
    pub fn with_size_bounds(mut self, size_min: usize, size_max: usize) -> Self {
        self.size_min = size_min;
        self.size_max = Some(size_max);
        self
    }

    /// Set the minimum cluster size
    pub fn with_size_min(mut self, size_min: usize) -> Self {
        self.size_min = size_min;
        self
    }

    /// Set the maximum cluster size
    pub fn with_size_max(mut self, size_max: Option<usize>) -> Self {
        self.size_max = size_max;
        self
    }

    /// Set the maximum number of iterations
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of restarts
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set the seeding strategy
    pub fn with_init(mut self, init: InitMethod) -> Self {
        self.init = init;
        self
    }

    /// Set the number of refinement passes (0 disables refinement)
    pub fn with_refine_passes(mut self, refine_passes: usize) -> Self {
        self.refine_passes = refine_passes;
        self
    }

    /// Resolve the per-cluster size constraint for a dataset of `n_samples`
    pub fn constraint(&self, n_samples: usize) -> ClusterConstraint {
        ClusterConstraint::new(
            self.k,
            self.size_min,
            self.size_max.unwrap_or(n_samples),
        )
    }
}
