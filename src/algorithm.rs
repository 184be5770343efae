use crate::assign::{CapacityAssigner, GreedyRepairAssigner};
use crate::centroid::{assignment_cost, objective, update_centroids};
use crate::config::KMeansConfig;
use crate::constraint::ClusterConstraint;
use crate::convergence::{ConvergenceChecker, ConvergenceStatus, Step};
use crate::distance::{compute_centroid_shift, nearest_centroids, pairwise_squared_distances};
use crate::error::KMeansError;
use crate::init::initialize_centroids;
use ndarray::{Array1, Array2, ArrayView2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of a constrained k-means fit
#[derive(Debug, Clone)]
pub struct KMeansResult {
    pub centroids: Array2<f64>,
    /// Cluster index of each input row
    pub labels: Array1<usize>,
    /// Sum of squared distances from each point to its final centroid
    pub objective: f64,
    pub n_iterations: usize,
    pub status: ConvergenceStatus,
    /// Seed of the restart that produced this result
    pub seed: u64,
    /// Objective after each iteration's centroid update
    pub objective_history: Vec<f64>,
}

impl KMeansResult {
    /// Whether the winning run stopped before its iteration cap
    pub fn converged(&self) -> bool {
        self.status.converged()
    }

    /// Number of points in each cluster
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.nrows()];
        for &label in self.labels.iter() {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Run size-constrained k-means with the default greedy assigner
///
/// Runs `config.n_init` restarts (in parallel) with seeds `seed, seed + 1, ...`
/// and keeps the one with the lowest objective.
pub fn kmeans_constrained(
    data: &ArrayView2<f64>,
    config: &KMeansConfig,
) -> Result<KMeansResult, KMeansError> {
    let assigner = GreedyRepairAssigner::new(config.refine_passes);
    kmeans_constrained_with(data, config, &assigner)
}

/// Run size-constrained k-means with a caller-supplied assigner
pub fn kmeans_constrained_with<A: CapacityAssigner>(
    data: &ArrayView2<f64>,
    config: &KMeansConfig,
    assigner: &A,
) -> Result<KMeansResult, KMeansError> {
    let constraint = validate(data, config)?;
    warn_degenerate(data, config.k);

    let start = Instant::now();
    let runs: Vec<KMeansResult> = (0..config.n_init)
        .into_par_iter()
        .map(|run| {
            let seed = config.seed.wrapping_add(run as u64);
            single_run(data, config, &constraint, assigner, seed)
        })
        .collect::<Result<_, _>>()?;

    // Earliest run wins ties, so the pick does not depend on scheduling
    let mut best: Option<KMeansResult> = None;
    for result in runs {
        if best
            .as_ref()
            .map_or(true, |b| result.objective < b.objective)
        {
            best = Some(result);
        }
    }
    let best = best.ok_or_else(|| {
        KMeansError::InvalidIterations("n_init must be greater than 0".to_string())
    })?;

    info!(
        n_samples = data.nrows(),
        k = config.k,
        n_init = config.n_init,
        seed = best.seed,
        objective = best.objective,
        iterations = best.n_iterations,
        status = ?best.status,
        elapsed_s = start.elapsed().as_secs_f64(),
        "constrained k-means finished"
    );

    Ok(best)
}

/// Check inputs and resolve the size constraint
fn validate(data: &ArrayView2<f64>, config: &KMeansConfig) -> Result<ClusterConstraint, KMeansError> {
    let n_samples = data.nrows();
    let k = config.k;

    if k == 0 {
        return Err(KMeansError::InvalidK(
            "k must be greater than 0".to_string(),
        ));
    }

    if n_samples < k {
        return Err(KMeansError::InsufficientData(format!(
            "Number of samples ({}) is less than k ({})",
            n_samples, k
        )));
    }

    if data.ncols() == 0 {
        return Err(KMeansError::InvalidDimensions(
            "data must have at least one feature".to_string(),
        ));
    }

    if config.max_iters == 0 {
        return Err(KMeansError::InvalidIterations(
            "max_iters must be greater than 0".to_string(),
        ));
    }

    if config.n_init == 0 {
        return Err(KMeansError::InvalidIterations(
            "n_init must be greater than 0".to_string(),
        ));
    }

    if let Some(((row, col), value)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(KMeansError::InvalidData(format!(
            "non-finite value {} at row {}, column {}",
            value, row, col
        )));
    }

    let constraint = config.constraint(n_samples);
    constraint.check_feasibility(n_samples)?;
    Ok(constraint)
}

/// Log inputs that make the result trivial or force duplicate centroids
fn warn_degenerate(data: &ArrayView2<f64>, k: usize) {
    // `+ 0.0` folds -0.0 into 0.0 so both hash alike
    let distinct: HashSet<Vec<u64>> = data
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|v| (v + 0.0).to_bits()).collect())
        .collect();

    if distinct.len() == 1 {
        warn!(
            n_samples = data.nrows(),
            "all points are identical; every assignment has objective 0"
        );
    } else if distinct.len() < k {
        warn!(
            distinct = distinct.len(),
            k, "fewer distinct points than clusters; some centroids will coincide"
        );
    }
}

/// One seeded run of the assign/update loop
fn single_run<A: CapacityAssigner>(
    data: &ArrayView2<f64>,
    config: &KMeansConfig,
    constraint: &ClusterConstraint,
    assigner: &A,
    seed: u64,
) -> Result<KMeansResult, KMeansError> {
    let n_samples = data.nrows();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut centroids = initialize_centroids(data, config.k, config.init, &mut rng);

    let checker = ConvergenceChecker::new(config.max_iters, config.tol);
    // No cluster carries this label, so the first assignment always counts as a change
    let mut labels = Array1::from_elem(n_samples, usize::MAX);
    let mut history = Vec::new();
    let mut status = ConvergenceStatus::IterationCap;
    let mut n_iterations = 0;

    for iteration in 1..=config.max_iters {
        n_iterations = iteration;
        let distances = pairwise_squared_distances(data, &centroids.view());
        let mut candidate = assigner.assign(&distances.view(), constraint)?;
        constraint.check_assignment(&candidate.view(), n_samples)?;

        // Accept a new assignment only if it strictly lowers the cost against
        // the current centroids; this keeps the objective non-increasing.
        if iteration > 1 && candidate != labels {
            let previous_cost = assignment_cost(&distances.view(), &labels);
            let candidate_cost = assignment_cost(&distances.view(), &candidate);
            if candidate_cost >= previous_cost {
                debug!(
                    iteration,
                    previous_cost, candidate_cost, "rejected non-improving assignment"
                );
                candidate = labels.clone();
            }
        }

        let changed = candidate != labels;
        labels = candidate;

        let prev_centroids = centroids.clone();
        let empty_clusters = update_centroids(data, &labels, &mut centroids);
        let shift = compute_centroid_shift(&prev_centroids.view(), &centroids.view());
        let current = objective(data, &labels, &centroids);
        history.push(current);

        debug!(
            seed,
            iteration,
            objective = current,
            shift,
            changed,
            empty = empty_clusters.len(),
            "iteration complete"
        );

        if let Step::Stop(reason) = checker.check(iteration, changed, shift) {
            status = reason;
            break;
        }
    }

    let final_objective = history.last().copied().unwrap_or(0.0);
    debug!(
        seed,
        iterations = n_iterations,
        objective = final_objective,
        status = ?status,
        "run finished"
    );

    Ok(KMeansResult {
        centroids,
        labels,
        objective: final_objective,
        n_iterations,
        status,
        seed,
        objective_history: history,
    })
}

/// Predict cluster assignments for new data using trained centroids.
///
/// Nearest centroid only; size bounds apply to the training data, not here.
pub fn predict_labels(data: &ArrayView2<f64>, centroids: &ArrayView2<f64>) -> Array1<usize> {
    let distances = pairwise_squared_distances(data, centroids);
    nearest_centroids(&distances.view())
}
