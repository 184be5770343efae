use approx::assert_relative_eq;
use ndarray::{array, Array2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use teamkmeans_rs::{
    form_teams, kmeans_constrained, kmeans_constrained_with, CapacityAssigner,
    ClusterConstraint, ConstrainedKMeans, ConvergenceStatus, GreedyRepairAssigner, InitMethod,
    KMeansConfig, KMeansError, Point, TeamBuilder,
};

/// Generate synthetic clustered data with known centers
fn generate_clustered_data(
    n_samples: usize,
    n_features: usize,
    n_clusters: usize,
    seed: u64,
) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let centers = Array2::random_using(
        (n_clusters, n_features),
        Uniform::new(-10.0, 10.0),
        &mut rng,
    );
    let noise = Array2::random_using((n_samples, n_features), Uniform::new(-0.5, 0.5), &mut rng);

    let mut data = Array2::zeros((n_samples, n_features));
    for i in 0..n_samples {
        let center = centers.row(i % n_clusters);
        for j in 0..n_features {
            data[[i, j]] = center[j] + noise[[i, j]];
        }
    }

    data
}

fn cluster_sizes(labels: &[usize], k: usize) -> Vec<usize> {
    let mut sizes = vec![0; k];
    for &label in labels {
        sizes[label] += 1;
    }
    sizes
}

fn six_points() -> Vec<Point> {
    vec![
        Point::new("p00", vec![0.0, 0.0]),
        Point::new("p01", vec![0.0, 1.0]),
        Point::new("p10", vec![1.0, 0.0]),
        Point::new("q00", vec![10.0, 10.0]),
        Point::new("q01", vec![10.0, 11.0]),
        Point::new("q10", vec![11.0, 10.0]),
    ]
}

// ============================================================================
// Partition & Capacity Tests
// ============================================================================

#[test]
fn test_every_point_assigned_exactly_once() {
    let points: Vec<Point> = (0..40)
        .map(|i| Point::new(format!("user{}", i), vec![i as f64, (i % 7) as f64]))
        .collect();
    let config = KMeansConfig::new(6).with_size_bounds(6, 7).with_seed(1);

    let assignment = form_teams(&points, &config).unwrap();

    assert_eq!(assignment.len(), 40);
    let mut seen = HashSet::new();
    for team in assignment.teams() {
        for id in team {
            assert!(seen.insert(id.to_string()), "{} appears twice", id);
        }
    }
    let expected: HashSet<String> = points.iter().map(|p| p.id.clone()).collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_capacity_invariant_across_seeds() {
    let data = generate_clustered_data(203, 5, 4, 17);

    for seed in 0..5 {
        let config = KMeansConfig::new(7)
            .with_size_bounds(27, 31)
            .with_seed(seed)
            .with_n_init(2);
        let result = kmeans_constrained(&data.view(), &config).unwrap();

        for size in result.cluster_sizes() {
            assert!(
                (27..=31).contains(&size),
                "seed {}: cluster size {} outside [27, 31]",
                seed,
                size
            );
        }
    }
}

#[test]
fn test_unbalanced_data_is_forced_into_bounds() {
    // 90% of the points sit in one blob
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let blob = Array2::random_using((90, 2), Uniform::new(-1.0, 1.0), &mut rng);
    let outliers = Array2::random_using((10, 2), Uniform::new(20.0, 21.0), &mut rng);
    let data = ndarray::concatenate(Axis(0), &[blob.view(), outliers.view()]).unwrap();

    let config = KMeansConfig::new(4).with_size_bounds(25, 25).with_seed(9);
    let result = kmeans_constrained(&data.view(), &config).unwrap();

    assert_eq!(result.cluster_sizes(), vec![25, 25, 25, 25]);
}

// ============================================================================
// Feasibility Tests
// ============================================================================

#[test]
fn test_feasibility_gate() {
    let data = Array2::random((10, 3), Uniform::new(-1.0, 1.0));
    let config = KMeansConfig::new(4).with_size_bounds(3, 3);

    let result = kmeans_constrained(&data.view(), &config);
    match result {
        Err(KMeansError::InfeasibleConstraint(_)) => {}
        other => panic!("Expected InfeasibleConstraint, got {:?}", other.map(|r| r.labels)),
    }
}

#[test]
fn test_feasible_boundary_case() {
    // 3*4 = 12 > 10 would fail, but [3, 5] with k = 3 admits 10
    let data = Array2::random((10, 3), Uniform::new(-1.0, 1.0));
    let config = KMeansConfig::new(3).with_size_bounds(3, 5);

    let result = kmeans_constrained(&data.view(), &config).unwrap();
    for size in result.cluster_sizes() {
        assert!((3..=5).contains(&size));
    }
}

#[test]
fn test_size_max_too_small() {
    let data = Array2::random((10, 2), Uniform::new(-1.0, 1.0));
    let config = KMeansConfig::new(2).with_size_bounds(0, 4);

    assert!(matches!(
        kmeans_constrained(&data.view(), &config),
        Err(KMeansError::InfeasibleConstraint(_))
    ));
}

#[test]
fn test_min_greater_than_max() {
    let data = Array2::random((10, 2), Uniform::new(-1.0, 1.0));
    let config = KMeansConfig::new(2).with_size_bounds(6, 5);

    assert!(matches!(
        kmeans_constrained(&data.view(), &config),
        Err(KMeansError::InvalidSizeBounds(_))
    ));
}

#[test]
fn test_k_larger_than_n() {
    let data = Array2::random((5, 2), Uniform::new(-1.0, 1.0));
    let config = KMeansConfig::new(6).with_size_bounds(0, 5);

    assert!(matches!(
        kmeans_constrained(&data.view(), &config),
        Err(KMeansError::InsufficientData(_))
    ));
}

#[test]
fn test_mismatched_point_dimensions() {
    let points = vec![
        Point::new("a", vec![1.0, 2.0, 3.0]),
        Point::new("b", vec![1.0, 2.0]),
    ];
    let config = KMeansConfig::new(1);

    assert!(matches!(
        form_teams(&points, &config),
        Err(KMeansError::InvalidDimensions(_))
    ));
}

// ============================================================================
// Determinism Tests
// ============================================================================

#[test]
fn test_reproducibility_with_seed() {
    let data = generate_clustered_data(300, 8, 5, 3);
    let config = KMeansConfig::new(5)
        .with_size_bounds(50, 70)
        .with_seed(12345);

    let first = kmeans_constrained(&data.view(), &config).unwrap();
    let second = kmeans_constrained(&data.view(), &config).unwrap();

    assert_eq!(first.labels, second.labels);
    assert_eq!(first.objective.to_bits(), second.objective.to_bits());
    assert_eq!(first.centroids, second.centroids);
    assert_eq!(first.seed, second.seed);
}

#[test]
fn test_single_restart_reproducible() {
    let data = Array2::random((150, 4), Uniform::new(-1.0, 1.0));
    let config = KMeansConfig::new(3)
        .with_size_bounds(50, 50)
        .with_n_init(1)
        .with_seed(77)
        .with_init(InitMethod::FirstPoint);

    let first = kmeans_constrained(&data.view(), &config).unwrap();
    let second = kmeans_constrained(&data.view(), &config).unwrap();

    assert_eq!(first.labels, second.labels);
    assert_eq!(first.objective_history, second.objective_history);
}

#[test]
fn test_restarts_never_worse_than_first_run() {
    let data = generate_clustered_data(240, 6, 6, 11);
    let single = KMeansConfig::new(6)
        .with_size_bounds(35, 45)
        .with_seed(5)
        .with_n_init(1);
    let many = single.clone().with_n_init(8);

    let one = kmeans_constrained(&data.view(), &single).unwrap();
    let best = kmeans_constrained(&data.view(), &many).unwrap();

    assert!(best.objective <= one.objective);
}

// ============================================================================
// Objective & Convergence Tests
// ============================================================================

#[test]
fn test_objective_non_increasing() {
    let data = generate_clustered_data(400, 4, 8, 21);
    let config = KMeansConfig::new(8)
        .with_size_bounds(45, 55)
        .with_tol(-1.0)
        .with_n_init(1)
        .with_seed(2);

    let result = kmeans_constrained(&data.view(), &config).unwrap();

    for (i, pair) in result.objective_history.windows(2).enumerate() {
        assert!(
            pair[1] <= pair[0] + 1e-9,
            "objective rose at iteration {}: {} -> {}",
            i + 2,
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_objective_matches_final_centroids() {
    let data = generate_clustered_data(120, 3, 4, 8);
    let config = KMeansConfig::new(4).with_size_bounds(30, 30);

    let result = kmeans_constrained(&data.view(), &config).unwrap();

    let mut expected = 0.0;
    for (i, &label) in result.labels.iter().enumerate() {
        let diff = &data.row(i) - &result.centroids.row(label);
        expected += diff.dot(&diff);
    }
    assert_relative_eq!(result.objective, expected, epsilon = 1e-9);
}

#[test]
fn test_well_separated_clusters_recovered() {
    let centers = array![[0.0, 0.0], [20.0, 0.0], [0.0, 20.0], [20.0, 20.0]];
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let noise = Array2::random_using((200, 2), Uniform::new(-0.5, 0.5), &mut rng);
    let mut data = Array2::zeros((200, 2));
    for i in 0..200 {
        let center = centers.row(i % 4);
        data[[i, 0]] = center[0] + noise[[i, 0]];
        data[[i, 1]] = center[1] + noise[[i, 1]];
    }
    let config = KMeansConfig::new(4).with_size_bounds(50, 50).with_seed(42);

    let result = kmeans_constrained(&data.view(), &config).unwrap();

    // Points are generated round-robin, so i and i + 4 share a center
    for i in 0..196 {
        assert_eq!(
            result.labels[i],
            result.labels[i + 4],
            "points {} and {} should share a cluster",
            i,
            i + 4
        );
    }
    assert!(result.converged());
}

#[test]
fn test_iteration_cap_is_respected() {
    let data = Array2::random((500, 8), Uniform::new(-1.0, 1.0));
    // The first pass always changes the assignment and tol is disabled,
    // so a single iteration can only end at the cap.
    let config = KMeansConfig::new(10)
        .with_size_bounds(45, 55)
        .with_max_iters(1)
        .with_tol(-1.0)
        .with_n_init(1);

    let result = kmeans_constrained(&data.view(), &config).unwrap();

    assert_eq!(result.n_iterations, 1);
    assert_eq!(result.status, ConvergenceStatus::IterationCap);
    assert!(!result.converged());
    for size in result.cluster_sizes() {
        assert!((45..=55).contains(&size));
    }
}

// ============================================================================
// Edge Cases Tests
// ============================================================================

#[test]
fn test_k_equals_one() {
    let data = Array2::random((100, 8), Uniform::new(-1.0, 1.0));
    let config = KMeansConfig::new(1).with_size_bounds(0, 100);

    let result = kmeans_constrained(&data.view(), &config).unwrap();

    assert!(result.labels.iter().all(|&l| l == 0));
    let data_mean = data.mean_axis(Axis(0)).unwrap();
    for j in 0..data.ncols() {
        assert_relative_eq!(result.centroids[[0, j]], data_mean[j], epsilon = 1e-12);
    }
}

#[test]
fn test_k_equals_n_samples() {
    let data = Array2::random((10, 4), Uniform::new(-1.0, 1.0));
    let config = KMeansConfig::new(10).with_size_bounds(1, 1);

    let result = kmeans_constrained(&data.view(), &config).unwrap();

    let labels: HashSet<usize> = result.labels.iter().copied().collect();
    assert_eq!(labels.len(), 10, "Each point should have its own cluster");
    assert_relative_eq!(result.objective, 0.0);
}

#[test]
fn test_size_min_zero_allows_empty_clusters() {
    // Three identical points, three clusters, no lower bound
    let data = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
    let config = KMeansConfig::new(3).with_size_bounds(0, 3).with_n_init(1);

    let result = kmeans_constrained(&data.view(), &config).unwrap();

    assert_eq!(result.labels.len(), 3);
    assert_relative_eq!(result.objective, 0.0);
    for row in result.centroids.rows() {
        assert_eq!(row, array![1.0, 1.0]);
    }
}

// ============================================================================
// Team API Tests
// ============================================================================

#[test]
fn test_end_to_end_six_points() {
    let config = KMeansConfig::new(2).with_size_bounds(3, 3).with_seed(42);

    let assignment = form_teams(&six_points(), &config).unwrap();

    let teams = assignment.teams();
    assert_eq!(teams.len(), 2);
    let mut rosters: Vec<Vec<&str>> = teams.into_iter().collect();
    rosters.sort();
    assert_eq!(rosters[0], vec!["p00", "p01", "p10"]);
    assert_eq!(rosters[1], vec!["q00", "q01", "q10"]);

    // Each group: centroid (1/3, 1/3) -> 2/9 + 5/9 + 5/9 = 4/3
    assert_relative_eq!(assignment.objective, 8.0 / 3.0, epsilon = 1e-9);
    assert!(assignment.converged());
}

#[test]
fn test_team_builder_standardized() {
    // Second feature on a much larger scale; standardizing keeps both relevant
    let points: Vec<Point> = (0..12)
        .map(|i| {
            let group = (i / 4) as f64;
            Point::new(format!("u{}", i), vec![group, 1000.0 * group + (i % 4) as f64])
        })
        .collect();
    let config = KMeansConfig::new(3).with_size_bounds(4, 4).with_seed(3);

    let assignment = TeamBuilder::new(&points)
        .unwrap()
        .standardize()
        .form_teams(&config)
        .unwrap();

    for team in assignment.teams() {
        let groups: HashSet<usize> = team
            .iter()
            .map(|id| id[1..].parse::<usize>().unwrap() / 4)
            .collect();
        assert_eq!(groups.len(), 1, "team {:?} mixes groups", team);
    }
}

#[test]
fn test_duplicate_identifiers_rejected() {
    let mut points = six_points();
    points[5].id = "p00".to_string();
    let config = KMeansConfig::new(2).with_size_bounds(3, 3);

    assert!(matches!(
        form_teams(&points, &config),
        Err(KMeansError::DuplicateIdentifier(_))
    ));
}

// ============================================================================
// Model API Tests
// ============================================================================

#[test]
fn test_model_fit_predict() {
    let data = generate_clustered_data(90, 3, 3, 6);
    let config = KMeansConfig::new(3).with_size_bounds(30, 30).with_seed(6);
    let mut kmeans = ConstrainedKMeans::with_config(config);

    let labels = kmeans.fit_predict(&data.view()).unwrap();

    assert_eq!(cluster_sizes(labels.as_slice().unwrap(), 3), vec![30, 30, 30]);
    assert!(kmeans.centroids().is_some());
    assert!(kmeans.objective().is_some());
}

#[test]
fn test_predict_before_fit_fails() {
    let data = Array2::random((100, 8), Uniform::new(-1.0, 1.0));
    let kmeans = ConstrainedKMeans::new(8, 5);

    match kmeans.predict(&data.view()) {
        Err(KMeansError::NotFitted) => {}
        _ => panic!("Expected NotFitted error"),
    }
}

// ============================================================================
// Custom Assigner Tests
// ============================================================================

/// Assigns round-robin regardless of distance
struct RoundRobin;

impl CapacityAssigner for RoundRobin {
    fn assign(
        &self,
        distances: &ndarray::ArrayView2<f64>,
        constraint: &ClusterConstraint,
    ) -> Result<ndarray::Array1<usize>, KMeansError> {
        Ok((0..distances.nrows()).map(|i| i % constraint.k).collect())
    }
}

#[test]
fn test_custom_assigner_is_used() {
    let data = Array2::random((12, 2), Uniform::new(-1.0, 1.0));
    let config = KMeansConfig::new(3).with_size_bounds(4, 4).with_n_init(1);

    let result = kmeans_constrained_with(&data.view(), &config, &RoundRobin).unwrap();

    let expected: Vec<usize> = (0..12).map(|i| i % 3).collect();
    assert_eq!(result.labels.to_vec(), expected);
    assert_eq!(result.status, ConvergenceStatus::Converged);
    assert_eq!(result.n_iterations, 2);
}

/// Ignores the bounds and puts every point in the first cluster
struct Everyone;

impl CapacityAssigner for Everyone {
    fn assign(
        &self,
        distances: &ndarray::ArrayView2<f64>,
        _constraint: &ClusterConstraint,
    ) -> Result<ndarray::Array1<usize>, KMeansError> {
        Ok(ndarray::Array1::zeros(distances.nrows()))
    }
}

/// Labels every point with a cluster that does not exist
struct PastTheEnd;

impl CapacityAssigner for PastTheEnd {
    fn assign(
        &self,
        distances: &ndarray::ArrayView2<f64>,
        constraint: &ClusterConstraint,
    ) -> Result<ndarray::Array1<usize>, KMeansError> {
        Ok(ndarray::Array1::from_elem(distances.nrows(), constraint.k))
    }
}

/// Returns one label fewer than there are points
struct ShortAssignment;

impl CapacityAssigner for ShortAssignment {
    fn assign(
        &self,
        distances: &ndarray::ArrayView2<f64>,
        constraint: &ClusterConstraint,
    ) -> Result<ndarray::Array1<usize>, KMeansError> {
        Ok((1..distances.nrows()).map(|i| i % constraint.k).collect())
    }
}

#[test]
fn test_assigner_breaking_bounds_is_rejected() {
    let data = Array2::random((12, 2), Uniform::new(-1.0, 1.0));
    let config = KMeansConfig::new(3).with_size_bounds(4, 4).with_n_init(1);

    let result = kmeans_constrained_with(&data.view(), &config, &Everyone);

    assert!(matches!(result, Err(KMeansError::InfeasibleConstraint(_))));
}

#[test]
fn test_assigner_label_out_of_range_is_rejected() {
    let data = Array2::random((12, 2), Uniform::new(-1.0, 1.0));
    let config = KMeansConfig::new(3).with_size_bounds(0, 12).with_n_init(2);

    let result = kmeans_constrained_with(&data.view(), &config, &PastTheEnd);

    assert!(matches!(result, Err(KMeansError::InvalidData(_))));
}

#[test]
fn test_assigner_short_assignment_is_rejected() {
    let data = Array2::random((12, 2), Uniform::new(-1.0, 1.0));
    let config = KMeansConfig::new(3).with_size_bounds(0, 12).with_n_init(1);

    let result = kmeans_constrained_with(&data.view(), &config, &ShortAssignment);

    assert!(matches!(result, Err(KMeansError::InvalidData(_))));
}

#[test]
fn test_greedy_assigner_without_refinement() {
    let data = generate_clustered_data(60, 2, 3, 10);
    let config = KMeansConfig::new(3)
        .with_size_bounds(20, 20)
        .with_refine_passes(0);

    let plain = kmeans_constrained_with(&data.view(), &config, &GreedyRepairAssigner::new(0))
        .unwrap();

    assert_eq!(plain.cluster_sizes(), vec![20, 20, 20]);
}
