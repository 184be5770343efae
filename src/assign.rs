//! Capacity-constrained assignment of points to centroids.
//!
//! The exact problem (minimum total squared distance subject to per-cluster
//! size bounds) is a transportation problem; [`GreedyRepairAssigner`] gives up
//! optimality for a greedy pass costing `O(N·K log K + N log N)` plus bounded
//! repair and refinement. Each refinement pass costs `O(N·K log N)`: swaps only
//! pair a point with clusters it is strictly closer to. Any other solver can be
//! plugged into the engine through [`CapacityAssigner`].

use crate::constraint::ClusterConstraint;
use crate::error::KMeansError;
use ndarray::{Array1, ArrayView1, ArrayView2};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Produces an assignment whose cluster sizes respect a [`ClusterConstraint`].
pub trait CapacityAssigner: Sync {
    /// Assign each point to a cluster.
    ///
    /// `distances` has shape (n_samples, k) and holds the squared distance of
    /// every point to every current centroid. The returned labels must give
    /// every cluster between `size_min` and `size_max` points.
    fn assign(
        &self,
        distances: &ArrayView2<f64>,
        constraint: &ClusterConstraint,
    ) -> Result<Array1<usize>, KMeansError>;
}

/// Greedy ranking, minimum-size repair, then bounded local refinement.
///
/// 1. Points with the most unambiguous preference (largest gap between the
///    nearest and second-nearest centroid) are placed first, each into the
///    closest cluster that still has room below `size_max`.
/// 2. While some cluster is below `size_min`, the smallest one takes the point
///    from an over-minimum cluster whose move raises the cost least. Ties go
///    to the donor with the larger surplus, then to the lower point index.
/// 3. Up to `refine_passes` passes of improving single moves and pairwise
///    swaps that keep every cluster within bounds. A point in cluster `a` is
///    only swapped into a cluster `b` it is strictly closer to, against the
///    member of `b` cheapest to move to `a`.
///
/// Equidistant centroids resolve to the lower cluster index throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreedyRepairAssigner {
    pub refine_passes: usize,
}

impl Default for GreedyRepairAssigner {
    fn default() -> Self {
        Self { refine_passes: 3 }
    }
}

impl GreedyRepairAssigner {
    pub fn new(refine_passes: usize) -> Self {
        Self { refine_passes }
    }
}

impl CapacityAssigner for GreedyRepairAssigner {
    fn assign(
        &self,
        distances: &ArrayView2<f64>,
        constraint: &ClusterConstraint,
    ) -> Result<Array1<usize>, KMeansError> {
        let k = distances.ncols();
        if k != constraint.k {
            return Err(KMeansError::InvalidDimensions(format!(
                "Distance matrix has {} columns but constraint expects {} clusters",
                k, constraint.k
            )));
        }

        let mut state = ClusterState::new(distances.nrows(), k);
        greedy_fill(distances, constraint, &mut state)?;
        repair_minimum(distances, constraint, &mut state)?;
        refine(distances, constraint, &mut state, self.refine_passes);

        Ok(Array1::from_vec(state.labels))
    }
}

/// Labels and per-cluster sizes while an assignment is being built
struct ClusterState {
    labels: Vec<usize>,
    sizes: Vec<usize>,
}

impl ClusterState {
    fn new(n_samples: usize, k: usize) -> Self {
        Self {
            labels: vec![0; n_samples],
            sizes: vec![0; k],
        }
    }

    fn place(&mut self, point: usize, cluster: usize) {
        self.labels[point] = cluster;
        self.sizes[cluster] += 1;
    }

    fn relocate(&mut self, point: usize, to: usize) {
        let from = self.labels[point];
        self.sizes[from] -= 1;
        self.sizes[to] += 1;
        self.labels[point] = to;
    }
}

/// Cluster indices ordered by distance, lower index first on ties
fn preference_order(row: &ArrayView1<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by(|&a, &b| row[a].total_cmp(&row[b]).then(a.cmp(&b)));
    order
}

fn greedy_fill(
    distances: &ArrayView2<f64>,
    constraint: &ClusterConstraint,
    state: &mut ClusterState,
) -> Result<(), KMeansError> {
    let n_samples = distances.nrows();

    let preferences: Vec<Vec<usize>> = distances
        .rows()
        .into_iter()
        .map(|row| preference_order(&row))
        .collect();

    let urgency: Vec<f64> = preferences
        .iter()
        .enumerate()
        .map(|(i, pref)| match pref.as_slice() {
            [first, second, ..] => distances[[i, *second]] - distances[[i, *first]],
            _ => 0.0,
        })
        .collect();

    let mut order: Vec<usize> = (0..n_samples).collect();
    order.sort_by(|&a, &b| urgency[b].total_cmp(&urgency[a]).then(a.cmp(&b)));

    for point in order {
        let cluster = preferences[point]
            .iter()
            .copied()
            .find(|&c| state.sizes[c] < constraint.size_max)
            .ok_or_else(|| {
                KMeansError::InfeasibleConstraint(format!(
                    "no cluster has room for point {} (size_max = {})",
                    point, constraint.size_max
                ))
            })?;
        state.place(point, cluster);
    }

    Ok(())
}

fn repair_minimum(
    distances: &ArrayView2<f64>,
    constraint: &ClusterConstraint,
    state: &mut ClusterState,
) -> Result<(), KMeansError> {
    let k = state.sizes.len();

    loop {
        // Most under-filled cluster first
        let receiver = (0..k)
            .filter(|&c| state.sizes[c] < constraint.size_min)
            .min_by(|&a, &b| state.sizes[a].cmp(&state.sizes[b]).then(a.cmp(&b)));
        let Some(receiver) = receiver else {
            return Ok(());
        };

        // (cost increase, donor surplus, point)
        let mut best: Option<(f64, usize, usize)> = None;
        for (point, &donor) in state.labels.iter().enumerate() {
            if donor == receiver || state.sizes[donor] <= constraint.size_min {
                continue;
            }
            let cost = distances[[point, receiver]] - distances[[point, donor]];
            let surplus = state.sizes[donor] - constraint.size_min;
            let better = match best {
                None => true,
                Some((best_cost, best_surplus, _)) => match cost.total_cmp(&best_cost) {
                    Ordering::Less => true,
                    Ordering::Equal => surplus > best_surplus,
                    Ordering::Greater => false,
                },
            };
            if better {
                best = Some((cost, surplus, point));
            }
        }

        let (_, _, point) = best.ok_or_else(|| {
            KMeansError::InfeasibleConstraint(format!(
                "cluster {} is below size_min = {} and no cluster has surplus points",
                receiver, constraint.size_min
            ))
        })?;
        state.relocate(point, receiver);
    }
}

fn refine(
    distances: &ArrayView2<f64>,
    constraint: &ClusterConstraint,
    state: &mut ClusterState,
    passes: usize,
) {
    let n_samples = state.labels.len();
    let k = state.sizes.len();

    for _ in 0..passes {
        let mut improved = false;

        // Single moves into a strictly closer cluster with room
        for point in 0..n_samples {
            let from = state.labels[point];
            if state.sizes[from] <= constraint.size_min {
                continue;
            }
            let mut target = from;
            for c in 0..k {
                if c != from
                    && state.sizes[c] < constraint.size_max
                    && distances[[point, c]] < distances[[point, target]]
                {
                    target = c;
                }
            }
            if target != from {
                state.relocate(point, target);
                improved = true;
            }
        }

        // Swaps keep both sizes unchanged. A point only looks at clusters it is
        // strictly closer to, and in each one at the member cheapest to send back.
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
        for (point, &cluster) in state.labels.iter().enumerate() {
            members[cluster].push(point);
        }
        let mut queues: HashMap<(usize, usize), SwapQueue> = HashMap::new();

        for p in 0..n_samples {
            let a = state.labels[p];
            let row = distances.row(p);
            for b in preference_order(&row) {
                if row[b] >= row[a] {
                    break;
                }
                let queue = queues
                    .entry((b, a))
                    .or_insert_with(|| SwapQueue::new(distances, &members[b], b, a));
                let Some(q) = queue.front(&state.labels) else {
                    continue;
                };
                let gain = (row[a] - row[b]) - (distances[[q, a]] - distances[[q, b]]);
                if gain > 0.0 {
                    state.labels[p] = b;
                    state.labels[q] = a;
                    queue.pop();
                    improved = true;
                    break;
                }
            }
        }

        if !improved {
            break;
        }
    }
}

/// Members of cluster `from` ordered by the cost of moving them to `to`.
///
/// Built from a snapshot of the memberships; entries that have since left
/// `from` are skipped.
struct SwapQueue {
    order: Vec<usize>,
    from: usize,
    cursor: usize,
}

impl SwapQueue {
    fn new(distances: &ArrayView2<f64>, members: &[usize], from: usize, to: usize) -> Self {
        let move_cost = |point: usize| distances[[point, to]] - distances[[point, from]];
        let mut order = members.to_vec();
        order.sort_by(|&x, &y| move_cost(x).total_cmp(&move_cost(y)).then(x.cmp(&y)));
        Self {
            order,
            from,
            cursor: 0,
        }
    }

    fn front(&mut self, labels: &[usize]) -> Option<usize> {
        while let Some(&point) = self.order.get(self.cursor) {
            if labels[point] == self.from {
                return Some(point);
            }
            self.cursor += 1;
        }
        None
    }

    fn pop(&mut self) {
        self.cursor += 1;
    }
}
