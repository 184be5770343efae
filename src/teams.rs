//! Team formation on top of constrained k-means.
//!
//! Individuals arrive as [`Point`]s (an identifier plus a feature vector).
//! [`TeamBuilder`] packs them into a matrix, optionally standardizes the
//! features, and clusters them into teams whose sizes stay within bounds.

use crate::algorithm::kmeans_constrained;
use crate::config::KMeansConfig;
use crate::convergence::ConvergenceStatus;
use crate::error::KMeansError;
use ndarray::{Array2, ArrayView2, Axis};
use std::collections::{HashMap, HashSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One individual: an opaque identifier and its feature vector
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub id: String,
    pub features: Vec<f64>,
}

impl Point {
    pub fn new(id: impl Into<String>, features: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            features,
        }
    }
}

/// Standardize each column to zero mean and unit (population) variance.
///
/// Columns with zero variance carry no information and are set to 0.
pub fn zscore_normalize(data: &ArrayView2<f64>) -> Array2<f64> {
    let mut normalized = data.to_owned();
    if data.nrows() == 0 {
        return normalized;
    }

    for (mut column, original) in normalized
        .axis_iter_mut(Axis(1))
        .zip(data.axis_iter(Axis(1)))
    {
        let mean = original.mean().unwrap_or(0.0);
        let std = original.std(0.0);
        if std > 0.0 {
            column.mapv_inplace(|v| (v - mean) / std);
        } else {
            column.fill(0.0);
        }
    }

    normalized
}

/// Validated set of individuals ready to be split into teams
#[derive(Debug, Clone)]
pub struct TeamBuilder {
    ids: Vec<String>,
    data: Array2<f64>,
}

impl TeamBuilder {
    /// Pack points into a feature matrix.
    ///
    /// # Errors
    ///
    /// - `InsufficientData` if `points` is empty
    /// - `InvalidDimensions` if a vector is empty or lengths differ
    /// - `DuplicateIdentifier` if two points share an id
    pub fn new(points: &[Point]) -> Result<Self, KMeansError> {
        let first = points.first().ok_or_else(|| {
            KMeansError::InsufficientData("no points were provided".to_string())
        })?;

        let n_features = first.features.len();
        if n_features == 0 {
            return Err(KMeansError::InvalidDimensions(format!(
                "point '{}' has an empty feature vector",
                first.id
            )));
        }

        let mut seen = HashSet::with_capacity(points.len());
        let mut data = Array2::zeros((points.len(), n_features));
        for (i, point) in points.iter().enumerate() {
            if point.features.len() != n_features {
                return Err(KMeansError::InvalidDimensions(format!(
                    "point '{}' has {} features, expected {}",
                    point.id,
                    point.features.len(),
                    n_features
                )));
            }
            if !seen.insert(point.id.as_str()) {
                return Err(KMeansError::DuplicateIdentifier(point.id.clone()));
            }
            for (j, &value) in point.features.iter().enumerate() {
                data[[i, j]] = value;
            }
        }

        Ok(Self {
            ids: points.iter().map(|p| p.id.clone()).collect(),
            data,
        })
    }

    /// Replace the features with their z-scores.
    pub fn standardize(mut self) -> Self {
        self.data = zscore_normalize(&self.data.view());
        self
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Feature matrix, one row per point in input order
    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Cluster the points into `config.k` teams.
    pub fn form_teams(&self, config: &KMeansConfig) -> Result<TeamAssignment, KMeansError> {
        let result = kmeans_constrained(&self.data.view(), config)?;

        Ok(TeamAssignment {
            index: index_ids(&self.ids),
            ids: self.ids.clone(),
            labels: result.labels.to_vec(),
            n_teams: config.k,
            objective: result.objective,
            n_iterations: result.n_iterations,
            status: result.status,
        })
    }
}

/// Cluster points into size-bounded teams.
///
/// Features are used as given; call [`TeamBuilder::standardize`] first when
/// they live on different scales.
pub fn form_teams(points: &[Point], config: &KMeansConfig) -> Result<TeamAssignment, KMeansError> {
    TeamBuilder::new(points)?.form_teams(config)
}

/// Position of every id in input order
fn index_ids(ids: &[String]) -> HashMap<String, usize> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), i))
        .collect()
}

/// Final team of every individual, plus diagnostics of the run.
///
/// Ids are indexed once on construction, so [`TeamAssignment::team_of`] is a
/// hash lookup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TeamAssignment {
    ids: Vec<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<String, usize>,
    labels: Vec<usize>,
    n_teams: usize,
    pub objective: f64,
    pub n_iterations: usize,
    pub status: ConvergenceStatus,
}

impl TeamAssignment {
    /// Team index of an individual, `None` for unknown ids
    pub fn team_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).map(|&i| self.labels[i])
    }

    /// `(id, team)` pairs in input order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.ids
            .iter()
            .map(String::as_str)
            .zip(self.labels.iter().copied())
    }

    /// Members of each team, in input order within a team
    pub fn teams(&self) -> Vec<Vec<&str>> {
        let mut teams = vec![Vec::new(); self.n_teams];
        for (id, team) in self.iter() {
            teams[team].push(id);
        }
        teams
    }

    pub fn n_teams(&self) -> usize {
        self.n_teams
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn converged(&self) -> bool {
        self.status.converged()
    }
}
