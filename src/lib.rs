//! # teamkmeans-rs
//!
//! Size-constrained k-means clustering in Rust, compatible with ndarray,
//! aimed at splitting a pool of individuals into balanced teams.
//!
//! ## Features
//!
//! - **Size bounds**: every cluster holds between `size_min` and `size_max`
//!   points; impossible bounds are rejected before any work is done
//! - **Greedy assignment with repair**: urgency-ordered placement under
//!   capacity, minimum-size repair, then bounded move/swap refinement
//! - **k-means++ seeding** with an explicit seed for reproducible runs
//! - **Parallel restarts**: `n_init` seeded runs on rayon, best objective kept
//! - **Pluggable solver**: swap in another [`CapacityAssigner`]
//!
//! ## Example
//!
//! ```rust
//! use teamkmeans_rs::{form_teams, KMeansConfig, Point};
//!
//! let points = vec![
//!     Point::new("ada", vec![0.0, 0.0]),
//!     Point::new("bob", vec![0.0, 1.0]),
//!     Point::new("cy", vec![1.0, 0.0]),
//!     Point::new("dee", vec![10.0, 10.0]),
//!     Point::new("eve", vec![10.0, 11.0]),
//!     Point::new("fay", vec![11.0, 10.0]),
//! ];
//!
//! let config = KMeansConfig::new(2).with_size_bounds(3, 3).with_seed(42);
//! let assignment = form_teams(&points, &config).unwrap();
//!
//! assert_eq!(assignment.team_of("ada"), assignment.team_of("cy"));
//! assert_ne!(assignment.team_of("ada"), assignment.team_of("dee"));
//! ```
//!
//! ## Working on matrices
//!
//! ```rust
//! use teamkmeans_rs::{kmeans_constrained, KMeansConfig};
//! use ndarray::Array2;
//! use ndarray_rand::RandomExt;
//! use ndarray_rand::rand_distr::Uniform;
//!
//! let data = Array2::random((100, 8), Uniform::new(-1.0, 1.0));
//!
//! let config = KMeansConfig::new(4)
//!     .with_size_bounds(20, 30)
//!     .with_max_iters(100)
//!     .with_seed(7);
//!
//! let result = kmeans_constrained(&data.view(), &config).unwrap();
//! assert!(result.cluster_sizes().iter().all(|s| (20..=30).contains(s)));
//! ```

mod algorithm;
mod assign;
mod centroid;
mod config;
mod constraint;
mod convergence;
mod distance;
mod error;
mod init;
mod kmeans;
mod teams;

pub use algorithm::{kmeans_constrained, kmeans_constrained_with, KMeansResult};
pub use assign::{CapacityAssigner, GreedyRepairAssigner};
pub use config::KMeansConfig;
pub use constraint::ClusterConstraint;
pub use convergence::ConvergenceStatus;
pub use error::KMeansError;
pub use init::InitMethod;
pub use kmeans::ConstrainedKMeans;
pub use teams::{form_teams, zscore_normalize, Point, TeamAssignment, TeamBuilder};
