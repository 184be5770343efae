/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvergenceStatus {
    /// No point changed cluster in the last iteration
    Converged,
    /// Total centroid movement fell below the tolerance
    CentroidsStable,
    /// The iteration budget ran out first
    IterationCap,
}

impl ConvergenceStatus {
    /// `false` only when the run was cut off by the iteration cap
    pub fn converged(&self) -> bool {
        !matches!(self, ConvergenceStatus::IterationCap)
    }
}

/// Outcome of a convergence check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Stop(ConvergenceStatus),
}

/// Stopping rule for the assign/update loop
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceChecker {
    max_iters: usize,
    tol: f64,
}

impl ConvergenceChecker {
    /// A negative `tol` disables the centroid-shift rule.
    pub fn new(max_iters: usize, tol: f64) -> Self {
        Self { max_iters, tol }
    }

    /// Decide whether to run another iteration.
    ///
    /// `iteration` is 1-based. An unchanged assignment wins over the other
    /// rules, so a run that settles on its last allowed iteration still
    /// reports `Converged`.
    pub fn check(&self, iteration: usize, changed: bool, shift: f64) -> Step {
        if !changed {
            Step::Stop(ConvergenceStatus::Converged)
        } else if self.tol >= 0.0 && shift < self.tol {
            Step::Stop(ConvergenceStatus::CentroidsStable)
        } else if iteration >= self.max_iters {
            Step::Stop(ConvergenceStatus::IterationCap)
        } else {
            Step::Continue
        }
    }
}
