//! Outcome of a split call.

use crate::errors::SplitError;
use crate::mesh::Mesh;
use crate::split::request::Side;
use std::fmt::Debug;

/// Overall status of a split.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Every requested side was evaluated; some may be legitimately empty.
    Success,
    /// The cutting surface never reaches the source; nothing was produced.
    NoIntersection,
    /// Validation or evaluation failed.
    Failed(SplitError),
}

/// What happened to one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideStatus {
    Populated,
    /// Requested, but no geometry lies on this side.
    EmptyResult,
    NotRequested,
    Failed,
}

/// The pieces produced by a split plus per-side and overall status.
#[derive(Debug, Clone)]
pub struct SplitResult<S: Clone + Send + Sync + Debug> {
    pub positive: Option<Mesh<S>>,
    pub negative: Option<Mesh<S>>,
    pub status: Outcome,
    pub positive_status: SideStatus,
    pub negative_status: SideStatus,
}

/// Successful split pieces, from [`SplitResult::into_result`].
#[derive(Debug, Clone)]
pub struct SplitPieces<S: Clone + Send + Sync + Debug> {
    pub positive: Option<Mesh<S>>,
    pub negative: Option<Mesh<S>>,
}

impl<S: Clone + Send + Sync + Debug> SplitResult<S> {
    /// A result with no pieces: used for validation failures and `NoIntersection`.
    pub(crate) const fn empty(status: Outcome, side_status: SideStatus) -> Self {
        SplitResult {
            positive: None,
            negative: None,
            status,
            positive_status: side_status,
            negative_status: side_status,
        }
    }

    pub(crate) fn failed(error: SplitError) -> Self {
        Self::empty(Outcome::Failed(error), SideStatus::NotRequested)
    }

    pub fn is_success(&self) -> bool {
        self.status == Outcome::Success
    }

    /// Mesh and status for one side.
    pub const fn side(&self, side: Side) -> (Option<&Mesh<S>>, SideStatus) {
        match side {
            Side::Positive => (self.positive.as_ref(), self.positive_status),
            Side::Negative => (self.negative.as_ref(), self.negative_status),
        }
    }

    /// The error, if the split failed.
    pub const fn error(&self) -> Option<&SplitError> {
        match &self.status {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Human-readable summary suitable for a host status bar.
    pub fn message(&self) -> String {
        match &self.status {
            Outcome::Success => {
                let describe = |status: SideStatus| match status {
                    SideStatus::Populated => "kept",
                    SideStatus::EmptyResult => "empty",
                    SideStatus::NotRequested => "not requested",
                    SideStatus::Failed => "failed",
                };
                format!(
                    "split finished: positive side {}, negative side {}",
                    describe(self.positive_status),
                    describe(self.negative_status)
                )
            },
            Outcome::NoIntersection => "the cutting plane does not intersect the object".to_string(),
            Outcome::Failed(e) => e.to_string(),
        }
    }

    /// Convert into a `Result`; `NoIntersection` becomes empty pieces.
    pub fn into_result(self) -> Result<SplitPieces<S>, SplitError> {
        match self.status {
            Outcome::Failed(e) => Err(e),
            Outcome::Success | Outcome::NoIntersection => Ok(SplitPieces {
                positive: self.positive,
                negative: self.negative,
            }),
        }
    }
}
