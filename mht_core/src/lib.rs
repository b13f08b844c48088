//! Multiple hypothesis tracking for 2D and 3D point detections.
//!
//! Given a time-ordered sequence of frames, each holding zero or more point
//! observations, the tracker maintains a population of assignment hypotheses
//! and per frame:
//!
//! 1. **Expands** every hypothesis by every detection and by a
//!    missed-detection placeholder, scoring each branch with a scalar-gated
//!    Kalman filter ([`kalman`]).
//! 2. **Selects** the best set of non-conflicting hypotheses by solving a
//!    maximum weighted independent set over the conflict graph ([`graph`]).
//! 3. **Prunes** the population with N-scan commitment, a per-root branch
//!    budget, and a consecutive-miss limit ([`pool`]).
//!
//! The result is a small set of tracks — per-frame coordinate sequences with
//! `None` in missed slots — that best explain the observations. Runs are
//! deterministic: every tie-break is specified on hypothesis ids.

pub mod conflict;
pub mod engine;
pub mod error;
pub mod graph;
pub mod kalman;
pub mod params;
pub mod pool;

// Re-export key types for convenience
pub use conflict::{ConflictIndex, DetectionId, HistoryRef, Slot};
pub use engine::{MhtEngine, Track, Vector};
pub use error::MhtError;
pub use graph::WeightedGraph;
pub use kalman::{KalmanTrack, UpdateOutcome};
pub use params::MhtParams;
pub use pool::{Hypothesis, HypothesisPool, RootId};
