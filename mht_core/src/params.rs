//! Tracker configuration.

use serde::{Deserialize, Serialize};

use crate::error::MhtError;

/// Configuration for a tracking run.
///
/// Field names are descriptive; the single-letter forms in parentheses are
/// the conventional symbols used by the parameter file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MhtParams {
    /// Image area in pixel units (`v`). Sets the missed-detection score
    /// `ln(1 - 1/v)`.
    pub image_area: f64,

    /// Gating threshold on the squared Mahalanobis distance (`dth`).
    pub gating_area: f64,

    /// Seed value for the Kalman gain (`k`). Replaced on the first accepted
    /// measurement update; carried for parameter-file compatibility.
    pub initial_gain: f64,

    /// Process-noise scale (`q`), applied as Q = qI.
    pub process_noise: f64,

    /// Measurement-noise scalar (`r`).
    pub measurement_noise: f64,

    /// N-scan pruning look-back in frames (`n`).
    pub scan_depth: usize,

    /// Maximum number of branches kept per root (`bth`).
    pub branch_limit: usize,

    /// Maximum consecutive missed detections before a hypothesis is culled
    /// (`nmiss`).
    pub miss_limit: usize,
}

impl Default for MhtParams {
    fn default() -> Self {
        Self {
            image_area: 307_200.0, // 640x480
            gating_area: 1_000.0,
            initial_gain: 0.0,
            process_noise: 1e-5,
            measurement_noise: 0.01,
            scan_depth: 1,
            branch_limit: 100,
            miss_limit: 3,
        }
    }
}

impl MhtParams {
    /// Check every value before a run starts. Configuration errors abort;
    /// there is no partial run.
    pub fn validate(&self) -> Result<(), MhtError> {
        if !self.image_area.is_finite() || self.image_area <= 1.0 {
            return Err(MhtError::InvalidParameter {
                name: "v",
                reason: format!("image area must be finite and > 1, got {}", self.image_area),
            });
        }
        if !self.gating_area.is_finite() || self.gating_area < 0.0 {
            return Err(MhtError::InvalidParameter {
                name: "dth",
                reason: format!("gating area must be finite and >= 0, got {}", self.gating_area),
            });
        }
        if !self.initial_gain.is_finite() {
            return Err(MhtError::InvalidParameter {
                name: "k",
                reason: format!("initial gain must be finite, got {}", self.initial_gain),
            });
        }
        if !self.process_noise.is_finite() || self.process_noise < 0.0 {
            return Err(MhtError::InvalidParameter {
                name: "q",
                reason: format!("process noise must be finite and >= 0, got {}", self.process_noise),
            });
        }
        if !self.measurement_noise.is_finite() || self.measurement_noise <= 0.0 {
            return Err(MhtError::InvalidParameter {
                name: "r",
                reason: format!(
                    "measurement noise must be finite and > 0, got {}",
                    self.measurement_noise
                ),
            });
        }
        if self.branch_limit == 0 {
            return Err(MhtError::InvalidParameter {
                name: "bth",
                reason: "branch limit must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Log-likelihood contribution of a missed detection, `ln(1 - 1/v)`.
    /// Also the initial score of a freshly seeded hypothesis.
    pub fn missed_detection_score(&self) -> f64 {
        (1.0 - 1.0 / self.image_area).ln()
    }
}
