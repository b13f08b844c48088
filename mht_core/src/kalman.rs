//! Scalar-gated Kalman filter over 2D and 3D observations.
//!
//! Identity dynamics: the predicted mean is the posterior mean and the
//! predicted covariance is P + Q. The measurement update uses the entrywise
//! gain K = Σ ⊘ (Σ + r). This is the historical update shape of this
//! tracker, not the standard matrix Kalman update, and it is load-bearing:
//! track scores (and therefore hypothesis selection) depend on it.

use nalgebra::{DMatrix, DVector};

use crate::params::MhtParams;

/// Outcome of folding one frame into a hypothesis's filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The observation (or miss) was folded into the state.
    Accepted,
    /// The observation fell outside the gate. State and score are untouched;
    /// rejection is a silent no-op on the filter.
    Gated,
    /// The hypothesis exceeded its miss limit, or the predicted covariance
    /// degenerated (non-positive determinant).
    Cull,
}

/// Per-hypothesis filter state: posterior mean and covariance plus the
/// running track score and consecutive-miss counter.
#[derive(Debug, Clone)]
pub struct KalmanTrack {
    /// Posterior mean, dimension d.
    mean: DVector<f64>,
    /// Posterior covariance, d x d. Identity at birth.
    covariance: DMatrix<f64>,
    /// Last gain used. Seeded from the `k` parameter, replaced on every
    /// accepted measurement update.
    gain: DMatrix<f64>,
    /// Q = qI.
    process_noise: DMatrix<f64>,
    measurement_noise: f64,
    gating_area: f64,
    /// Precomputed ln(v / 2π) term of the motion score.
    motion_base: f64,
    missed_detection_score: f64,
    track_score: f64,
    miss_streak: usize,
    miss_limit: usize,
}

impl KalmanTrack {
    /// Seed a filter from an initial observation. The initial score is the
    /// missed-detection score; the first motion-score contribution comes
    /// from the first subsequent accepted update.
    pub fn new(initial_observation: &DVector<f64>, params: &MhtParams) -> Self {
        let dims = initial_observation.len();
        let missed_detection_score = params.missed_detection_score();
        Self {
            mean: initial_observation.clone(),
            covariance: DMatrix::identity(dims, dims),
            gain: DMatrix::identity(dims, dims) * params.initial_gain,
            process_noise: DMatrix::identity(dims, dims) * params.process_noise,
            measurement_noise: params.measurement_noise,
            gating_area: params.gating_area,
            motion_base: (params.image_area / (2.0 * std::f64::consts::PI)).ln(),
            missed_detection_score,
            track_score: missed_detection_score,
            miss_streak: 0,
            miss_limit: params.miss_limit,
        }
    }

    /// Fold one frame into the filter: a detection or a miss (`None`).
    ///
    /// Pure with respect to everything but its own state.
    pub fn update(&mut self, observation: Option<&DVector<f64>>) -> UpdateOutcome {
        match observation {
            None => self.update_miss(),
            Some(z) => self.update_detection(z),
        }
    }

    fn update_miss(&mut self) -> UpdateOutcome {
        self.track_score += self.missed_detection_score;
        self.miss_streak += 1;
        if self.miss_streak > self.miss_limit {
            UpdateOutcome::Cull
        } else {
            UpdateOutcome::Accepted
        }
    }

    fn update_detection(&mut self, z: &DVector<f64>) -> UpdateOutcome {
        // Time update. Identity dynamics: mu stays, covariance grows by Q.
        let sigma = &self.covariance + &self.process_noise;

        let det = sigma.determinant();
        if !det.is_finite() || det <= 0.0 {
            return UpdateOutcome::Cull;
        }
        let inverse = match sigma.clone().try_inverse() {
            Some(inverse) => inverse,
            None => return UpdateOutcome::Cull,
        };

        let innovation = z - &self.mean;
        let d_squared = (&inverse * &innovation).dot(&innovation);

        // Gating
        if d_squared > self.gating_area {
            return UpdateOutcome::Gated;
        }

        self.track_score += self.motion_base - 0.5 * det.ln() - d_squared / 2.0;

        // Measurement update with the entrywise gain K = Σ ⊘ (Σ + r).
        let dims = self.mean.len();
        let gain = sigma.component_div(&sigma.add_scalar(self.measurement_noise));
        self.mean += &gain * &innovation;
        self.covariance = (DMatrix::identity(dims, dims) - &gain) * &sigma;
        self.gain = gain;
        self.miss_streak = 0;
        UpdateOutcome::Accepted
    }

    /// Cumulative log-likelihood of the hypothesis this filter backs.
    pub fn score(&self) -> f64 {
        self.track_score
    }

    /// Number of consecutive trailing misses.
    pub fn miss_streak(&self) -> usize {
        self.miss_streak
    }

    /// Posterior mean.
    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    /// The gain applied by the last accepted measurement update (the `k`
    /// seed until then).
    pub fn gain(&self) -> &DMatrix<f64> {
        &self.gain
    }

    #[cfg(test)]
    fn set_covariance(&mut self, covariance: DMatrix<f64>) {
        self.covariance = covariance;
    }
}
