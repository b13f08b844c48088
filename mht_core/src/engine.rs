//! Per-frame driver: expansion, scoring, global hypothesis selection,
//! pruning, and solution emission.

use nalgebra::DVector;
use tracing::{debug, info};

use crate::conflict::Slot;
use crate::error::MhtError;
use crate::params::MhtParams;
use crate::pool::HypothesisPool;

/// A single observation: a point in 2 or 3 dimensions.
pub type Vector = DVector<f64>;

/// One track of the emitted solution: an entry per frame from frame 0 to the
/// latest frame, `None` where the track has no detection (missed or not yet
/// born).
pub type Track = Vec<Option<Vector>>;

/// The tracking engine. Owns the configuration, the hypothesis pool, the
/// per-frame coordinate index, and the most recent global hypothesis.
///
/// Frames are processed strictly in order: expansion, scoring (inside
/// expansion), conflict-graph construction, selection, pruning, emission.
pub struct MhtEngine {
    params: MhtParams,
    pool: HypothesisPool,
    pending: Vec<Vec<Vector>>,
    /// frame -> detection id -> coordinate, for emission.
    coordinates: Vec<Vec<Vector>>,
    frame: usize,
    dims: Option<usize>,
    solution: Vec<Track>,
}

impl MhtEngine {
    /// Build an engine over a finite sequence of per-frame detection lists.
    ///
    /// Fails fast on invalid parameters and on an empty frame sequence.
    pub fn new(frames: Vec<Vec<Vector>>, params: MhtParams) -> Result<Self, MhtError> {
        params.validate()?;
        if frames.is_empty() {
            return Err(MhtError::EmptyRun);
        }
        Ok(Self {
            pool: HypothesisPool::new(params.clone()),
            params,
            pending: frames,
            coordinates: Vec::new(),
            frame: 0,
            dims: None,
            solution: Vec::new(),
        })
    }

    /// Streaming construction: an engine with no frames queued. Feed it with
    /// [`MhtEngine::observe`].
    pub fn streaming(params: MhtParams) -> Result<Self, MhtError> {
        params.validate()?;
        Ok(Self {
            pool: HypothesisPool::new(params.clone()),
            params,
            pending: Vec::new(),
            coordinates: Vec::new(),
            frame: 0,
            dims: None,
            solution: Vec::new(),
        })
    }

    /// Process every queued frame and return the final solution.
    pub fn run(mut self) -> Result<Vec<Track>, MhtError> {
        let frames = std::mem::take(&mut self.pending);
        info!(frames = frames.len(), "starting tracking run");
        for detections in frames {
            self.observe(detections)?;
        }
        info!(tracks = self.solution.len(), "tracking run complete");
        Ok(self.solution)
    }

    /// Feed one frame of detections and refresh the solution.
    pub fn observe(&mut self, detections: Vec<Vector>) -> Result<(), MhtError> {
        let frame = self.frame;
        self.check_dimensions(frame, &detections)?;
        info!(frame, detections = detections.len(), "processing frame");

        self.pool.expand(frame, &detections);
        self.coordinates.push(detections);

        let graph = self.pool.build_graph();
        debug!(frame, hypotheses = graph.vertex_count(), "selecting global hypothesis");
        let solution = graph.mwis();

        self.solution = self.emit(frame, &solution);
        self.pool.prune(frame, &solution);
        self.frame += 1;
        Ok(())
    }

    /// The current global hypothesis as per-track coordinate sequences.
    /// Overwritten on every frame; after the last frame this is the run's
    /// result.
    pub fn solution(&self) -> &[Track] {
        &self.solution
    }

    /// The live hypothesis population.
    pub fn pool(&self) -> &HypothesisPool {
        &self.pool
    }

    pub fn params(&self) -> &MhtParams {
        &self.params
    }

    fn check_dimensions(&mut self, frame: usize, detections: &[Vector]) -> Result<(), MhtError> {
        for detection in detections {
            match self.dims {
                None => self.dims = Some(detection.len()),
                Some(expected) if detection.len() != expected => {
                    return Err(MhtError::DimensionMismatch {
                        frame,
                        expected,
                        found: detection.len(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn emit(&self, frame: usize, solution: &[usize]) -> Vec<Track> {
        solution
            .iter()
            .map(|&id| {
                (0..=frame)
                    .map(|f| match self.pool.slot_at(id, f) {
                        Some(Slot::Detection(det_id)) => Some(self.coordinates[f][det_id].clone()),
                        Some(Slot::Miss) | None => None,
                    })
                    .collect()
            })
            .collect()
    }
}
