//! Hypothesis pool: track-tree expansion and pruning.
//!
//! The pool owns every live hypothesis. Per frame it expands the population
//! (detection branches, miss branches, fresh roots), builds the conflict
//! graph over it, and afterwards applies the N-scan and B-threshold pruning
//! rules against the selected global hypothesis. Hypothesis ids are dense
//! and assigned in a fixed order, so every downstream tie-break is
//! reproducible.

use std::collections::HashMap;

use nalgebra::DVector;
use tracing::debug;

use crate::conflict::{ConflictIndex, DetectionId, HistoryRef, Slot};
use crate::graph::WeightedGraph;
use crate::kalman::{KalmanTrack, UpdateOutcome};
use crate::params::MhtParams;

/// Identity of the (frame, detection) a hypothesis was seeded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId {
    pub frame: usize,
    pub detection: DetectionId,
}

/// One candidate assignment chain and its filter.
#[derive(Debug, Clone)]
pub struct Hypothesis {
    head: HistoryRef,
    birth_frame: usize,
    root: RootId,
    filter: KalmanTrack,
}

impl Hypothesis {
    pub fn score(&self) -> f64 {
        self.filter.score()
    }

    pub fn root(&self) -> RootId {
        self.root
    }

    pub fn birth_frame(&self) -> usize {
        self.birth_frame
    }

    pub fn miss_streak(&self) -> usize {
        self.filter.miss_streak()
    }
}

/// The set of live hypotheses plus the shared history arena.
#[derive(Debug)]
pub struct HypothesisPool {
    hypotheses: Vec<Hypothesis>,
    index: ConflictIndex,
    params: MhtParams,
}

impl HypothesisPool {
    pub fn new(params: MhtParams) -> Self {
        Self {
            hypotheses: Vec::new(),
            index: ConflictIndex::new(),
            params,
        }
    }

    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }

    pub fn hypothesis(&self, id: usize) -> &Hypothesis {
        &self.hypotheses[id]
    }

    pub fn hypotheses(&self) -> impl Iterator<Item = &Hypothesis> {
        self.hypotheses.iter()
    }

    /// The hypothesis's assignment at an absolute frame, `None` outside its
    /// lifetime.
    pub fn slot_at(&self, id: usize, frame: usize) -> Option<Slot> {
        self.index.slot_at(self.hypotheses[id].head, frame)
    }

    /// Number of populated history slots of a live hypothesis.
    pub fn history_len(&self, id: usize) -> usize {
        self.index.history_len(self.hypotheses[id].head)
    }

    /// True iff two live hypotheses claim the same detection at some frame.
    pub fn conflict(&self, a: usize, b: usize) -> bool {
        self.index
            .conflict(self.hypotheses[a].head, self.hypotheses[b].head)
    }

    /// Grow the population for frame `frame`.
    ///
    /// Every pre-frame hypothesis is branched on every detection (branches
    /// whose update is gated out or culled are dropped on the spot) and then
    /// miss-extended in place; finally every detection seeds a fresh root.
    /// The resulting id order is: surviving miss extensions in pre-frame
    /// order, then detection branches in pre-frame x detection order, then
    /// roots in detection order.
    pub fn expand(&mut self, frame: usize, detections: &[DVector<f64>]) {
        let pre = std::mem::take(&mut self.hypotheses);
        let mut misses = Vec::with_capacity(pre.len());
        let mut branches = Vec::new();

        for mut hypothesis in pre {
            for (det_id, observation) in detections.iter().enumerate() {
                let mut branch = hypothesis.clone();
                match branch.filter.update(Some(observation)) {
                    UpdateOutcome::Accepted => {
                        branch.head =
                            self.index
                                .extend(hypothesis.head, frame, Slot::Detection(det_id));
                        branches.push(branch);
                    }
                    // A branch never claims a detection its filter refused.
                    UpdateOutcome::Gated | UpdateOutcome::Cull => {}
                }
            }

            match hypothesis.filter.update(None) {
                UpdateOutcome::Cull => {}
                _ => {
                    hypothesis.head = self.index.extend(hypothesis.head, frame, Slot::Miss);
                    misses.push(hypothesis);
                }
            }
        }

        let mut roots = Vec::with_capacity(detections.len());
        for (det_id, observation) in detections.iter().enumerate() {
            let head = self.index.seed(frame, Slot::Detection(det_id));
            roots.push(Hypothesis {
                head,
                birth_frame: frame,
                root: RootId {
                    frame,
                    detection: det_id,
                },
                filter: KalmanTrack::new(observation, &self.params),
            });
        }

        debug!(
            frame,
            misses = misses.len(),
            branches = branches.len(),
            roots = roots.len(),
            "expanded hypothesis pool"
        );

        self.hypotheses = misses;
        self.hypotheses.append(&mut branches);
        self.hypotheses.append(&mut roots);
    }

    /// Conflict graph over the live population, vertex weights = scores.
    ///
    /// Built from a (frame, detection) -> claimants map, so cost scales with
    /// the number of actual conflicts rather than all pairs.
    pub fn build_graph(&self) -> WeightedGraph {
        let mut graph = WeightedGraph::new();
        for hypothesis in &self.hypotheses {
            graph.add_weighted_vertex(hypothesis.score());
        }

        let mut claimants: HashMap<(usize, DetectionId), Vec<usize>> = HashMap::new();
        for (id, hypothesis) in self.hypotheses.iter().enumerate() {
            self.index.for_each_claim(hypothesis.head, |frame, det_id| {
                claimants.entry((frame, det_id)).or_default().push(id);
            });
        }

        for ids in claimants.values() {
            for (i, &a) in ids.iter().enumerate() {
                for &b in &ids[i + 1..] {
                    graph.add_edge(a, b);
                }
            }
        }
        graph
    }

    /// Apply the N-scan and B-threshold rules after a solution has been
    /// selected at frame `frame`, then compact ids in a stable order.
    /// (The N-miss rule needs no work here: hypotheses past their miss limit
    /// were already dropped during expansion.)
    pub fn prune(&mut self, frame: usize, solution: &[usize]) {
        let mut marked = vec![false; self.hypotheses.len()];
        self.mark_scan_prune(frame, solution, &mut marked);
        self.mark_branch_overflow(&mut marked);

        let before = self.hypotheses.len();
        let mut keep = marked.iter().map(|&m| !m);
        self.hypotheses.retain(|_| keep.next().unwrap_or(false));
        debug!(
            frame,
            pruned = before - self.hypotheses.len(),
            live = self.hypotheses.len(),
            "pruned hypothesis pool"
        );
    }

    /// N-scan: at frame k the solution's assignment at frame k - N becomes
    /// committed; any non-solution hypothesis holding one of the committed
    /// detections at that frame is deleted.
    fn mark_scan_prune(&self, frame: usize, solution: &[usize], marked: &mut [bool]) {
        let prune_index = frame.saturating_sub(self.params.scan_depth);

        let mut committed = Vec::new();
        for &id in solution {
            if let Some(Slot::Detection(det_id)) = self.slot_at(id, prune_index) {
                committed.push(det_id);
            }
        }
        if committed.is_empty() {
            return;
        }

        for (id, _) in self.hypotheses.iter().enumerate() {
            if solution.contains(&id) {
                continue;
            }
            if let Some(Slot::Detection(det_id)) = self.slot_at(id, prune_index) {
                if committed.contains(&det_id) {
                    marked[id] = true;
                }
            }
        }
    }

    /// B-threshold: within each root's surviving branches, keep the top
    /// `bth` by score (larger score first, then smaller id).
    fn mark_branch_overflow(&self, marked: &mut [bool]) {
        let mut groups: HashMap<RootId, Vec<usize>> = HashMap::new();
        for (id, hypothesis) in self.hypotheses.iter().enumerate() {
            if !marked[id] {
                groups.entry(hypothesis.root).or_default().push(id);
            }
        }

        for ids in groups.values_mut() {
            if ids.len() <= self.params.branch_limit {
                continue;
            }
            ids.sort_by(|&a, &b| {
                self.hypotheses[b]
                    .score()
                    .partial_cmp(&self.hypotheses[a].score())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.cmp(&b))
            });
            for &id in &ids[self.params.branch_limit..] {
                marked[id] = true;
            }
        }
    }
}
