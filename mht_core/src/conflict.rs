//! Assignment histories and pairwise conflict detection.
//!
//! Every hypothesis owns a chain of per-frame assignment slots. Chains are
//! stored in a shared append-only arena with parent pointers, so extending a
//! hypothesis appends one node instead of copying its whole history.

/// 0-based detection index, unique within a frame.
pub type DetectionId = usize;

/// One frame's assignment in a hypothesis's history. Frames before the
/// hypothesis's birth have no slot at all and never induce conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The hypothesis claims this detection at this frame.
    Detection(DetectionId),
    /// Missed-detection placeholder.
    Miss,
}

impl Slot {
    /// The concrete detection id, if any.
    pub fn detection(self) -> Option<DetectionId> {
        match self {
            Slot::Detection(id) => Some(id),
            Slot::Miss => None,
        }
    }
}

/// Handle to the newest node of a history chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRef(usize);

#[derive(Debug, Clone, Copy)]
struct HistoryNode {
    parent: Option<usize>,
    frame: usize,
    birth_frame: usize,
    slot: Slot,
}

/// Arena of history chains with the conflict relation over them.
///
/// Two chains conflict iff they hold the same concrete detection id at the
/// same frame.
#[derive(Debug, Default)]
pub struct ConflictIndex {
    nodes: Vec<HistoryNode>,
}

impl ConflictIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new chain at `frame`.
    pub fn seed(&mut self, frame: usize, slot: Slot) -> HistoryRef {
        self.nodes.push(HistoryNode {
            parent: None,
            frame,
            birth_frame: frame,
            slot,
        });
        HistoryRef(self.nodes.len() - 1)
    }

    /// Append one slot to an existing chain. `frame` must directly follow
    /// the chain's newest frame.
    pub fn extend(&mut self, parent: HistoryRef, frame: usize, slot: Slot) -> HistoryRef {
        let parent_node = self.nodes[parent.0];
        debug_assert_eq!(frame, parent_node.frame + 1);
        self.nodes.push(HistoryNode {
            parent: Some(parent.0),
            frame,
            birth_frame: parent_node.birth_frame,
            slot,
        });
        HistoryRef(self.nodes.len() - 1)
    }

    pub fn birth_frame(&self, head: HistoryRef) -> usize {
        self.nodes[head.0].birth_frame
    }

    /// Number of populated slots: newest frame - birth frame + 1.
    pub fn history_len(&self, head: HistoryRef) -> usize {
        let node = self.nodes[head.0];
        node.frame - node.birth_frame + 1
    }

    /// The chain's slot at an absolute frame index. `None` for frames before
    /// birth or after the chain's newest frame.
    pub fn slot_at(&self, head: HistoryRef, frame: usize) -> Option<Slot> {
        let mut node = self.nodes[head.0];
        if frame > node.frame || frame < node.birth_frame {
            return None;
        }
        while node.frame > frame {
            node = self.nodes[node.parent?];
        }
        Some(node.slot)
    }

    /// True iff the two chains claim the same detection at some frame.
    pub fn conflict(&self, a: HistoryRef, b: HistoryRef) -> bool {
        let mut a_node = self.nodes[a.0];
        let mut b_node = self.nodes[b.0];

        // Align the newer chain down to the older one's newest frame.
        while a_node.frame > b_node.frame {
            match a_node.parent {
                Some(parent) => a_node = self.nodes[parent],
                None => return false,
            }
        }
        while b_node.frame > a_node.frame {
            match b_node.parent {
                Some(parent) => b_node = self.nodes[parent],
                None => return false,
            }
        }

        // Walk in lockstep over the overlapping frames.
        loop {
            if let (Slot::Detection(a_id), Slot::Detection(b_id)) = (a_node.slot, b_node.slot) {
                if a_id == b_id {
                    return true;
                }
            }
            match (a_node.parent, b_node.parent) {
                (Some(a_parent), Some(b_parent)) => {
                    a_node = self.nodes[a_parent];
                    b_node = self.nodes[b_parent];
                }
                _ => return false,
            }
        }
    }

    /// True iff the two chains hold the same concrete detection id at `frame`.
    pub fn shares_at(&self, a: HistoryRef, b: HistoryRef, frame: usize) -> bool {
        match (
            self.slot_at(a, frame).and_then(Slot::detection),
            self.slot_at(b, frame).and_then(Slot::detection),
        ) {
            (Some(a_id), Some(b_id)) => a_id == b_id,
            _ => false,
        }
    }

    /// Visit every concrete (frame, detection id) claim of a chain, newest
    /// first.
    pub fn for_each_claim<F: FnMut(usize, DetectionId)>(&self, head: HistoryRef, mut visit: F) {
        let mut index = Some(head.0);
        while let Some(i) = index {
            let node = self.nodes[i];
            if let Slot::Detection(id) = node.slot {
                visit(node.frame, id);
            }
            index = node.parent;
        }
    }
}
