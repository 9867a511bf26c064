use crate::common::{Id, Node};

#[derive(Debug, Clone)]
/// A list of nodes ordered by their distance to a target, capped at a
/// caller-chosen capacity on every insertion.
pub struct ClosestNodes {
    target: Id,
    nodes: Vec<Node>,
}

impl ClosestNodes {
    /// Create a new instance of [ClosestNodes].
    pub fn new(target: Id) -> Self {
        Self {
            target,
            nodes: Vec::new(),
        }
    }

    // === Getters ===

    /// Returns the target the nodes are ordered around.
    pub fn target(&self) -> Id {
        self.target
    }

    /// Returns a slice of the nodes array, closest first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // === Public Methods ===

    /// Insert a node in distance order, keeping at most `max` entries.
    ///
    /// Inserting an already known id is a no-op. A node farther away than the
    /// `max`-th entry is dropped.
    pub fn push(&mut self, node: Node, max: usize) {
        let key = node.id().xor(&self.target);

        match self
            .nodes
            .binary_search_by(|probe| probe.id().xor(&self.target).cmp(&key))
        {
            // Equal XOR keys against the same target means equal ids.
            Ok(_) => {}
            Err(pos) if pos < max => {
                self.nodes.insert(pos, node);
                self.nodes.truncate(max);
            }
            Err(_) => {}
        }
    }
}
