//! Struct and implementation of a peer descriptor handed around by walks.
use std::{
    fmt::{self, Debug, Formatter},
    net::SocketAddr,
    sync::Arc,
};

use crate::common::{Id, ID_SIZE};

#[derive(Clone, PartialEq)]
/// A discovered peer: identity, network address, and record metadata.
///
/// Cheap to clone; the inner descriptor is shared. The walk engine itself
/// only ever reads the [Id].
pub struct Node(pub(crate) Arc<NodeInner>);

#[derive(PartialEq)]
pub struct NodeInner {
    pub(crate) id: Id,
    pub(crate) address: SocketAddr,
    pub(crate) seq: u64,
}

impl Debug for Node {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Node")
            .field("id", &self.0.id)
            .field("address", &self.0.address)
            .field("seq", &self.0.seq)
            .finish()
    }
}

impl Node {
    /// Creates a new Node from an id and socket address.
    pub fn new(id: Id, address: SocketAddr) -> Node {
        Node(Arc::new(NodeInner {
            id,
            address,
            seq: 0,
        }))
    }

    /// Returns a copy of this node carrying the given record sequence number.
    pub fn with_seq(&self, seq: u64) -> Node {
        Node(Arc::new(NodeInner {
            id: self.0.id,
            address: self.0.address,
            seq,
        }))
    }

    // === Getters ===

    pub fn id(&self) -> &Id {
        &self.0.id
    }

    pub fn address(&self) -> SocketAddr {
        self.0.address
    }

    /// The sequence number of the record this descriptor was built from.
    pub fn seq(&self) -> u64 {
        self.0.seq
    }

    // === Test helpers ===

    /// Creates a node with a random Id for testing purposes.
    pub fn random() -> Node {
        Node::new(Id::random(), SocketAddr::from(([0, 0, 0, 0], 0)))
    }

    /// Creates a node with an Id and port derived from `i`, so repeated calls
    /// with distinct inputs never collide.
    pub fn unique(i: usize) -> Node {
        let mut bytes = [0u8; ID_SIZE];
        bytes[ID_SIZE - 8..].copy_from_slice(&(i as u64 + 1).to_be_bytes());

        Node::new(Id(bytes), SocketAddr::from(([127, 0, 0, 1], i as u16)))
    }
}
