//! The routing-table interface a walk reads its peers from.

use crate::common::{Id, Node};

/// K = the maximum number of peers per bucket, and the size of a lookup's
/// nearest-list.
pub const BUCKET_SIZE: usize = 16;

/// Log-distances at or below this value collapse into the table's first
/// bucket; tables keep one bucket per distance above it.
pub const BUCKET_MIN_DISTANCE: u16 = 239;

/// The number of buckets a table keyed this way ends up with.
pub const N_BUCKETS: usize = 17;

/// Read access to the routing table a walk draws its peers from.
///
/// The walk holds a shared reference for its whole lifetime and calls these
/// methods from its owning thread only, but implementations must tolerate
/// multiple walks running against the same table concurrently.
pub trait Table: Send + Sync {
    /// The local node's Id. The walk never visits it and strips it from
    /// replies.
    fn self_id(&self) -> Id;

    /// Up to `max` nodes sampled from the table's buckets at random.
    fn read_random_nodes(&self, max: usize) -> Vec<Node>;

    /// Up to `k` known nodes closest to `target`, nearest first. With
    /// `live_only` the table may restrict itself to recently verified peers.
    fn find_by_id(&self, target: &Id, k: usize, live_only: bool) -> Vec<Node>;

    /// Liveness feedback after a query to `node` completed. `success` means
    /// the node participated; `novel_nodes` are the previously unseen peers
    /// its reply contributed. Advisory only.
    fn track_request(&self, node: &Node, success: bool, novel_nodes: &[Node]);
}
