//! Target-directed route: classical Kademlia convergence on the k nodes
//! closest to an identifier.

use std::collections::HashSet;

use crate::common::{ClosestNodes, Id, Node, Pubkey};
use crate::table::{Table, BUCKET_SIZE};
use crate::walk::{Route, Target};

/// How many log-distances a single v5 `FINDNODE` request names.
pub const LOOKUP_REQUEST_LIMIT: usize = 3;

/// A route that converges on the peers closest to a target identifier.
///
/// Keeps a nearest-list of capacity [BUCKET_SIZE] and asks each entry once;
/// the walk is over when every candidate has been asked, since any closer
/// peer a candidate knew about would have displaced something in the list.
pub struct LookupRoute {
    target: Target,
    list: ClosestNodes,
    asked: HashSet<Id>,
}

impl LookupRoute {
    /// A lookup carrying a pubkey-shaped target (v4 wire format).
    pub fn new_v4(pubkey: Pubkey) -> Self {
        let id = pubkey.id();
        LookupRoute {
            target: Target::Pubkey(pubkey),
            list: ClosestNodes::new(id),
            asked: HashSet::new(),
        }
    }

    /// A lookup for a plain identifier (v5 wire format).
    pub fn new_v5(target: Id) -> Self {
        LookupRoute {
            target: Target::Id(target),
            list: ClosestNodes::new(target),
            asked: HashSet::new(),
        }
    }
}

impl Route for LookupRoute {
    fn init(&mut self, table: &dyn Table) -> bool {
        let closest = table.find_by_id(&self.list.target(), BUCKET_SIZE, false);
        if closest.is_empty() {
            return false;
        }

        self.asked.clear();
        for node in closest {
            self.list.push(node, BUCKET_SIZE);
        }
        true
    }

    fn next_hop(&mut self) -> (Option<Node>, Target) {
        for node in self.list.nodes() {
            if !self.asked.contains(node.id()) {
                self.asked.insert(*node.id());
                return (Some(node.clone()), self.target.clone());
            }
        }
        (None, self.target.clone())
    }

    fn add_found_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.list.push(node.clone(), BUCKET_SIZE);
        }
    }

    fn result(&self) -> Vec<Node> {
        self.list.nodes().to_vec()
    }
}

/// The distance parameter for a `FINDNODE` request to `dest`.
///
/// Chooses distances adjacent to `logdist(target, dest)`, e.g. for a target
/// with `logdist(target, dest) = 255` the result is `[255, 256, 254]`.
pub fn lookup_distances(target: &Id, dest: &Id) -> Vec<u16> {
    let td = target.log_distance(dest);
    let mut dists = vec![td];

    let mut i = 1;
    while dists.len() < LOOKUP_REQUEST_LIMIT {
        if td + i <= 256 {
            dists.push(td + i);
        }
        if td > i {
            dists.push(td - i);
        }
        i += 1;
    }

    dists
}
