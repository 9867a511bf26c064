//! A walk is a bounded-concurrency iterative traversal of the overlay:
//! pick a peer, ask it for more peers, feed the replies back into the
//! selection strategy.

mod lookup;
mod random;
mod runner;


use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::common::{Id, Node, Pubkey};
use crate::table::Table;
use crate::Error;

pub use lookup::{lookup_distances, LookupRoute, LOOKUP_REQUEST_LIMIT};
pub use random::{RandomRouteV4, RandomRouteV5, RANDOM_ROUTE_BUFFER};
pub use runner::{run_walk, Shutdown, ShutdownHandle, WalkIterator, WalkTransport};

/// The Kademlia concurrency parameter: the maximum number of queries a walk
/// keeps outstanding.
pub const ALPHA: usize = 3;

#[derive(Debug, Clone)]
/// The per-query payload a route attaches to its hops. Opaque to the walk;
/// the transport receives it verbatim.
pub enum Target {
    /// An identifier lookup (v5 `FINDNODE`).
    Id(Id),
    /// Bucket contents at the given log-distances (v5 random walk).
    Distances(Vec<u16>),
    /// A pubkey-shaped target (v4 lookups and v4 random walk).
    Pubkey(Pubkey),
}

#[derive(Debug)]
/// A single pending or completed request to one peer.
///
/// Created by [Walk::advance], completed by a [WalkTransport], retired by
/// [Walk::handle_response].
pub struct Query {
    /// The peer this query is addressed to.
    pub node: Node,
    /// The route's payload for this hop.
    pub target: Target,
    /// Peers the transport decoded out of the reply. Empty on failure.
    pub response: Vec<Node>,
    /// The transport's failure, if the query did not complete normally.
    pub error: Option<Error>,
}

impl Query {
    fn new(node: Node, target: Target) -> Self {
        Query {
            node,
            target,
            response: Vec::new(),
            error: None,
        }
    }
}

/// The peer-selection strategy driving a walk.
///
/// The walk owns its route exclusively and calls it from one thread; the
/// route never sees a node twice (replies are de-duplicated before
/// [Route::add_found_nodes]).
pub trait Route: Send {
    /// Seed internal state from the table. Returning false aborts the walk
    /// before any query is issued.
    fn init(&mut self, table: &dyn Table) -> bool;

    /// The next peer to query and the payload to attach. `None` means the
    /// strategy has nothing to offer right now; it may still produce hops
    /// after absorbing more replies.
    fn next_hop(&mut self) -> (Option<Node>, Target);

    /// Absorb newly discovered peers.
    fn add_found_nodes(&mut self, nodes: &[Node]);

    /// The walk's output after termination. Empty for sampling routes.
    fn result(&self) -> Vec<Node>;
}

/// The walk state machine: de-duplication, α-parallelism, termination.
///
/// Single-threaded and cooperative; drive it with [Walk::advance] and
/// [Walk::handle_response], or hand it to [run_walk] / [WalkIterator].
pub struct Walk {
    table: Arc<dyn Table>,
    route: Box<dyn Route>,
    seen: HashSet<Id>,
    reply_buffer: Vec<Node>,
    queries: usize,
    inited: bool,
}

impl Walk {
    pub fn new(table: Arc<dyn Table>, route: Box<dyn Route>) -> Self {
        let mut seen = HashSet::new();
        seen.insert(table.self_id());

        Walk {
            table,
            route,
            seen,
            reply_buffer: Vec::new(),
            queries: 0,
            inited: false,
        }
    }

    // === Getters ===

    /// The number of queries issued but not yet retired. Never exceeds
    /// [ALPHA].
    pub fn queries_in_flight(&self) -> usize {
        self.queries
    }

    /// The route's current output. Stable once [Walk::advance] has reported
    /// the walk done.
    pub fn result(&self) -> Vec<Node> {
        self.route.result()
    }

    // === Public Methods ===

    /// Take one step: either produce a query to dispatch, or report state.
    ///
    /// Returns `(None, true)` when the walk is over: the route has no hop to
    /// offer and no reply is pending that could refill it. Returns
    /// `(None, false)` when the caller must retire a response first (the α
    /// cap is reached, or the route is waiting on replies).
    pub fn advance(&mut self) -> (Option<Query>, bool) {
        if !self.inited {
            self.inited = true;
            if !self.route.init(self.table.as_ref()) {
                debug!("Route found no seed nodes, walk is over");
                return (None, true);
            }
        }

        if self.queries >= ALPHA {
            return (None, false);
        }

        let (node, target) = self.route.next_hop();
        let query = node.map(|node| {
            self.seen.insert(*node.id());
            self.queries += 1;
            trace!(id = ?node.id(), in_flight = self.queries, "Issuing query");

            Query::new(node, target)
        });

        (query, self.queries == 0)
    }

    /// Retire a completed query: de-duplicate its reply, forward the novel
    /// nodes to the route, and report liveness to the table.
    pub fn handle_response(&mut self, query: Query) {
        // The node is considered live when it participated: it returned
        // something and the transport did not fail.
        let success = query.error.is_none() && !query.response.is_empty();

        self.reply_buffer.clear();
        for node in query.response {
            if self.seen.insert(*node.id()) {
                self.reply_buffer.push(node);
            }
        }

        trace!(
            id = ?query.node.id(),
            novel = self.reply_buffer.len(),
            error = ?query.error,
            "Query completed"
        );

        self.route.add_found_nodes(&self.reply_buffer);
        self.queries -= 1;

        self.table
            .track_request(&query.node, success, &self.reply_buffer);
    }
}
