//! Sampling route: a reservoir-style random walk across the overlay.
//!
//! Produces no result of its own; its purpose is to drive a
//! [WalkIterator](crate::walk::WalkIterator) that yields every hop.

use rand::{Rng, RngCore};

use crate::common::{Node, Pubkey};
use crate::table::Table;
use crate::walk::{Route, Target};

/// The capacity of the random route's candidate buffer.
pub const RANDOM_ROUTE_BUFFER: usize = 32;

/// The bucket distances a v5 random walk asks every hop for.
const FURTHEST_BUCKETS: [u16; 4] = [256, 255, 254, 253];

/// The shared core of both random-walk variants: a bounded candidate buffer
/// refilled from replies with reservoir-style replacement.
struct RandomRoute {
    buf: Vec<Node>,
    rng: Box<dyn RngCore + Send>,
}

impl RandomRoute {
    fn new(rng: Box<dyn RngCore + Send>) -> Self {
        RandomRoute {
            buf: Vec::with_capacity(RANDOM_ROUTE_BUFFER),
            rng,
        }
    }

    fn init(&mut self, table: &dyn Table) -> bool {
        self.buf = table.read_random_nodes(RANDOM_ROUTE_BUFFER);
        !self.buf.is_empty()
    }

    /// Selects the next hop and removes it from the buffer.
    fn next_node(&mut self) -> Option<Node> {
        if self.buf.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..self.buf.len());
        Some(self.buf.swap_remove(index))
    }

    /// Adds two random nodes from the response to the route buffer. We add
    /// two because we want the buffer to grow if it isn't full, but also want
    /// to limit the contribution of any particular hop to the walk.
    fn add_found_nodes(&mut self, nodes: &[Node]) {
        match nodes.len() {
            0 => {}
            1 => self.add(nodes[0].clone()),
            len => {
                let i1 = self.rng.gen_range(0..len);
                let mut i2 = i1;
                while i2 == i1 {
                    i2 = self.rng.gen_range(0..len);
                }
                self.add(nodes[i1].clone());
                self.add(nodes[i2].clone());
            }
        }
    }

    fn add(&mut self, node: Node) {
        // An id may reach the buffer only once; a duplicate would make the
        // walk visit the node twice.
        if self.buf.iter().any(|n| n.id() == node.id()) {
            return;
        }

        if self.buf.len() < RANDOM_ROUTE_BUFFER {
            self.buf.push(node);
        } else {
            let index = self.rng.gen_range(0..self.buf.len());
            self.buf[index] = node;
        }
    }
}

/// A random walk speaking the v4 wire format: every hop is asked for the
/// neighbors of a freshly sampled pubkey-shaped target.
pub struct RandomRouteV4 {
    route: RandomRoute,
}

impl RandomRouteV4 {
    pub fn new<R: RngCore + Send + 'static>(rng: R) -> Self {
        RandomRouteV4 {
            route: RandomRoute::new(Box::new(rng)),
        }
    }
}

impl Route for RandomRouteV4 {
    fn init(&mut self, table: &dyn Table) -> bool {
        self.route.init(table)
    }

    fn next_hop(&mut self) -> (Option<Node>, Target) {
        let node = self.route.next_node();
        let mut target = Pubkey::default();
        if node.is_some() {
            self.route.rng.fill_bytes(&mut target.0);
        }
        (node, Target::Pubkey(target))
    }

    fn add_found_nodes(&mut self, nodes: &[Node]) {
        self.route.add_found_nodes(nodes)
    }

    fn result(&self) -> Vec<Node> {
        Vec::new()
    }
}

/// A random walk speaking the v5 wire format: every hop is asked for the
/// contents of its furthest buckets.
pub struct RandomRouteV5 {
    route: RandomRoute,
}

impl RandomRouteV5 {
    pub fn new<R: RngCore + Send + 'static>(rng: R) -> Self {
        RandomRouteV5 {
            route: RandomRoute::new(Box::new(rng)),
        }
    }
}

impl Route for RandomRouteV5 {
    fn init(&mut self, table: &dyn Table) -> bool {
        self.route.init(table)
    }

    fn next_hop(&mut self) -> (Option<Node>, Target) {
        (self.route.next_node(), Target::Distances(FURTHEST_BUCKETS.to_vec()))
    }

    fn add_found_nodes(&mut self, nodes: &[Node]) {
        self.route.add_found_nodes(nodes)
    }

    fn result(&self) -> Vec<Node> {
        Vec::new()
    }
}
