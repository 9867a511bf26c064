//! Concurrent harnesses pumping a [Walk] against a transport: a blocking
//! runner that returns the route's result, and an iterator that yields every
//! hop as it is visited.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::common::Node;
use crate::walk::{Query, Walk, ALPHA};

/// Executes a single query against the network.
///
/// May be shared across walks; must accept concurrent calls.
pub trait WalkTransport: Send + Sync {
    /// Populate `query.response` and/or `query.error` before returning.
    /// Must return promptly once `shutdown` is signalled, with whatever
    /// partial response it has (possibly none).
    fn run_lookup_query(&self, shutdown: &Shutdown, query: &mut Query);
}

/// The signalling end of a walk's cancellation pair. Dropping it (or calling
/// [ShutdownHandle::shutdown]) cancels the walk.
pub struct ShutdownHandle {
    _tx: flume::Sender<()>,
}

impl ShutdownHandle {
    /// Cancel the associated walk.
    pub fn shutdown(self) {}
}

#[derive(Clone)]
/// The observable end of a walk's cancellation pair.
///
/// Once signalled, runners stop dispatching new queries; transports should
/// return promptly.
pub struct Shutdown {
    rx: flume::Receiver<()>,
    _hold: Option<flume::Sender<()>>,
}

impl Shutdown {
    /// A connected cancellation pair.
    pub fn new() -> (ShutdownHandle, Shutdown) {
        let (tx, rx) = flume::bounded(0);
        (ShutdownHandle { _tx: tx }, Shutdown { rx, _hold: None })
    }

    /// A signal that never fires, for walks that run to natural termination.
    pub fn never() -> Shutdown {
        let (tx, rx) = flume::bounded(0);
        Shutdown {
            rx,
            _hold: Some(tx),
        }
    }

    /// Returns true once the handle has been dropped.
    pub fn is_signalled(&self) -> bool {
        self.rx.is_disconnected()
    }

    /// The channel to select on; it disconnects when the walk is cancelled.
    pub fn receiver(&self) -> &flume::Receiver<()> {
        &self.rx
    }
}

enum Event {
    Reply(Query),
    Shutdown,
}

/// Steps through a walk against the transport and returns the result nodes
/// collected by the route.
///
/// Dispatches up to [ALPHA] queries in parallel. On cancellation, stops
/// issuing new queries, drains the outstanding ones, and returns whatever
/// the route holds at that point.
pub fn run_walk<T>(transport: &T, walk: &mut Walk, shutdown: &Shutdown) -> Vec<Node>
where
    T: WalkTransport + ?Sized,
{
    let (reply_tx, reply_rx) = flume::bounded::<Query>(ALPHA);

    thread::scope(|scope| {
        let mut stopped = shutdown.is_signalled();
        loop {
            // Issue queries until the walk has nothing more to dispatch.
            while !stopped {
                let (query, done) = walk.advance();
                if done {
                    let result = walk.result();
                    debug!(nodes = result.len(), "Walk finished");
                    return result;
                }
                let Some(mut query) = query else { break };

                let reply_tx = reply_tx.clone();
                scope.spawn(move || {
                    transport.run_lookup_query(shutdown, &mut query);
                    let _ = reply_tx.send(query);
                });
            }

            if stopped {
                // No new hops after cancellation; drain what is in flight.
                while walk.queries_in_flight() > 0 {
                    match reply_rx.recv() {
                        Ok(query) => walk.handle_response(query),
                        Err(_) => break,
                    }
                }
                let result = walk.result();
                debug!(nodes = result.len(), "Walk cancelled");
                return result;
            }

            let event = flume::Selector::new()
                .recv(&reply_rx, |reply| match reply {
                    Ok(query) => Event::Reply(query),
                    Err(_) => Event::Shutdown,
                })
                .recv(shutdown.receiver(), |_| Event::Shutdown)
                .wait();

            match event {
                Event::Reply(query) => walk.handle_response(query),
                Event::Shutdown => stopped = true,
            }
        }
    })
}

/// Steps through a walk, yielding every node it visits.
///
/// The observable sequence is the hops the walk queries, not the nodes
/// returned in replies. Each yielded hop's query is dispatched in the
/// background; [WalkIterator::close] (also run on drop) cancels the walk and
/// joins the outstanding dispatches.
pub struct WalkIterator {
    walk: Walk,
    transport: Arc<dyn WalkTransport>,
    node: Option<Node>,
    reply_tx: flume::Sender<Query>,
    reply_rx: flume::Receiver<Query>,
    shutdown: Shutdown,
    handle: Option<ShutdownHandle>,
    dispatches: Vec<JoinHandle<()>>,
}

impl WalkIterator {
    pub fn new(walk: Walk, transport: Arc<dyn WalkTransport>) -> Self {
        let (reply_tx, reply_rx) = flume::bounded(ALPHA);
        let (handle, shutdown) = Shutdown::new();

        WalkIterator {
            walk,
            transport,
            node: None,
            reply_tx,
            reply_rx,
            shutdown,
            handle: Some(handle),
            dispatches: Vec::new(),
        }
    }

    /// The hop most recently yielded by `next`. Never the local node.
    pub fn current(&self) -> Option<&Node> {
        self.node.as_ref()
    }

    /// Cancel the walk. In-flight queries are joined and their replies
    /// retired, so the iterator is fully quiescent when this returns.
    pub fn close(&mut self) {
        self.handle.take();

        for handle in self.dispatches.drain(..) {
            let _ = handle.join();
        }
        while let Ok(query) = self.reply_rx.try_recv() {
            self.walk.handle_response(query);
        }

        self.node = None;
    }

    fn dispatch(&mut self, mut query: Query) {
        let transport = Arc::clone(&self.transport);
        let shutdown = self.shutdown.clone();
        let reply_tx = self.reply_tx.clone();

        self.dispatches.retain(|handle| !handle.is_finished());
        self.dispatches.push(thread::spawn(move || {
            transport.run_lookup_query(&shutdown, &mut query);
            let _ = reply_tx.send(query);
        }));
    }
}

impl Iterator for WalkIterator {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        if self.shutdown.is_signalled() {
            self.node = None;
            return None;
        }

        // Go to the next hop.
        loop {
            let (query, done) = self.walk.advance();
            if done {
                self.close();
                return None;
            }
            if let Some(query) = query {
                self.node = Some(query.node.clone());
                self.dispatch(query);
                return self.node.clone();
            }

            // Need to wait for a response to proceed.
            let event = flume::Selector::new()
                .recv(&self.reply_rx, |reply| match reply {
                    Ok(query) => Event::Reply(query),
                    Err(_) => Event::Shutdown,
                })
                .recv(self.shutdown.receiver(), |_| Event::Shutdown)
                .wait();

            match event {
                Event::Reply(query) => self.walk.handle_response(query),
                Event::Shutdown => {
                    self.node = None;
                    return None;
                }
            }
        }
    }
}

impl Drop for WalkIterator {
    fn drop(&mut self) {
        self.close();
    }
}
