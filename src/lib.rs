#![doc = include_str!("../README.md")]

mod error;

pub mod common;
pub mod table;
pub mod walk;

pub use crate::common::{ClosestNodes, Id, Node, Pubkey};
pub use crate::table::{Table, BUCKET_SIZE};
pub use crate::walk::{
    lookup_distances, run_walk, LookupRoute, Query, RandomRouteV4, RandomRouteV5, Route, Shutdown,
    ShutdownHandle, Target, Walk, WalkIterator, WalkTransport, ALPHA,
};
pub use error::Error;

// Alias Result to be the crate Result.
pub type Result<T, E = error::Error> = core::result::Result<T, E>;
