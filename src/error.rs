//! Main Crate Error

#[derive(thiserror::Error, Debug)]
/// Kadwalk crate error enum.
pub enum Error {
    /// Indicates that an Id was built from a byte slice of the wrong length.
    #[error("Invalid Id size, expected 32, got {0}")]
    InvalidIdSize(usize),

    /// The transport gave up waiting for the queried node.
    #[error("Request timed out")]
    Timeout,

    /// The transport has no way to reach the queried node.
    #[error("Unknown destination node")]
    UnknownNode,

    /// The walk was shut down while the query was in flight.
    #[error("Walk was shut down")]
    Shutdown,
}
