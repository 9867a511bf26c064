//! Kademlia node Id or a lookup target
use std::fmt::{self, Debug, Formatter};

use rand::{Rng, RngCore};
use sha3::{Digest, Keccak256};

use crate::{Error, Result};

/// The size of node IDs in bytes.
pub const ID_SIZE: usize = 32;
/// The log-distance between two maximally distant IDs.
pub const MAX_DISTANCE: u16 = ID_SIZE as u16 * 8;

#[derive(Clone, Copy, PartialEq, Ord, PartialOrd, Eq, Hash)]
/// Kademlia node Id or a lookup target
pub struct Id(pub [u8; ID_SIZE]);

impl Id {
    pub fn random() -> Id {
        Id(rand::thread_rng().gen())
    }

    /// Like [Id::random] but sampled from a caller-supplied source.
    pub fn random_with<R: RngCore>(rng: &mut R) -> Id {
        let mut bytes = [0u8; ID_SIZE];
        rng.fill_bytes(&mut bytes);
        Id(bytes)
    }

    /// Create a new Id from some bytes. Returns Err if `bytes` is not of length
    /// [ID_SIZE].
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Id> {
        let bytes = bytes.as_ref();
        if bytes.len() != ID_SIZE {
            return Err(Error::InvalidIdSize(bytes.len()));
        }

        let mut tmp = [0u8; ID_SIZE];
        tmp.copy_from_slice(bytes);

        Ok(Id(tmp))
    }

    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    /// Log2 of the XOR distance between this Id and another.
    ///
    /// Distance to self is 0.
    /// Distance to the furthest Id is 256.
    /// Distance to an Id with 5 leading matching bits is 251.
    pub fn log_distance(&self, other: &Id) -> u16 {
        for i in 0..ID_SIZE {
            let a = self.0[i];
            let b = other.0[i];

            if a != b {
                // leading zeros so far + leading zeros of this byte
                let leading_zeros = i as u16 * 8 + (a ^ b).leading_zeros() as u16;

                return MAX_DISTANCE - leading_zeros;
            }
        }

        0
    }

    /// The full XOR of this Id and another, for fine-grained distance ordering.
    pub fn xor(&self, other: &Id) -> Id {
        let mut result = [0u8; ID_SIZE];
        for (i, byte) in result.iter_mut().enumerate() {
            *byte = self.0[i] ^ other.0[i];
        }

        Id(result)
    }
}

impl Debug for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Id(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// An uncompressed 64-byte public key acting as a legacy (v4) lookup target.
///
/// The walk treats it as opaque bytes; only its derived [Id] participates in
/// the distance metric.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Pubkey(pub [u8; 64]);

impl Pubkey {
    /// Sample a pubkey-shaped target from a caller-supplied source.
    pub fn random_with<R: RngCore>(rng: &mut R) -> Pubkey {
        let mut bytes = [0u8; 64];
        rng.fill_bytes(&mut bytes);
        Pubkey(bytes)
    }

    /// The node Id this pubkey maps to (Keccak-256 of the raw bytes).
    pub fn id(&self) -> Id {
        let digest: [u8; ID_SIZE] = Keccak256::digest(self.0).into();
        Id(digest)
    }
}

impl Default for Pubkey {
    fn default() -> Self {
        Pubkey([0u8; 64])
    }
}

impl Debug for Pubkey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({:?})", self.id())
    }
}
