//! Core primitives shared by the authority and the client.

pub mod address;
pub mod coord;
pub mod hash;

// Re-export core types
pub use address::Address;
pub use coord::{CellIndex, Coord};
pub use hash::{keccak256, sha256_with_domain, Hash32, KeccakHasher, MessageBuilder};
