//! Packed bit storage with ranged mutation and fused logical reductions
//! (spec component C1), plus an addressable mark-map built on top of it.

mod bit_vector;
mod address_map;

pub use bit_vector::BitVector;
pub use address_map::AddressMap;
