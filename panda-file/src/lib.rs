pub mod utilities;

pub mod bitset;
pub mod intset;
pub mod relation;
pub mod argparse;
pub mod serialize;

pub mod binary;
pub mod assembler;
pub mod linker;
pub mod gc;
pub mod verifier;

pub use utilities::FromByteStream;
