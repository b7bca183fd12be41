//! Control-flow primitives consumed by a bytecode verifier: where each
//! method's instructions start, where its jumps land, and which exception
//! handler covers which instruction.

pub mod cflow;

pub use cflow::{ExceptionSourceMap, FlowInfo, InstructionsMap, JumpsMap};
