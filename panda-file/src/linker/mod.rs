//! Class resolution: a class linker owns one [`extension::LanguageExtension`]
//! per language, each with a boot [`context::ClassLinkerContext`] and any
//! number of child contexts. Resolution walks the context chain, recurses
//! into array component types, guards against circular inheritance per
//! thread, and publishes resolved classes via compare-and-swap.

pub mod class;
pub mod context;
pub mod errors;
pub mod extension;
pub mod layout;

pub use class::{Class, ClassInfo, ClassState};
pub use context::{ClassDefSource, ClassLinker, ClassLinkerContext, RawClassDef};
pub use errors::Error;
pub use extension::LanguageExtension;
