//! The three pipeline stages.
//!
//! Each stage is a stateless operation over an [`ObjectStore`]: it takes
//! object references as strings, validates them before doing any I/O, and
//! returns references to the objects it wrote.
//!
//! [`ObjectStore`]: crate::store::ObjectStore

pub mod map;
pub mod reduce;
pub mod split;

pub use map::map_chunk;
pub use reduce::reduce;
pub use split::{partition, split};
