//! Entry storage shared by the eviction policies.
//!
//! - [`budget`]: running byte total against an optional ceiling.
//! - [`linked`]: index plus insertion-ordered list, used by FIFO and LRU.

pub mod budget;
pub mod linked;

pub use budget::ByteBudget;
pub use linked::LinkedStore;
