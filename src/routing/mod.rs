//! Question Routing
//!
//! Classification, weighted provider selection and definition materialization.
//! Nothing in here awaits.

pub mod classifier;
pub mod definition;
pub mod selector;

pub use classifier::{ComplexityScore, classify, score};
pub use definition::ProviderDefinition;
pub use selector::{fallback_candidates, select};
