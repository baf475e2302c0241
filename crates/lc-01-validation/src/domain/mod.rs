//! # Domain Module
//!
//! Pure validation logic: rules, dependency-graph checks, errors and the
//! public verdict type.

pub mod dag;
pub mod errors;
pub mod rules;
pub mod verdict;

pub use dag::check_dependency_cycles;
pub use errors::ValidationError;
pub use verdict::BlockVerdict;
