//! # LogiChain Test Suite
//!
//! Unified test crate for flows that cross subsystem boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── block_acceptance.rs   # validate -> fork-check -> append flows
//!     └── partition_merge.rs    # offgrid reconnection and replay flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p lc-tests
//!
//! # By flow
//! cargo test -p lc-tests integration::block_acceptance
//! cargo test -p lc-tests integration::partition_merge
//! ```

#![allow(dead_code)]

pub mod integration;
