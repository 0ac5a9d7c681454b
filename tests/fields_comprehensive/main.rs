//! Field Accessor Test Suite
//!
//! Tests for the generic field layer: per-type codecs, the get/set/unset
//! accessors, existence checks and the nested settings value codec.
//!
//! ## Test Tier Structure
//!
//! - **Tier 1: Codec Contracts** (fast, must pass)
//!   Soft-fail versus hard-fail decoding, enum tables, array decoding.
//!
//! - **Tier 2: Accessor Behaviour**
//!   Reads and writes through entity handles against the in-memory store.
//!
//! - **Tier 3: Concurrency**
//!   Concurrent writers on one document.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test fields_comprehensive
//! ```


mod value_collection_tests;

// Tier 2: Accessor Behaviour
mod accessor_tests;
mod existence_tests;
