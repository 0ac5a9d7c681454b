//! Property Test Suite
//!
//! Tests for the six typed properties: payload layouts on the wire,
//! round trips through a collection and the shared property accessors.
//!
//! ## Test Tier Structure
//!
//! - **Tier 1: Payload Layouts** (fast, must pass)
//!   Wire shape of every payload type, decode failures.
//!
//! - **Tier 2: Property CRUD**
//!   create / get_data / set_data, discriminators, references.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test property_comprehensive
//! ```


// Tier 1: Payload Layouts
mod serializer_tests;

// Tier 2: Property CRUD
mod crud_tests;
