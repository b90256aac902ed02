//! Shared test fixtures for FlowForge crates.
//!
//! - [`network`] - input tables for small networks with known optimal plans
//! - [`oracle`] - a scripted solver oracle that records the models it sees
//!
//! Network fixtures only return `flowforge-core` types and can be used from
//! unit tests of any crate. The scripted oracle implements the solver trait,
//! so crates below `flowforge-solver` should use it from integration tests
//! (`tests/`) only, where a single copy of the trait is linked.
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! flowforge-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use flowforge_test::network::{scenario_a, FLOW_VAR};
//! use flowforge_test::oracle::{assign, ScriptedOracle};
//! ```

pub mod network;
pub mod oracle;

pub use network::{base_network, scenario_a, scenario_b, scenario_c, with_objectives};
pub use oracle::{assign, ScriptedOracle};
