//! FlowForge Core - input handling for supply-chain network models
//!
//! This crate turns raw tables into the typed, validated data a model is
//! built from:
//! - Loosely typed tables ([`InputTables`], [`Row`], [`Cell`])
//! - Wildcard resolution (`*` expansion, missing-value filling, scenario split)
//! - Typed records per table schema
//! - Derived index sets ([`NetworkSets`]) including the capacity-type forest
//!
//! # Example
//!
//! ```
//! use flowforge_core::{row, InputTables, ScenarioData};
//!
//! let tables = InputTables::new()
//!     .with_table("Periods", vec![row! { "Period" => 1 }])
//!     .with_table("Products", vec![row! { "Product" => "P", "Measure" => "unit" }])
//!     .with_table(
//!         "Nodes",
//!         vec![
//!             row! { "Name" => "O", "Origin Node" => "X", "Send to Destinations" => "X" },
//!             row! { "Name" => "D", "Destination Node" => "X", "Receive from Origins" => "X" },
//!         ],
//!     )
//!     .with_table("OD Distances", vec![row! { "Origin" => "*", "Destination" => "D", "Mode" => "truck" }]);
//!
//! let data = ScenarioData::prepare("Base", &tables).unwrap();
//! assert_eq!(data.sets.arcs.len(), 1);
//! ```

pub mod error;
pub mod records;
pub mod scenario;
pub mod schema;
pub mod sets;
pub mod table;
pub mod wildcard;

#[cfg(test)]
mod wildcard_tests;

/// Marker expanding to every member of a set.
pub const ALL: &str = "*";
/// Marker aggregating across every member of a set.
pub const AGGREGATE: &str = "@";

pub use error::{ConfigError, Result};
pub use records::{Container, ObjectiveKind, ObjectiveRecord, Period, Records, Selector};
pub use scenario::{scenario_names, split_scenarios, ScenarioData, DEFAULT_SCENARIO};
pub use schema::SetKind;
pub use sets::{ArcMode, CapacityHierarchy, NetworkSets, ParentLink};
pub use table::{Cell, InputTables, Row, Table};
pub use wildcard::{
    dedupe_rows, expand_wildcards, fill_missing_values, split_asterisk_values, split_by_scenario,
};
