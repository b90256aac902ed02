//! Typed records parsed from the raw tables.
//!
//! Each record type implements [`Record`], which ties it to its
//! [`TableSchema`] and validates the cells of one row. Membership of
//! identifiers in the derived sets is checked separately by
//! [`Records::validate`], once the sets are known.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::schema::{self, SetKind, TableSchema};
use crate::sets::NetworkSets;
use crate::table::{Cell, InputTables, Row};
use crate::wildcard::dedupe_rows;
use crate::AGGREGATE;

/// Ordered integer period identifier.
pub type Period = i64;

/// Read access to the cells of one row, with table-scoped errors.
pub struct RowReader<'a> {
    table: &'static str,
    row: &'a Row,
}

impl<'a> RowReader<'a> {
    pub fn new(table: &'static str, row: &'a Row) -> Self {
        Self { table, row }
    }

    fn cell(&self, column: &str) -> Option<&'a Cell> {
        self.row.get(column).filter(|c| !c.is_empty())
    }

    fn missing(&self, column: &str) -> ConfigError {
        ConfigError::MissingColumn {
            table: self.table.to_string(),
            column: column.to_string(),
        }
    }

    fn invalid(&self, column: &str, cell: &Cell) -> ConfigError {
        ConfigError::InvalidValue {
            table: self.table.to_string(),
            column: column.to_string(),
            value: cell.key(),
        }
    }

    pub fn text(&self, column: &str) -> Result<String> {
        self.cell(column)
            .map(Cell::key)
            .ok_or_else(|| self.missing(column))
    }

    pub fn opt_text(&self, column: &str) -> Option<String> {
        self.cell(column).map(Cell::key)
    }

    pub fn number(&self, column: &str) -> Result<f64> {
        self.opt_number(column)?.ok_or_else(|| self.missing(column))
    }

    pub fn opt_number(&self, column: &str) -> Result<Option<f64>> {
        match self.cell(column) {
            None => Ok(None),
            Some(c) => c.as_number().map(Some).ok_or_else(|| self.invalid(column, c)),
        }
    }

    pub fn number_or(&self, column: &str, default: f64) -> Result<f64> {
        Ok(self.opt_number(column)?.unwrap_or(default))
    }

    /// A non-negative number, rejecting negative values.
    pub fn amount_or(&self, column: &str, default: f64) -> Result<f64> {
        let v = self.number_or(column, default)?;
        if v < 0.0 {
            return Err(ConfigError::InvalidValue {
                table: self.table.to_string(),
                column: column.to_string(),
                value: v.to_string(),
            });
        }
        Ok(v)
    }

    pub fn opt_count(&self, column: &str) -> Result<Option<u32>> {
        match self.cell(column) {
            None => Ok(None),
            Some(c) => match c.as_number() {
                Some(n) if n >= 0.0 && n.fract() == 0.0 => Ok(Some(n as u32)),
                _ => Err(self.invalid(column, c)),
            },
        }
    }

    pub fn integer(&self, column: &str) -> Result<i64> {
        let c = self.cell(column).ok_or_else(|| self.missing(column))?;
        match c.as_number() {
            Some(n) if n.fract() == 0.0 => Ok(n as i64),
            _ => Err(self.invalid(column, c)),
        }
    }

    pub fn period(&self, column: &str) -> Result<Period> {
        self.integer(column)
    }

    /// A flag is set when the cell holds `X` (any case) or a non-zero number.
    pub fn flag(&self, column: &str) -> bool {
        match self.cell(column) {
            Some(Cell::Text(s)) => s.trim().eq_ignore_ascii_case("x"),
            Some(Cell::Number(n)) => *n != 0.0,
            _ => false,
        }
    }

    pub fn opt_flag(&self, column: &str) -> Option<bool> {
        self.row.get(column).map(|_| self.flag(column))
    }

    pub fn selector(&self, column: &str) -> Result<Selector<String>> {
        let c = self.cell(column).ok_or_else(|| self.missing(column))?;
        Ok(if c.is_marker(AGGREGATE) {
            Selector::Aggregate
        } else {
            Selector::Member(c.key())
        })
    }

    pub fn period_selector(&self, column: &str) -> Result<Selector<Period>> {
        let c = self.cell(column).ok_or_else(|| self.missing(column))?;
        if c.is_marker(AGGREGATE) {
            return Ok(Selector::Aggregate);
        }
        Ok(Selector::Member(self.period(column)?))
    }
}

/// A rule column value that is either one member or the `@` aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Selector<T> {
    Aggregate,
    Member(T),
}

impl<T: PartialEq> Selector<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selector::Aggregate => true,
            Selector::Member(m) => m == value,
        }
    }

    pub fn member(&self) -> Option<&T> {
        match self {
            Selector::Aggregate => None,
            Selector::Member(m) => Some(m),
        }
    }
}

/// A typed row of one input table.
pub trait Record: Sized {
    const SCHEMA: &'static TableSchema;

    fn from_row(row: &RowReader<'_>) -> Result<Self>;

    /// Checks that every identifier belongs to its derived set.
    fn validate(&self, _sets: &NetworkSets) -> Result<()> {
        Ok(())
    }
}

/// Parses every row of the record's table, rejecting colliding keys.
pub fn parse_table<R: Record>(tables: &InputTables) -> Result<Vec<R>> {
    let schema = R::SCHEMA;
    let rows = dedupe_rows(schema.name, tables.rows(schema.name).to_vec(), schema.key)?;
    rows.iter()
        .map(|r| R::from_row(&RowReader::new(schema.name, r)))
        .collect()
}

fn check(sets: &NetworkSets, table: &TableSchema, kind: SetKind, value: &str) -> Result<()> {
    sets.require(table.name, kind, value)
}

fn check_period(sets: &NetworkSets, table: &TableSchema, period: Period) -> Result<()> {
    check(sets, table, SetKind::Periods, &period.to_string())
}

fn check_selector(
    sets: &NetworkSets,
    table: &TableSchema,
    kind: SetKind,
    value: &Selector<String>,
) -> Result<()> {
    match value {
        Selector::Aggregate => Ok(()),
        Selector::Member(m) => check(sets, table, kind, m),
    }
}

// ---------------------------------------------------------------------------
// Objectives
// ---------------------------------------------------------------------------

/// The objective library's named objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ObjectiveKind {
    MinimizeCost,
    MinimizeMaximumTransitDistance,
    MinimizeMaximumAge,
    MaximizeCapacity,
    MinimizeMaximumUtilization,
    MinimizePlanOverPlanChange,
    MinimizeDroppedVolume,
    MinimizeCarriedOverVolume,
}

impl ObjectiveKind {
    pub const ALL: [ObjectiveKind; 8] = [
        ObjectiveKind::MinimizeCost,
        ObjectiveKind::MinimizeMaximumTransitDistance,
        ObjectiveKind::MinimizeMaximumAge,
        ObjectiveKind::MaximizeCapacity,
        ObjectiveKind::MinimizeMaximumUtilization,
        ObjectiveKind::MinimizePlanOverPlanChange,
        ObjectiveKind::MinimizeDroppedVolume,
        ObjectiveKind::MinimizeCarriedOverVolume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ObjectiveKind::MinimizeCost => "Minimize Cost",
            ObjectiveKind::MinimizeMaximumTransitDistance => "Minimize Maximum Transit Distance",
            ObjectiveKind::MinimizeMaximumAge => "Minimize Maximum Age",
            ObjectiveKind::MaximizeCapacity => "Maximize Capacity",
            ObjectiveKind::MinimizeMaximumUtilization => "Minimize Maximum Utilization",
            ObjectiveKind::MinimizePlanOverPlanChange => "Minimize Plan-Over-Plan Change",
            ObjectiveKind::MinimizeDroppedVolume => "Minimize Dropped Volume",
            ObjectiveKind::MinimizeCarriedOverVolume => "Minimize Carried Over Volume",
        }
    }

    pub fn is_maximize(self) -> bool {
        matches!(self, ObjectiveKind::MaximizeCapacity)
    }
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectiveKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownObjective(wanted.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveRecord {
    pub priority: i64,
    pub objective: ObjectiveKind,
    pub relaxation: f64,
}

impl Record for ObjectiveRecord {
    const SCHEMA: &'static TableSchema = &schema::OBJECTIVES;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        let relaxation = r.number_or("Relaxation", 0.0)?;
        if !(0.0..=1.0).contains(&relaxation) {
            return Err(ConfigError::InvalidValue {
                table: Self::SCHEMA.name.to_string(),
                column: "Relaxation".to_string(),
                value: relaxation.to_string(),
            });
        }
        Ok(Self {
            priority: r.integer("Priority")?,
            objective: r.text("Objective")?.parse()?,
            relaxation,
        })
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterRecord {
    pub name: String,
    pub value: f64,
}

impl Record for ParameterRecord {
    const SCHEMA: &'static TableSchema = &schema::PARAMETERS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            name: r.text("Parameter")?,
            value: r.number("Value")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioRecord {
    pub name: String,
    pub max_launch_cost: Option<f64>,
}

impl Record for ScenarioRecord {
    const SCHEMA: &'static TableSchema = &schema::SCENARIOS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            name: r.text("Scenario")?,
            max_launch_cost: r.opt_number("Max Launch Cost")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRecord {
    pub period: Period,
    pub weight: f64,
}

impl Record for PeriodRecord {
    const SCHEMA: &'static TableSchema = &schema::PERIODS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            weight: r.amount_or("Weight", 1.0)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductMeasureRecord {
    pub product: String,
    pub measure: String,
    pub value: f64,
}

impl Record for ProductMeasureRecord {
    const SCHEMA: &'static TableSchema = &schema::PRODUCTS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            product: r.text("Product")?,
            measure: r.text("Measure")?,
            value: r.amount_or("Value", 1.0)?,
        })
    }
}

/// Role flags of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeRoles {
    pub origin: bool,
    pub destination: bool,
    pub intermediate: bool,
    pub receive_from_origins: bool,
    pub receive_from_intermediates: bool,
    pub send_to_destinations: bool,
    pub send_to_intermediates: bool,
}

impl NodeRoles {
    pub fn is_departing(&self) -> bool {
        self.origin
            || (self.intermediate && (self.send_to_destinations || self.send_to_intermediates))
    }

    pub fn is_receiving(&self) -> bool {
        self.destination
            || (self.intermediate && (self.receive_from_origins || self.receive_from_intermediates))
    }

    /// Whether flow may go from a node with these roles to one with `to`.
    pub fn can_ship_to(&self, to: &NodeRoles) -> bool {
        (self.origin && self.send_to_destinations && to.destination && to.receive_from_origins)
            || (self.origin
                && self.send_to_intermediates
                && to.intermediate
                && to.receive_from_origins)
            || (self.intermediate
                && self.send_to_intermediates
                && to.intermediate
                && to.receive_from_intermediates)
            || (self.intermediate
                && self.send_to_destinations
                && to.destination
                && to.receive_from_intermediates)
    }
}

/// Lifecycle bounds of a node. `None` leaves the bound open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LifecycleBounds {
    pub min_launches: Option<u32>,
    pub max_launches: Option<u32>,
    pub min_operating_duration: Option<u32>,
    pub max_operating_duration: Option<u32>,
    pub min_shutdowns: Option<u32>,
    pub max_shutdowns: Option<u32>,
    pub min_shutdown_duration: Option<u32>,
    pub max_shutdown_duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub name: String,
    pub node_type: Option<String>,
    pub roles: NodeRoles,
    pub initially_operating: bool,
    pub lifecycle: LifecycleBounds,
}

impl Record for NodeRecord {
    const SCHEMA: &'static TableSchema = &schema::NODES;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            name: r.text("Name")?,
            node_type: r.opt_text("Node Type"),
            roles: NodeRoles {
                origin: r.flag("Origin Node"),
                destination: r.flag("Destination Node"),
                intermediate: r.flag("Intermediate Node"),
                receive_from_origins: r.flag("Receive from Origins"),
                receive_from_intermediates: r.flag("Receive from Intermediates"),
                send_to_destinations: r.flag("Send to Destinations"),
                send_to_intermediates: r.flag("Send to Intermediates"),
            },
            initially_operating: r.opt_flag("Initially Operating").unwrap_or(true),
            lifecycle: LifecycleBounds {
                min_launches: r.opt_count("Min Launches")?,
                max_launches: r.opt_count("Max Launches")?,
                min_operating_duration: r.opt_count("Min Operating Duration")?,
                max_operating_duration: r.opt_count("Max Operating Duration")?,
                min_shutdowns: r.opt_count("Min Shutdowns")?,
                max_shutdowns: r.opt_count("Max Shutdowns")?,
                min_shutdown_duration: r.opt_count("Min Shutdown Duration")?,
                max_shutdown_duration: r.opt_count("Max Shutdown Duration")?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeTypeRecord {
    pub period: Period,
    pub node_type: String,
    pub min_operating: Option<u32>,
    pub max_operating: Option<u32>,
}

impl Record for NodeTypeRecord {
    const SCHEMA: &'static TableSchema = &schema::NODE_TYPES;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            node_type: r.text("Node Type")?,
            min_operating: r.opt_count("Min Operating")?,
            max_operating: r.opt_count("Max Operating")?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::NodeTypes, &self.node_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeGroupRecord {
    pub node: String,
    pub group: String,
}

impl Record for NodeGroupRecord {
    const SCHEMA: &'static TableSchema = &schema::NODE_GROUPS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            node: r.text("Node")?,
            group: r.text("Group")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityTypeRecord {
    pub capacity_type: String,
    pub parent: Option<String>,
    pub relative_rate: f64,
}

impl Record for CapacityTypeRecord {
    const SCHEMA: &'static TableSchema = &schema::RESOURCE_CAPACITY_TYPES;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            capacity_type: r.text("Capacity Type")?,
            parent: r.opt_text("Parent"),
            relative_rate: r.amount_or("Relative Rate", 1.0)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Demand and flow rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandRecord {
    pub period: Period,
    pub product: String,
    pub destination: String,
    pub demand: f64,
    pub drop_cost: Option<f64>,
}

impl Record for DemandRecord {
    const SCHEMA: &'static TableSchema = &schema::DEMAND;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            product: r.text("Product")?,
            destination: r.text("Destination")?,
            demand: r.amount_or("Demand", 0.0)?,
            drop_cost: r.opt_number("Drop Cost")?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Products, &self.product)?;
        check(sets, Self::SCHEMA, SetKind::ReceivingNodes, &self.destination)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaxDroppedRecord {
    pub period: Selector<Period>,
    pub product: Selector<String>,
    pub node: Selector<String>,
    pub max_dropped: f64,
}

impl Record for MaxDroppedRecord {
    const SCHEMA: &'static TableSchema = &schema::MAX_DROPPED;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period_selector("Period")?,
            product: r.selector("Product")?,
            node: r.selector("Node")?,
            max_dropped: r.amount_or("Max Dropped", 0.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        if let Selector::Member(t) = self.period {
            check_period(sets, Self::SCHEMA, t)?;
        }
        check_selector(sets, Self::SCHEMA, SetKind::Products, &self.product)?;
        check_selector(sets, Self::SCHEMA, SetKind::ReceivingNodes, &self.node)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRecord {
    pub period: Selector<Period>,
    pub node: Selector<String>,
    pub downstream: Selector<String>,
    pub product: Selector<String>,
    pub mode: Selector<String>,
    pub measure: String,
    pub node_group: Option<String>,
    pub downstream_group: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_pct_outbound: Option<f64>,
    pub max_pct_outbound: Option<f64>,
    pub min_pct_inbound: Option<f64>,
    pub max_pct_inbound: Option<f64>,
}

impl Record for FlowRecord {
    const SCHEMA: &'static TableSchema = &schema::FLOW;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period_selector("Period")?,
            node: r.selector("Node")?,
            downstream: r.selector("Downstream Node")?,
            product: r.selector("Product")?,
            mode: r.selector("Mode")?,
            measure: r.text("Measure")?,
            node_group: r.opt_text("Node Group"),
            downstream_group: r.opt_text("Downstream Node Group"),
            min: r.opt_number("Min")?,
            max: r.opt_number("Max")?,
            min_pct_outbound: r.opt_number("Min Pct Outbound")?,
            max_pct_outbound: r.opt_number("Max Pct Outbound")?,
            min_pct_inbound: r.opt_number("Min Pct Inbound")?,
            max_pct_inbound: r.opt_number("Max Pct Inbound")?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        if let Selector::Member(t) = self.period {
            check_period(sets, Self::SCHEMA, t)?;
        }
        check_selector(sets, Self::SCHEMA, SetKind::DepartingNodes, &self.node)?;
        check_selector(sets, Self::SCHEMA, SetKind::ReceivingNodes, &self.downstream)?;
        check_selector(sets, Self::SCHEMA, SetKind::Products, &self.product)?;
        check_selector(sets, Self::SCHEMA, SetKind::Modes, &self.mode)?;
        check(sets, Self::SCHEMA, SetKind::Measures, &self.measure)?;
        for group in self.node_group.iter().chain(&self.downstream_group) {
            check(sets, Self::SCHEMA, SetKind::NodeGroups, group)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Transportation
// ---------------------------------------------------------------------------

/// Basis on which a transportation cost row is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Container {
    /// Per unit of measure shipped.
    Unit,
    /// Per integer load.
    Load,
}

impl Container {
    pub const ALL: [Container; 2] = [Container::Unit, Container::Load];

    pub fn name(self) -> &'static str {
        match self {
            Container::Unit => "unit",
            Container::Load => "load",
        }
    }
}

impl FromStr for Container {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unit" => Ok(Container::Unit),
            "load" => Ok(Container::Load),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OdRecord {
    pub origin: String,
    pub destination: String,
    pub mode: String,
    pub distance: f64,
    pub transit_time: f64,
    pub transit_periods: u32,
}

impl Record for OdRecord {
    const SCHEMA: &'static TableSchema = &schema::OD_DISTANCES;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            origin: r.text("Origin")?,
            destination: r.text("Destination")?,
            mode: r.text("Mode")?,
            distance: r.amount_or("Distance", 0.0)?,
            transit_time: r.amount_or("Transit Time", 0.0)?,
            transit_periods: r.opt_count("Transit Periods")?.unwrap_or(0),
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check(sets, Self::SCHEMA, SetKind::DepartingNodes, &self.origin)?;
        check(sets, Self::SCHEMA, SetKind::ReceivingNodes, &self.destination)?;
        check(sets, Self::SCHEMA, SetKind::Modes, &self.mode)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportCostRecord {
    pub period: Period,
    pub origin: String,
    pub destination: String,
    pub mode: String,
    pub container: Container,
    pub measure: String,
    pub fixed_cost: f64,
    pub cost_per_unit: f64,
    pub cost_per_distance: f64,
    pub cost_per_time: f64,
    pub minimum_cost: f64,
}

impl Record for TransportCostRecord {
    const SCHEMA: &'static TableSchema = &schema::TRANSPORTATION_COSTS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        let container = r.text("Container")?;
        Ok(Self {
            period: r.period("Period")?,
            origin: r.text("Origin")?,
            destination: r.text("Destination")?,
            mode: r.text("Mode")?,
            container: container.parse().map_err(|_| ConfigError::InvalidValue {
                table: Self::SCHEMA.name.to_string(),
                column: "Container".to_string(),
                value: container.clone(),
            })?,
            measure: r.text("Measure")?,
            fixed_cost: r.amount_or("Fixed Cost", 0.0)?,
            cost_per_unit: r.amount_or("Cost per Unit", 0.0)?,
            cost_per_distance: r.amount_or("Cost per Distance", 0.0)?,
            cost_per_time: r.amount_or("Cost per Time", 0.0)?,
            minimum_cost: r.amount_or("Minimum Cost", 0.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::DepartingNodes, &self.origin)?;
        check(sets, Self::SCHEMA, SetKind::ReceivingNodes, &self.destination)?;
        check(sets, Self::SCHEMA, SetKind::Modes, &self.mode)?;
        check(sets, Self::SCHEMA, SetKind::Measures, &self.measure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadCapacityRecord {
    pub period: Period,
    pub origin: String,
    pub destination: String,
    pub mode: String,
    pub measure: String,
    pub capacity: f64,
}

impl Record for LoadCapacityRecord {
    const SCHEMA: &'static TableSchema = &schema::LOAD_CAPACITY;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            origin: r.text("Origin")?,
            destination: r.text("Destination")?,
            mode: r.text("Mode")?,
            measure: r.text("Measure")?,
            capacity: r.amount_or("Capacity", 0.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        validate_lane(
            sets,
            Self::SCHEMA,
            self.period,
            &self.origin,
            &self.destination,
            &self.mode,
        )?;
        check(sets, Self::SCHEMA, SetKind::Measures, &self.measure)
    }
}

fn validate_lane(
    sets: &NetworkSets,
    table: &TableSchema,
    period: Period,
    origin: &str,
    destination: &str,
    mode: &str,
) -> Result<()> {
    check_period(sets, table, period)?;
    check(sets, table, SetKind::DepartingNodes, origin)?;
    check(sets, table, SetKind::ReceivingNodes, destination)?;
    check(sets, table, SetKind::Modes, mode)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportConstraintRecord {
    pub period: Period,
    pub origin: String,
    pub destination: String,
    pub mode: String,
    pub measure: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub max_distance: Option<f64>,
    pub max_transit_time: Option<f64>,
}

impl Record for TransportConstraintRecord {
    const SCHEMA: &'static TableSchema = &schema::TRANSPORTATION_CONSTRAINTS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            origin: r.text("Origin")?,
            destination: r.text("Destination")?,
            mode: r.text("Mode")?,
            measure: r.text("Measure")?,
            min: r.opt_number("Min")?,
            max: r.opt_number("Max")?,
            max_distance: r.opt_number("Max Distance")?,
            max_transit_time: r.opt_number("Max Transit Time")?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        validate_lane(
            sets,
            Self::SCHEMA,
            self.period,
            &self.origin,
            &self.destination,
            &self.mode,
        )?;
        check(sets, Self::SCHEMA, SetKind::Measures, &self.measure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportExpansionRecord {
    pub period: Period,
    pub origin: String,
    pub destination: String,
    pub mode: String,
    pub measure: String,
    pub expansion: String,
    pub capacity: f64,
    pub cost: f64,
    pub max_count: u32,
}

impl Record for TransportExpansionRecord {
    const SCHEMA: &'static TableSchema = &schema::TRANSPORTATION_EXPANSIONS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            origin: r.text("Origin")?,
            destination: r.text("Destination")?,
            mode: r.text("Mode")?,
            measure: r.text("Measure")?,
            expansion: r.text("Expansion")?,
            capacity: r.amount_or("Capacity", 0.0)?,
            cost: r.amount_or("Cost", 0.0)?,
            max_count: r.opt_count("Max Count")?.unwrap_or(1),
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        validate_lane(
            sets,
            Self::SCHEMA,
            self.period,
            &self.origin,
            &self.destination,
            &self.mode,
        )?;
        check(sets, Self::SCHEMA, SetKind::Measures, &self.measure)
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceCapacityRecord {
    pub period: Period,
    pub node: String,
    pub resource: String,
    pub capacity_type: String,
    pub capacity: f64,
}

impl Record for ResourceCapacityRecord {
    const SCHEMA: &'static TableSchema = &schema::RESOURCE_CAPACITIES;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            node: r.text("Node")?,
            resource: r.text("Resource")?,
            capacity_type: r.text("Capacity Type")?,
            capacity: r.amount_or("Capacity", 0.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Nodes, &self.node)?;
        check(sets, Self::SCHEMA, SetKind::Resources, &self.resource)?;
        check(sets, Self::SCHEMA, SetKind::CapacityTypes, &self.capacity_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityConsumptionRecord {
    pub period: Period,
    pub node: String,
    pub product: String,
    pub capacity_type: String,
    pub consumption: f64,
}

impl Record for CapacityConsumptionRecord {
    const SCHEMA: &'static TableSchema = &schema::RESOURCE_CAPACITY_CONSUMPTION;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            node: r.text("Node")?,
            product: r.text("Product")?,
            capacity_type: r.text("Capacity Type")?,
            consumption: r.amount_or("Consumption", 0.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Nodes, &self.node)?;
        check(sets, Self::SCHEMA, SetKind::Products, &self.product)?;
        check(sets, Self::SCHEMA, SetKind::CapacityTypes, &self.capacity_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceCostRecord {
    pub period: Period,
    pub node: String,
    pub resource: String,
    pub initial_count: f64,
    pub min_count: Option<f64>,
    pub max_count: Option<f64>,
    pub add_increment: f64,
    pub remove_increment: f64,
    pub add_cost: f64,
    pub remove_cost: f64,
    pub cost_per_period: f64,
}

impl Record for ResourceCostRecord {
    const SCHEMA: &'static TableSchema = &schema::RESOURCE_COSTS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            node: r.text("Node")?,
            resource: r.text("Resource")?,
            initial_count: r.amount_or("Initial Count", 0.0)?,
            min_count: r.opt_number("Min Count")?,
            max_count: r.opt_number("Max Count")?,
            add_increment: r.amount_or("Add Increment", 1.0)?,
            remove_increment: r.amount_or("Remove Increment", 1.0)?,
            add_cost: r.amount_or("Add Cost", 0.0)?,
            remove_cost: r.amount_or("Remove Cost", 0.0)?,
            cost_per_period: r.amount_or("Cost per Period", 0.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Nodes, &self.node)?;
        check(sets, Self::SCHEMA, SetKind::Resources, &self.resource)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceAttributeRecord {
    pub period: Period,
    pub resource: String,
    pub attribute: String,
    pub value: f64,
}

impl Record for ResourceAttributeRecord {
    const SCHEMA: &'static TableSchema = &schema::RESOURCE_ATTRIBUTES;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            resource: r.text("Resource")?,
            attribute: r.text("Attribute")?,
            value: r.number_or("Value", 0.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Resources, &self.resource)?;
        check(sets, Self::SCHEMA, SetKind::Attributes, &self.attribute)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeConstraintRecord {
    pub period: Period,
    pub node: String,
    pub attribute: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Record for AttributeConstraintRecord {
    const SCHEMA: &'static TableSchema = &schema::RESOURCE_ATTRIBUTE_CONSTRAINTS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            node: r.text("Node")?,
            attribute: r.text("Attribute")?,
            min: r.opt_number("Min")?,
            max: r.opt_number("Max")?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Nodes, &self.node)?;
        check(sets, Self::SCHEMA, SetKind::Attributes, &self.attribute)
    }
}

// ---------------------------------------------------------------------------
// Carrying
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarryingCapacityRecord {
    pub period: Period,
    pub node: String,
    pub measure: String,
    pub inbound: Option<f64>,
    pub outbound: Option<f64>,
}

impl Record for CarryingCapacityRecord {
    const SCHEMA: &'static TableSchema = &schema::CARRYING_CAPACITY;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            node: r.text("Node")?,
            measure: r.text("Measure")?,
            inbound: r.opt_number("Inbound Capacity")?,
            outbound: r.opt_number("Outbound Capacity")?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Nodes, &self.node)?;
        check(sets, Self::SCHEMA, SetKind::Measures, &self.measure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarryingExpansionRecord {
    pub period: Period,
    pub node: String,
    pub measure: String,
    pub expansion: String,
    pub inbound: f64,
    pub outbound: f64,
    pub cost: f64,
}

impl Record for CarryingExpansionRecord {
    const SCHEMA: &'static TableSchema = &schema::CARRYING_EXPANSIONS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            node: r.text("Node")?,
            measure: r.text("Measure")?,
            expansion: r.text("Expansion")?,
            inbound: r.amount_or("Inbound Capacity", 0.0)?,
            outbound: r.amount_or("Outbound Capacity", 0.0)?,
            cost: r.amount_or("Cost", 0.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Nodes, &self.node)?;
        check(sets, Self::SCHEMA, SetKind::Measures, &self.measure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarryingCostRecord {
    pub period: Period,
    pub node: String,
    pub product: String,
    pub inbound_cost: f64,
    pub outbound_cost: f64,
}

impl Record for CarryingCostRecord {
    const SCHEMA: &'static TableSchema = &schema::CARRYING_COSTS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            node: r.text("Node")?,
            product: r.text("Product")?,
            inbound_cost: r.amount_or("Inbound Cost", 0.0)?,
            outbound_cost: r.amount_or("Outbound Cost", 0.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Nodes, &self.node)?;
        check(sets, Self::SCHEMA, SetKind::Products, &self.product)
    }
}

// ---------------------------------------------------------------------------
// Operating and lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatingCostRecord {
    pub period: Period,
    pub node: String,
    pub fixed_cost: f64,
    pub launch_cost: f64,
    pub shutdown_cost: f64,
}

impl Record for OperatingCostRecord {
    const SCHEMA: &'static TableSchema = &schema::OPERATING_COSTS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            node: r.text("Node")?,
            fixed_cost: r.amount_or("Fixed Cost", 0.0)?,
            launch_cost: r.amount_or("Launch Cost", 0.0)?,
            shutdown_cost: r.amount_or("Shutdown Cost", 0.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Nodes, &self.node)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableOperatingCostRecord {
    pub period: Period,
    pub node: String,
    pub product: String,
    pub cost: f64,
}

impl Record for VariableOperatingCostRecord {
    const SCHEMA: &'static TableSchema = &schema::VARIABLE_OPERATING_COSTS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            node: r.text("Node")?,
            product: r.text("Product")?,
            cost: r.amount_or("Cost", 0.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Nodes, &self.node)?;
        check(sets, Self::SCHEMA, SetKind::Products, &self.product)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeEventRecord {
    pub period: Period,
    pub node: String,
    pub launch: bool,
    pub shutdown: bool,
}

impl Record for NodeEventRecord {
    const SCHEMA: &'static TableSchema = &schema::NODE_EVENTS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            node: r.text("Node")?,
            launch: r.flag("Launch"),
            shutdown: r.flag("Shutdown"),
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Nodes, &self.node)
    }
}

// ---------------------------------------------------------------------------
// Age, assembly, plan-over-plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeConstraintRecord {
    pub period: Period,
    pub product: String,
    pub destination: String,
    pub age: u32,
    pub max_volume: f64,
    pub violation_cost: Option<f64>,
}

impl Record for AgeConstraintRecord {
    const SCHEMA: &'static TableSchema = &schema::AGE_CONSTRAINTS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            product: r.text("Product")?,
            destination: r.text("Destination")?,
            age: r
                .opt_count("Age")?
                .ok_or_else(|| ConfigError::MissingColumn {
                    table: Self::SCHEMA.name.to_string(),
                    column: "Age".to_string(),
                })?,
            max_volume: r.amount_or("Max Volume", 0.0)?,
            violation_cost: r.opt_number("Violation Cost")?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Products, &self.product)?;
        check(sets, Self::SCHEMA, SetKind::ReceivingNodes, &self.destination)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssemblyRecord {
    pub period: Period,
    pub node: String,
    pub product_1: String,
    pub product_2: String,
    pub quantity_1: f64,
    pub quantity_2: f64,
}

impl Record for AssemblyRecord {
    const SCHEMA: &'static TableSchema = &schema::ASSEMBLY_CONSTRAINTS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            node: r.text("Node")?,
            product_1: r.text("Product 1")?,
            product_2: r.text("Product 2")?,
            quantity_1: r.amount_or("Quantity 1", 1.0)?,
            quantity_2: r.amount_or("Quantity 2", 1.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Nodes, &self.node)?;
        check(sets, Self::SCHEMA, SetKind::Products, &self.product_1)?;
        check(sets, Self::SCHEMA, SetKind::Products, &self.product_2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingAssemblyRecord {
    pub period: Period,
    pub origin: String,
    pub destination: String,
    pub mode: String,
    pub product_1: String,
    pub product_2: String,
    pub quantity_1: f64,
    pub quantity_2: f64,
}

impl Record for ShippingAssemblyRecord {
    const SCHEMA: &'static TableSchema = &schema::SHIPPING_ASSEMBLY_CONSTRAINTS;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            origin: r.text("Origin")?,
            destination: r.text("Destination")?,
            mode: r.text("Mode")?,
            product_1: r.text("Product 1")?,
            product_2: r.text("Product 2")?,
            quantity_1: r.amount_or("Quantity 1", 1.0)?,
            quantity_2: r.amount_or("Quantity 2", 1.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        validate_lane(
            sets,
            Self::SCHEMA,
            self.period,
            &self.origin,
            &self.destination,
            &self.mode,
        )?;
        check(sets, Self::SCHEMA, SetKind::Products, &self.product_1)?;
        check(sets, Self::SCHEMA, SetKind::Products, &self.product_2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOverPlanRecord {
    pub period: Period,
    pub product: String,
    pub origin: String,
    pub destination: String,
    pub cost_per_volume_moved: f64,
}

impl Record for PlanOverPlanRecord {
    const SCHEMA: &'static TableSchema = &schema::PLAN_OVER_PLAN;

    fn from_row(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            period: r.period("Period")?,
            product: r.text("Product")?,
            origin: r.text("Origin")?,
            destination: r.text("Destination")?,
            cost_per_volume_moved: r.amount_or("Cost per Volume Moved", 0.0)?,
        })
    }

    fn validate(&self, sets: &NetworkSets) -> Result<()> {
        check_period(sets, Self::SCHEMA, self.period)?;
        check(sets, Self::SCHEMA, SetKind::Products, &self.product)?;
        check(sets, Self::SCHEMA, SetKind::DepartingNodes, &self.origin)?;
        check(sets, Self::SCHEMA, SetKind::ReceivingNodes, &self.destination)
    }
}

// ---------------------------------------------------------------------------
// All records of one scenario
// ---------------------------------------------------------------------------

/// Every typed record of one scenario, after wildcard expansion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Records {
    pub parameters: Vec<ParameterRecord>,
    pub scenarios: Vec<ScenarioRecord>,
    pub objectives: Vec<ObjectiveRecord>,
    pub periods: Vec<PeriodRecord>,
    pub products: Vec<ProductMeasureRecord>,
    pub nodes: Vec<NodeRecord>,
    pub node_types: Vec<NodeTypeRecord>,
    pub node_groups: Vec<NodeGroupRecord>,
    pub demand: Vec<DemandRecord>,
    pub max_dropped: Vec<MaxDroppedRecord>,
    pub flow: Vec<FlowRecord>,
    pub od_distances: Vec<OdRecord>,
    pub transport_costs: Vec<TransportCostRecord>,
    pub load_capacity: Vec<LoadCapacityRecord>,
    pub transport_constraints: Vec<TransportConstraintRecord>,
    pub transport_expansions: Vec<TransportExpansionRecord>,
    pub capacity_types: Vec<CapacityTypeRecord>,
    pub resource_capacities: Vec<ResourceCapacityRecord>,
    pub capacity_consumption: Vec<CapacityConsumptionRecord>,
    pub resource_costs: Vec<ResourceCostRecord>,
    pub resource_attributes: Vec<ResourceAttributeRecord>,
    pub attribute_constraints: Vec<AttributeConstraintRecord>,
    pub carrying_capacity: Vec<CarryingCapacityRecord>,
    pub carrying_expansions: Vec<CarryingExpansionRecord>,
    pub carrying_costs: Vec<CarryingCostRecord>,
    pub operating_costs: Vec<OperatingCostRecord>,
    pub variable_operating_costs: Vec<VariableOperatingCostRecord>,
    pub node_events: Vec<NodeEventRecord>,
    pub age_constraints: Vec<AgeConstraintRecord>,
    pub assembly: Vec<AssemblyRecord>,
    pub shipping_assembly: Vec<ShippingAssemblyRecord>,
    pub plan_over_plan: Vec<PlanOverPlanRecord>,
}

impl Records {
    /// Parses every known table of an expanded scenario.
    ///
    /// Objectives are parsed without key deduplication so that a repeated
    /// priority surfaces as [`ConfigError::DuplicatePriority`].
    pub fn parse(scenario: &str, tables: &InputTables) -> Result<Self> {
        let objectives = tables
            .rows(schema::OBJECTIVES.name)
            .iter()
            .map(|r| ObjectiveRecord::from_row(&RowReader::new(schema::OBJECTIVES.name, r)))
            .collect::<Result<Vec<_>>>()?;
        check_priorities(scenario, &objectives)?;

        Ok(Self {
            parameters: parse_table(tables)?,
            scenarios: parse_table(tables)?,
            objectives,
            periods: parse_table(tables)?,
            products: parse_table(tables)?,
            nodes: parse_table(tables)?,
            node_types: parse_table(tables)?,
            node_groups: parse_table(tables)?,
            demand: parse_table(tables)?,
            max_dropped: parse_table(tables)?,
            flow: parse_table(tables)?,
            od_distances: parse_table(tables)?,
            transport_costs: parse_table(tables)?,
            load_capacity: parse_table(tables)?,
            transport_constraints: parse_table(tables)?,
            transport_expansions: parse_table(tables)?,
            capacity_types: parse_table(tables)?,
            resource_capacities: parse_table(tables)?,
            capacity_consumption: parse_table(tables)?,
            resource_costs: parse_table(tables)?,
            resource_attributes: parse_table(tables)?,
            attribute_constraints: parse_table(tables)?,
            carrying_capacity: parse_table(tables)?,
            carrying_expansions: parse_table(tables)?,
            carrying_costs: parse_table(tables)?,
            operating_costs: parse_table(tables)?,
            variable_operating_costs: parse_table(tables)?,
            node_events: parse_table(tables)?,
            age_constraints: parse_table(tables)?,
            assembly: parse_table(tables)?,
            shipping_assembly: parse_table(tables)?,
            plan_over_plan: parse_table(tables)?,
        })
    }

    /// Checks every rule record against the derived sets.
    pub fn validate(&self, sets: &NetworkSets) -> Result<()> {
        fn all<R: Record>(records: &[R], sets: &NetworkSets) -> Result<()> {
            records.iter().try_for_each(|r| r.validate(sets))
        }
        all(&self.node_types, sets)?;
        all(&self.demand, sets)?;
        all(&self.max_dropped, sets)?;
        all(&self.flow, sets)?;
        all(&self.od_distances, sets)?;
        all(&self.transport_costs, sets)?;
        all(&self.load_capacity, sets)?;
        all(&self.transport_constraints, sets)?;
        all(&self.transport_expansions, sets)?;
        all(&self.resource_capacities, sets)?;
        all(&self.capacity_consumption, sets)?;
        all(&self.resource_costs, sets)?;
        all(&self.resource_attributes, sets)?;
        all(&self.attribute_constraints, sets)?;
        all(&self.carrying_capacity, sets)?;
        all(&self.carrying_expansions, sets)?;
        all(&self.carrying_costs, sets)?;
        all(&self.operating_costs, sets)?;
        all(&self.variable_operating_costs, sets)?;
        all(&self.node_events, sets)?;
        all(&self.age_constraints, sets)?;
        all(&self.assembly, sets)?;
        all(&self.shipping_assembly, sets)?;
        all(&self.plan_over_plan, sets)
    }

    /// Objectives ordered by ascending priority.
    pub fn ordered_objectives(&self) -> Vec<ObjectiveRecord> {
        let mut out = self.objectives.clone();
        out.sort_by_key(|o| o.priority);
        out
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.value)
    }
}

/// Rejects objective lists in which two entries share a priority.
pub fn check_priorities(scenario: &str, objectives: &[ObjectiveRecord]) -> Result<()> {
    let mut seen = std::collections::BTreeSet::new();
    for o in objectives {
        if !seen.insert(o.priority) {
            return Err(ConfigError::DuplicatePriority {
                scenario: scenario.to_string(),
                priority: o.priority,
            });
        }
    }
    Ok(())
}
