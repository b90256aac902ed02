//! Static description of the input tables.
//!
//! Each rule table names its key columns and the columns whose `*` cells
//! expand over a derived index set.

/// Derived index sets that a wildcard column can expand over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SetKind {
    Scenarios,
    Periods,
    Products,
    Measures,
    Nodes,
    Origins,
    Destinations,
    Intermediates,
    DepartingNodes,
    ReceivingNodes,
    NodeTypes,
    NodeGroups,
    Modes,
    Containers,
    Resources,
    CapacityTypes,
    Attributes,
    TransportationExpansions,
    CarryingExpansions,
    Ages,
}

impl SetKind {
    pub fn label(self) -> &'static str {
        match self {
            SetKind::Scenarios => "scenario",
            SetKind::Periods => "period",
            SetKind::Products => "product",
            SetKind::Measures => "measure",
            SetKind::Nodes => "node",
            SetKind::Origins => "origin",
            SetKind::Destinations => "destination",
            SetKind::Intermediates => "intermediate",
            SetKind::DepartingNodes => "departing node",
            SetKind::ReceivingNodes => "receiving node",
            SetKind::NodeTypes => "node type",
            SetKind::NodeGroups => "node group",
            SetKind::Modes => "mode",
            SetKind::Containers => "container",
            SetKind::Resources => "resource",
            SetKind::CapacityTypes => "capacity type",
            SetKind::Attributes => "resource attribute",
            SetKind::TransportationExpansions => "transportation expansion",
            SetKind::CarryingExpansions => "carrying expansion",
            SetKind::Ages => "age",
        }
    }
}

/// Schema of one input table.
#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    /// Columns that identify a row. Two rows with equal keys collide.
    pub key: &'static [&'static str],
    /// Columns whose `*` cells expand, in expansion order.
    pub expand: &'static [(&'static str, SetKind)],
}

use SetKind::*;

pub const PARAMETERS: TableSchema = TableSchema {
    name: "Parameters",
    key: &["Parameter"],
    expand: &[],
};

pub const SCENARIOS: TableSchema = TableSchema {
    name: "Scenarios",
    key: &["Scenario"],
    expand: &[],
};

pub const OBJECTIVES: TableSchema = TableSchema {
    name: "Objectives",
    key: &["Priority"],
    expand: &[],
};

pub const PERIODS: TableSchema = TableSchema {
    name: "Periods",
    key: &["Period"],
    expand: &[],
};

pub const PRODUCTS: TableSchema = TableSchema {
    name: "Products",
    key: &["Product", "Measure"],
    expand: &[],
};

pub const NODES: TableSchema = TableSchema {
    name: "Nodes",
    key: &["Name"],
    expand: &[],
};

pub const NODE_TYPES: TableSchema = TableSchema {
    name: "Node Types",
    key: &["Period", "Node Type"],
    expand: &[("Period", Periods), ("Node Type", NodeTypes)],
};

pub const NODE_GROUPS: TableSchema = TableSchema {
    name: "Node Groups",
    key: &["Node", "Group"],
    expand: &[],
};

pub const DEMAND: TableSchema = TableSchema {
    name: "Demand",
    key: &["Period", "Product", "Destination"],
    expand: &[
        ("Period", Periods),
        ("Product", Products),
        ("Destination", ReceivingNodes),
    ],
};

pub const MAX_DROPPED: TableSchema = TableSchema {
    name: "Max Dropped",
    key: &["Period", "Product", "Node"],
    expand: &[
        ("Period", Periods),
        ("Product", Products),
        ("Node", ReceivingNodes),
    ],
};

pub const FLOW: TableSchema = TableSchema {
    name: "Flow",
    key: &[
        "Period",
        "Node",
        "Downstream Node",
        "Product",
        "Mode",
        "Measure",
        "Node Group",
        "Downstream Node Group",
    ],
    expand: &[
        ("Period", Periods),
        ("Node", DepartingNodes),
        ("Downstream Node", ReceivingNodes),
        ("Product", Products),
        ("Mode", Modes),
        ("Measure", Measures),
    ],
};

pub const OD_DISTANCES: TableSchema = TableSchema {
    name: "OD Distances",
    key: &["Origin", "Destination", "Mode"],
    expand: &[
        ("Origin", DepartingNodes),
        ("Destination", ReceivingNodes),
        ("Mode", Modes),
    ],
};

pub const TRANSPORTATION_COSTS: TableSchema = TableSchema {
    name: "Transportation Costs",
    key: &[
        "Period",
        "Origin",
        "Destination",
        "Mode",
        "Container",
        "Measure",
    ],
    expand: &[
        ("Period", Periods),
        ("Origin", DepartingNodes),
        ("Destination", ReceivingNodes),
        ("Mode", Modes),
        ("Container", Containers),
        ("Measure", Measures),
    ],
};

const TRANSPORT_KEY: &[&str] = &["Period", "Origin", "Destination", "Mode", "Measure"];
const TRANSPORT_EXPAND: &[(&str, SetKind)] = &[
    ("Period", Periods),
    ("Origin", DepartingNodes),
    ("Destination", ReceivingNodes),
    ("Mode", Modes),
    ("Measure", Measures),
];

pub const LOAD_CAPACITY: TableSchema = TableSchema {
    name: "Load Capacity",
    key: TRANSPORT_KEY,
    expand: TRANSPORT_EXPAND,
};

pub const TRANSPORTATION_CONSTRAINTS: TableSchema = TableSchema {
    name: "Transportation Constraints",
    key: TRANSPORT_KEY,
    expand: TRANSPORT_EXPAND,
};

pub const TRANSPORTATION_EXPANSIONS: TableSchema = TableSchema {
    name: "Transportation Expansions",
    key: &[
        "Period",
        "Origin",
        "Destination",
        "Mode",
        "Measure",
        "Expansion",
    ],
    expand: TRANSPORT_EXPAND,
};

pub const RESOURCE_CAPACITY_TYPES: TableSchema = TableSchema {
    name: "Resource Capacity Types",
    key: &["Capacity Type"],
    expand: &[],
};

pub const RESOURCE_CAPACITIES: TableSchema = TableSchema {
    name: "Resource Capacities",
    key: &["Period", "Node", "Resource", "Capacity Type"],
    expand: &[
        ("Period", Periods),
        ("Node", Nodes),
        ("Resource", Resources),
        ("Capacity Type", CapacityTypes),
    ],
};

pub const RESOURCE_CAPACITY_CONSUMPTION: TableSchema = TableSchema {
    name: "Resource Capacity Consumption",
    key: &["Period", "Node", "Product", "Capacity Type"],
    expand: &[
        ("Period", Periods),
        ("Node", Nodes),
        ("Product", Products),
        ("Capacity Type", CapacityTypes),
    ],
};

pub const RESOURCE_COSTS: TableSchema = TableSchema {
    name: "Resource Costs",
    key: &["Period", "Node", "Resource"],
    expand: &[("Period", Periods), ("Node", Nodes), ("Resource", Resources)],
};

pub const RESOURCE_ATTRIBUTES: TableSchema = TableSchema {
    name: "Resource Attributes",
    key: &["Period", "Resource", "Attribute"],
    expand: &[
        ("Period", Periods),
        ("Resource", Resources),
        ("Attribute", Attributes),
    ],
};

pub const RESOURCE_ATTRIBUTE_CONSTRAINTS: TableSchema = TableSchema {
    name: "Resource Attribute Constraints",
    key: &["Period", "Node", "Attribute"],
    expand: &[("Period", Periods), ("Node", Nodes), ("Attribute", Attributes)],
};

pub const CARRYING_CAPACITY: TableSchema = TableSchema {
    name: "Carrying Capacity",
    key: &["Period", "Node", "Measure"],
    expand: &[("Period", Periods), ("Node", Nodes), ("Measure", Measures)],
};

pub const CARRYING_EXPANSIONS: TableSchema = TableSchema {
    name: "Carrying Expansions",
    key: &["Period", "Node", "Measure", "Expansion"],
    expand: &[("Period", Periods), ("Node", Nodes), ("Measure", Measures)],
};

pub const CARRYING_COSTS: TableSchema = TableSchema {
    name: "Carrying Costs",
    key: &["Period", "Node", "Product"],
    expand: &[("Period", Periods), ("Node", Nodes), ("Product", Products)],
};

pub const OPERATING_COSTS: TableSchema = TableSchema {
    name: "Operating Costs",
    key: &["Period", "Node"],
    expand: &[("Period", Periods), ("Node", Nodes)],
};

pub const VARIABLE_OPERATING_COSTS: TableSchema = TableSchema {
    name: "Variable Operating Costs",
    key: &["Period", "Node", "Product"],
    expand: &[("Period", Periods), ("Node", Nodes), ("Product", Products)],
};

pub const NODE_EVENTS: TableSchema = TableSchema {
    name: "Node Events",
    key: &["Period", "Node"],
    expand: &[("Period", Periods), ("Node", Nodes)],
};

pub const AGE_CONSTRAINTS: TableSchema = TableSchema {
    name: "Age Constraints",
    key: &["Period", "Product", "Destination", "Age"],
    expand: &[
        ("Period", Periods),
        ("Product", Products),
        ("Destination", ReceivingNodes),
        ("Age", Ages),
    ],
};

pub const ASSEMBLY_CONSTRAINTS: TableSchema = TableSchema {
    name: "Assembly Constraints",
    key: &["Period", "Node", "Product 1", "Product 2"],
    expand: &[("Period", Periods), ("Node", Nodes)],
};

pub const SHIPPING_ASSEMBLY_CONSTRAINTS: TableSchema = TableSchema {
    name: "Shipping Assembly Constraints",
    key: &[
        "Period",
        "Origin",
        "Destination",
        "Mode",
        "Product 1",
        "Product 2",
    ],
    expand: &[
        ("Period", Periods),
        ("Origin", DepartingNodes),
        ("Destination", ReceivingNodes),
        ("Mode", Modes),
    ],
};

pub const PLAN_OVER_PLAN: TableSchema = TableSchema {
    name: "Plan Over Plan",
    key: &["Period", "Product", "Origin", "Destination"],
    expand: &[
        ("Period", Periods),
        ("Product", Products),
        ("Origin", DepartingNodes),
        ("Destination", ReceivingNodes),
    ],
};

/// Every known table, definition tables first.
pub const TABLES: &[&TableSchema] = &[
    &PARAMETERS,
    &SCENARIOS,
    &OBJECTIVES,
    &PERIODS,
    &PRODUCTS,
    &NODES,
    &NODE_TYPES,
    &NODE_GROUPS,
    &DEMAND,
    &MAX_DROPPED,
    &FLOW,
    &OD_DISTANCES,
    &TRANSPORTATION_COSTS,
    &LOAD_CAPACITY,
    &TRANSPORTATION_CONSTRAINTS,
    &TRANSPORTATION_EXPANSIONS,
    &RESOURCE_CAPACITY_TYPES,
    &RESOURCE_CAPACITIES,
    &RESOURCE_CAPACITY_CONSUMPTION,
    &RESOURCE_COSTS,
    &RESOURCE_ATTRIBUTES,
    &RESOURCE_ATTRIBUTE_CONSTRAINTS,
    &CARRYING_CAPACITY,
    &CARRYING_EXPANSIONS,
    &CARRYING_COSTS,
    &OPERATING_COSTS,
    &VARIABLE_OPERATING_COSTS,
    &NODE_EVENTS,
    &AGE_CONSTRAINTS,
    &ASSEMBLY_CONSTRAINTS,
    &SHIPPING_ASSEMBLY_CONSTRAINTS,
    &PLAN_OVER_PLAN,
];

/// Looks up a table schema by name.
pub fn schema(name: &str) -> Option<&'static TableSchema> {
    TABLES.iter().copied().find(|s| s.name == name)
}
