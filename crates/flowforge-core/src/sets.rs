//! Index-set derivation.
//!
//! [`NetworkSets::derive`] computes every canonical set from the definition
//! tables of one scenario. Arcs depend on wildcard-expanded transportation
//! rows and are attached afterwards with [`NetworkSets::attach_arcs`].

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::records::{
    CapacityTypeRecord, Container, NodeRecord, NodeRoles, OdRecord, Period, Record, RowReader,
    TransportCostRecord,
};
use crate::schema::{self, SetKind};
use crate::table::InputTables;

/// A parent link in the capacity-type forest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentLink {
    pub parent: String,
    /// Units of parent capacity consumed per unit of child consumption.
    pub rate: f64,
}

/// Capacity types arranged as a forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CapacityHierarchy {
    types: BTreeSet<String>,
    parents: BTreeMap<String, ParentLink>,
}

impl CapacityHierarchy {
    /// Builds the forest, rejecting any type that is its own ancestor.
    pub fn new(
        types: impl IntoIterator<Item = String>,
        links: impl IntoIterator<Item = (String, ParentLink)>,
    ) -> Result<Self> {
        let mut hierarchy = Self {
            types: types.into_iter().collect(),
            parents: BTreeMap::new(),
        };
        for (child, link) in links {
            hierarchy.types.insert(child.clone());
            hierarchy.types.insert(link.parent.clone());
            hierarchy.parents.insert(child, link);
        }
        for start in &hierarchy.types {
            let mut seen = BTreeSet::new();
            let mut current = start.as_str();
            while let Some(link) = hierarchy.parents.get(current) {
                if link.parent == *start || !seen.insert(current) {
                    return Err(ConfigError::HierarchyCycle(start.clone()));
                }
                current = &link.parent;
            }
        }
        Ok(hierarchy)
    }

    pub fn types(&self) -> &BTreeSet<String> {
        &self.types
    }

    pub fn contains(&self, capacity_type: &str) -> bool {
        self.types.contains(capacity_type)
    }

    pub fn parent(&self, capacity_type: &str) -> Option<&ParentLink> {
        self.parents.get(capacity_type)
    }

    /// Types that are some other type's parent.
    pub fn parent_types(&self) -> BTreeSet<String> {
        self.parents.values().map(|l| l.parent.clone()).collect()
    }

    /// Types without children.
    pub fn child_types(&self) -> BTreeSet<String> {
        let parents = self.parent_types();
        self.types.difference(&parents).cloned().collect()
    }

    /// Ancestors of `capacity_type`, nearest first, each with the cumulative
    /// conversion factor from `capacity_type`.
    pub fn ancestors(&self, capacity_type: &str) -> Vec<(String, f64)> {
        let mut out = Vec::new();
        let mut factor = 1.0;
        let mut current = capacity_type;
        while let Some(link) = self.parents.get(current) {
            factor *= link.rate;
            out.push((link.parent.clone(), factor));
            current = &link.parent;
        }
        out
    }

    /// Descendants of `capacity_type`, each with its cumulative conversion
    /// factor into `capacity_type`.
    pub fn descendants(&self, capacity_type: &str) -> Vec<(String, f64)> {
        self.types
            .iter()
            .filter_map(|t| {
                self.ancestors(t)
                    .into_iter()
                    .find(|(a, _)| a == capacity_type)
                    .map(|(_, f)| (t.clone(), f))
            })
            .collect()
    }
}

/// A mode-specific lane between two communicating nodes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ArcMode {
    pub origin: String,
    pub destination: String,
    pub mode: String,
}

/// Every canonical index set of one scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkSets {
    pub nodes: BTreeSet<String>,
    pub origins: BTreeSet<String>,
    pub destinations: BTreeSet<String>,
    pub intermediates: BTreeSet<String>,
    pub departing_nodes: BTreeSet<String>,
    pub receiving_nodes: BTreeSet<String>,
    pub node_types: BTreeSet<String>,
    pub node_type_members: BTreeMap<String, BTreeSet<String>>,
    pub node_groups: BTreeMap<String, BTreeSet<String>>,
    pub periods: Vec<Period>,
    pub products: BTreeSet<String>,
    pub measures: BTreeSet<String>,
    pub modes: BTreeSet<String>,
    pub containers: Vec<Container>,
    pub resources: BTreeSet<String>,
    pub capacity_types: CapacityHierarchy,
    pub resource_attributes: BTreeSet<String>,
    pub transportation_expansions: BTreeSet<String>,
    pub carrying_expansions: BTreeSet<String>,
    pub ages: Vec<u32>,
    pub arcs: BTreeSet<ArcMode>,
    pub roles: BTreeMap<String, NodeRoles>,
}

fn explicit(tables: &InputTables, sources: &[(&str, &str)]) -> BTreeSet<String> {
    sources
        .iter()
        .filter_map(|(table, column)| tables.get(table).map(|t| t.explicit_values(column)))
        .flatten()
        .collect()
}

fn parse_raw<R: Record>(tables: &InputTables) -> Result<Vec<R>> {
    tables
        .rows(R::SCHEMA.name)
        .iter()
        .map(|r| R::from_row(&RowReader::new(R::SCHEMA.name, r)))
        .collect()
}

impl NetworkSets {
    /// Derives every set except arcs from the (unexpanded) scenario tables.
    ///
    /// Only explicit values contribute members; `*` and `@` cells never do.
    pub fn derive(tables: &InputTables) -> Result<Self> {
        let nodes: Vec<NodeRecord> = parse_raw(tables)?;
        let mut sets = NetworkSets {
            containers: Container::ALL.to_vec(),
            ..Default::default()
        };

        for node in &nodes {
            let name = node.name.clone();
            sets.nodes.insert(name.clone());
            sets.roles.insert(name.clone(), node.roles);
            if node.roles.origin {
                sets.origins.insert(name.clone());
            }
            if node.roles.destination {
                sets.destinations.insert(name.clone());
            }
            if node.roles.intermediate {
                sets.intermediates.insert(name.clone());
            }
            if node.roles.is_departing() {
                sets.departing_nodes.insert(name.clone());
            }
            if node.roles.is_receiving() {
                sets.receiving_nodes.insert(name.clone());
            }
            if let Some(t) = &node.node_type {
                sets.node_types.insert(t.clone());
                sets.node_type_members
                    .entry(t.clone())
                    .or_default()
                    .insert(name);
            }
        }
        sets.node_types
            .extend(explicit(tables, &[(schema::NODE_TYPES.name, "Node Type")]));

        for r in tables.rows(schema::NODE_GROUPS.name) {
            let reader = RowReader::new(schema::NODE_GROUPS.name, r);
            let node = reader.text("Node")?;
            sets.require(schema::NODE_GROUPS.name, SetKind::Nodes, &node)?;
            sets.node_groups
                .entry(reader.text("Group")?)
                .or_default()
                .insert(node);
        }

        let mut periods = BTreeSet::new();
        for r in tables.rows(schema::PERIODS.name) {
            periods.insert(RowReader::new(schema::PERIODS.name, r).period("Period")?);
        }
        sets.periods = periods.into_iter().collect();

        sets.products = explicit(tables, &[(schema::PRODUCTS.name, "Product")]);
        sets.measures = explicit(tables, &[(schema::PRODUCTS.name, "Measure")]);
        sets.modes = explicit(
            tables,
            &[
                (schema::OD_DISTANCES.name, "Mode"),
                (schema::TRANSPORTATION_COSTS.name, "Mode"),
            ],
        );
        sets.resources = explicit(
            tables,
            &[
                (schema::RESOURCE_CAPACITIES.name, "Resource"),
                (schema::RESOURCE_COSTS.name, "Resource"),
                (schema::RESOURCE_ATTRIBUTES.name, "Resource"),
            ],
        );
        sets.resource_attributes = explicit(tables, &[(schema::RESOURCE_ATTRIBUTES.name, "Attribute")]);
        sets.transportation_expansions =
            explicit(tables, &[(schema::TRANSPORTATION_EXPANSIONS.name, "Expansion")]);
        sets.carrying_expansions = explicit(tables, &[(schema::CARRYING_EXPANSIONS.name, "Expansion")]);

        let type_records: Vec<CapacityTypeRecord> = parse_raw(tables)?;
        let declared = explicit(
            tables,
            &[
                (schema::RESOURCE_CAPACITIES.name, "Capacity Type"),
                (schema::RESOURCE_CAPACITY_CONSUMPTION.name, "Capacity Type"),
            ],
        );
        sets.capacity_types = CapacityHierarchy::new(
            type_records
                .iter()
                .map(|r| r.capacity_type.clone())
                .chain(declared),
            type_records.iter().filter_map(|r| {
                r.parent.as_ref().map(|p| {
                    (
                        r.capacity_type.clone(),
                        ParentLink {
                            parent: p.clone(),
                            rate: r.relative_rate,
                        },
                    )
                })
            }),
        )?;

        let max_age = explicit(tables, &[(schema::AGE_CONSTRAINTS.name, "Age")])
            .iter()
            .filter_map(|a| a.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        sets.ages = (0..=max_age).collect();

        Ok(sets)
    }

    /// Derives arc-modes: role-compatible pairs that a distance or cost row
    /// declares a mode for.
    pub fn attach_arcs(&mut self, od: &[OdRecord], costs: &[TransportCostRecord]) {
        let declared = od
            .iter()
            .map(|r| (&r.origin, &r.destination, &r.mode))
            .chain(costs.iter().map(|r| (&r.origin, &r.destination, &r.mode)));
        for (o, d, m) in declared {
            if self.communicates(o, d) {
                self.arcs.insert(ArcMode {
                    origin: o.clone(),
                    destination: d.clone(),
                    mode: m.clone(),
                });
            }
        }
    }

    /// Whether role flags allow flow from `origin` to `destination`.
    pub fn communicates(&self, origin: &str, destination: &str) -> bool {
        if origin == destination {
            return false;
        }
        match (self.roles.get(origin), self.roles.get(destination)) {
            (Some(o), Some(d)) => o.can_ship_to(d),
            _ => false,
        }
    }

    /// Members of a set, as strings, in canonical order.
    pub fn members(&self, kind: SetKind) -> Vec<String> {
        fn owned(set: &BTreeSet<String>) -> Vec<String> {
            set.iter().cloned().collect()
        }
        match kind {
            SetKind::Scenarios => Vec::new(),
            SetKind::Periods => self.periods.iter().map(|p| p.to_string()).collect(),
            SetKind::Products => owned(&self.products),
            SetKind::Measures => owned(&self.measures),
            SetKind::Nodes => owned(&self.nodes),
            SetKind::Origins => owned(&self.origins),
            SetKind::Destinations => owned(&self.destinations),
            SetKind::Intermediates => owned(&self.intermediates),
            SetKind::DepartingNodes => owned(&self.departing_nodes),
            SetKind::ReceivingNodes => owned(&self.receiving_nodes),
            SetKind::NodeTypes => owned(&self.node_types),
            SetKind::NodeGroups => self.node_groups.keys().cloned().collect(),
            SetKind::Modes => owned(&self.modes),
            SetKind::Containers => self.containers.iter().map(|c| c.name().to_string()).collect(),
            SetKind::Resources => owned(&self.resources),
            SetKind::CapacityTypes => owned(self.capacity_types.types()),
            SetKind::Attributes => owned(&self.resource_attributes),
            SetKind::TransportationExpansions => owned(&self.transportation_expansions),
            SetKind::CarryingExpansions => owned(&self.carrying_expansions),
            SetKind::Ages => self.ages.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn contains(&self, kind: SetKind, value: &str) -> bool {
        match kind {
            SetKind::Periods => value
                .parse::<Period>()
                .is_ok_and(|p| self.periods.binary_search(&p).is_ok()),
            SetKind::Ages => value.parse::<u32>().is_ok_and(|a| self.ages.contains(&a)),
            SetKind::NodeGroups => self.node_groups.contains_key(value),
            SetKind::CapacityTypes => self.capacity_types.contains(value),
            _ => self.members(kind).iter().any(|m| m == value),
        }
    }

    /// Fails with [`ConfigError::UnknownMember`] unless `value` is in the set.
    pub fn require(&self, table: &str, kind: SetKind, value: &str) -> Result<()> {
        if self.contains(kind, value) {
            Ok(())
        } else {
            Err(ConfigError::UnknownMember {
                table: table.to_string(),
                set: kind.label(),
                value: value.to_string(),
            })
        }
    }

    pub fn first_period(&self) -> Option<Period> {
        self.periods.first().copied()
    }

    pub fn last_period(&self) -> Option<Period> {
        self.periods.last().copied()
    }

    /// The period immediately before `period`.
    pub fn prev_period(&self, period: Period) -> Option<Period> {
        let i = self.periods.binary_search(&period).ok()?;
        i.checked_sub(1).map(|j| self.periods[j])
    }

    /// The period `steps` positions after `period`.
    pub fn period_after(&self, period: Period, steps: usize) -> Option<Period> {
        let i = self.periods.binary_search(&period).ok()?;
        self.periods.get(i + steps).copied()
    }

    /// Position of `period` in the ordered horizon.
    pub fn period_index(&self, period: Period) -> Option<usize> {
        self.periods.binary_search(&period).ok()
    }

    pub fn arcs_from<'a>(&'a self, origin: &'a str) -> impl Iterator<Item = &'a ArcMode> + 'a {
        self.arcs.iter().filter(move |a| a.origin == origin)
    }

    pub fn arcs_into<'a>(&'a self, destination: &'a str) -> impl Iterator<Item = &'a ArcMode> + 'a {
        self.arcs.iter().filter(move |a| a.destination == destination)
    }

    pub fn in_group(&self, group: &str, node: &str) -> bool {
        self.node_groups.get(group).is_some_and(|g| g.contains(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;
    use crate::table::Table;

    fn nodes_table() -> InputTables {
        InputTables::new()
            .with_table(
                "Nodes",
                vec![
                    row! { "Name" => "O", "Origin Node" => "X", "Send to Destinations" => "X", "Send to Intermediates" => "X" },
                    row! { "Name" => "H", "Intermediate Node" => "X", "Receive from Origins" => "X", "Send to Destinations" => "X" },
                    row! { "Name" => "D", "Destination Node" => "X", "Receive from Origins" => "X", "Receive from Intermediates" => "X" },
                    row! { "Name" => "Idle" },
                ],
            )
            .with_table("Periods", vec![row! { "Period" => 2 }, row! { "Period" => 1 }])
    }

    #[test]
    fn test_departing_and_receiving_nodes() {
        let sets = NetworkSets::derive(&nodes_table()).unwrap();
        assert_eq!(sets.departing_nodes, BTreeSet::from(["H", "O"].map(String::from)));
        assert_eq!(sets.receiving_nodes, BTreeSet::from(["D", "H"].map(String::from)));
        assert_eq!(sets.periods, vec![1, 2]);
        assert!(sets.nodes.contains("Idle"));
        assert!(!sets.departing_nodes.contains("Idle"));
    }

    #[test]
    fn test_role_compatibility() {
        let sets = NetworkSets::derive(&nodes_table()).unwrap();
        assert!(sets.communicates("O", "D"));
        assert!(sets.communicates("O", "H"));
        assert!(sets.communicates("H", "D"));
        assert!(!sets.communicates("D", "O"));
        assert!(!sets.communicates("O", "O"));
        assert!(!sets.communicates("O", "Idle"));
    }

    #[test]
    fn test_ages_from_max_declared_age() {
        let mut tables = nodes_table();
        tables.insert(
            "Age Constraints",
            Table::from_rows(vec![
                row! { "Age" => 3 },
                row! { "Age" => 1 },
                row! { "Age" => "*" },
            ]),
        );
        let sets = NetworkSets::derive(&tables).unwrap();
        assert_eq!(sets.ages, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_capacity_hierarchy_conversion() {
        let h = CapacityHierarchy::new(
            Vec::new(),
            vec![
                (
                    "picking".to_string(),
                    ParentLink { parent: "labor".to_string(), rate: 0.5 },
                ),
                (
                    "labor".to_string(),
                    ParentLink { parent: "site".to_string(), rate: 2.0 },
                ),
            ],
        )
        .unwrap();
        assert_eq!(
            h.ancestors("picking"),
            vec![("labor".to_string(), 0.5), ("site".to_string(), 1.0)]
        );
        assert_eq!(h.child_types(), BTreeSet::from(["picking".to_string()]));
        let mut into_site = h.descendants("site");
        into_site.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            into_site,
            vec![("labor".to_string(), 2.0), ("picking".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_capacity_hierarchy_cycle_is_rejected() {
        let err = CapacityHierarchy::new(
            Vec::new(),
            vec![
                ("a".to_string(), ParentLink { parent: "b".to_string(), rate: 1.0 }),
                ("b".to_string(), ParentLink { parent: "a".to_string(), rate: 1.0 }),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::HierarchyCycle(_)));
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let tables = nodes_table().with_table(
            "Resource Capacity Types",
            vec![row! { "Capacity Type" => "dock", "Parent" => "dock" }],
        );
        assert!(matches!(
            NetworkSets::derive(&tables),
            Err(ConfigError::HierarchyCycle(t)) if t == "dock"
        ));
    }

    #[test]
    fn test_unknown_group_member() {
        let tables = nodes_table().with_table(
            "Node Groups",
            vec![row! { "Node" => "Nowhere", "Group" => "east" }],
        );
        assert!(matches!(
            NetworkSets::derive(&tables),
            Err(ConfigError::UnknownMember { .. })
        ));
    }
}
