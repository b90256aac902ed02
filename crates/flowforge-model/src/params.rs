//! Parameter lookups keyed by index tuples.
//!
//! Records arrive as flat vectors; constraint families look values up by
//! key instead of scanning. Missing keys fall back to neutral defaults.

use std::collections::{BTreeMap, BTreeSet};

use flowforge_config::ModelSettings;
use flowforge_core::records::{
    CarryingCostRecord, NodeRecord, OdRecord, OperatingCostRecord, ResourceCapacityRecord,
    ResourceCostRecord,
};
use flowforge_core::{Period, ScenarioData};

type Lane = (String, String, String);
type NodePeriod = (String, Period);
type NodeProductPeriod = (String, String, Period);

/// Keyed view of one scenario's records.
#[derive(Debug, Clone, Default)]
pub struct Params {
    pub big_m: f64,
    pub default_drop_cost: f64,
    weights: BTreeMap<Period, f64>,
    measures: BTreeMap<(String, String), f64>,
    lanes: BTreeMap<Lane, OdRecord>,
    nodes: BTreeMap<String, NodeRecord>,
    demand: BTreeMap<NodeProductPeriod, (f64, f64)>,
    consumption: BTreeMap<(String, Period, String), Vec<(String, f64)>>,
    resource_costs: BTreeMap<(String, String, Period), ResourceCostRecord>,
    resource_capacity: BTreeMap<(String, Period, String), Vec<ResourceCapacityRecord>>,
    attributes: BTreeMap<(String, Period, String), f64>,
    operating_costs: BTreeMap<NodePeriod, OperatingCostRecord>,
    variable_costs: BTreeMap<NodeProductPeriod, f64>,
    carrying_costs: BTreeMap<NodeProductPeriod, CarryingCostRecord>,
    events: BTreeMap<NodePeriod, (bool, bool)>,
}

impl Params {
    pub fn new(data: &ScenarioData, settings: &ModelSettings) -> Self {
        let r = &data.records;
        let mut p = Params {
            big_m: settings.big_m,
            default_drop_cost: settings.default_drop_cost,
            ..Default::default()
        };

        p.weights = r.periods.iter().map(|x| (x.period, x.weight)).collect();
        p.measures = r
            .products
            .iter()
            .map(|x| ((x.product.clone(), x.measure.clone()), x.value))
            .collect();
        p.lanes = r
            .od_distances
            .iter()
            .map(|x| ((x.origin.clone(), x.destination.clone(), x.mode.clone()), x.clone()))
            .collect();
        p.nodes = r.nodes.iter().map(|n| (n.name.clone(), n.clone())).collect();
        p.demand = r
            .demand
            .iter()
            .map(|d| {
                let drop_cost = d.drop_cost.unwrap_or(settings.default_drop_cost);
                (
                    (d.destination.clone(), d.product.clone(), d.period),
                    (d.demand, drop_cost),
                )
            })
            .collect();
        for c in &r.capacity_consumption {
            p.consumption
                .entry((c.node.clone(), c.period, c.capacity_type.clone()))
                .or_default()
                .push((c.product.clone(), c.consumption));
        }
        p.resource_costs = r
            .resource_costs
            .iter()
            .map(|c| ((c.resource.clone(), c.node.clone(), c.period), c.clone()))
            .collect();
        for c in &r.resource_capacities {
            p.resource_capacity
                .entry((c.node.clone(), c.period, c.capacity_type.clone()))
                .or_default()
                .push(c.clone());
        }
        p.attributes = r
            .resource_attributes
            .iter()
            .map(|a| ((a.resource.clone(), a.period, a.attribute.clone()), a.value))
            .collect();
        p.operating_costs = r
            .operating_costs
            .iter()
            .map(|c| ((c.node.clone(), c.period), c.clone()))
            .collect();
        p.variable_costs = r
            .variable_operating_costs
            .iter()
            .map(|c| ((c.node.clone(), c.product.clone(), c.period), c.cost))
            .collect();
        p.carrying_costs = r
            .carrying_costs
            .iter()
            .map(|c| ((c.node.clone(), c.product.clone(), c.period), c.clone()))
            .collect();
        p.events = r
            .node_events
            .iter()
            .map(|e| ((e.node.clone(), e.period), (e.launch, e.shutdown)))
            .collect();
        p
    }

    /// Objective weight of a period; 1 when undeclared.
    pub fn weight(&self, period: Period) -> f64 {
        self.weights.get(&period).copied().unwrap_or(1.0)
    }

    /// Size of one unit of `product` in `measure`.
    pub fn measure(&self, product: &str, measure: &str) -> f64 {
        self.measures
            .get(&(product.to_string(), measure.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn lane(&self, origin: &str, destination: &str, mode: &str) -> Option<&OdRecord> {
        self.lanes
            .get(&(origin.to_string(), destination.to_string(), mode.to_string()))
    }

    /// Whole periods between departure and arrival on a lane.
    pub fn lag(&self, origin: &str, destination: &str, mode: &str) -> usize {
        self.lane(origin, destination, mode)
            .map_or(0, |l| l.transit_periods as usize)
    }

    pub fn distance(&self, origin: &str, destination: &str, mode: &str) -> f64 {
        self.lane(origin, destination, mode).map_or(0.0, |l| l.distance)
    }

    pub fn transit_time(&self, origin: &str, destination: &str, mode: &str) -> f64 {
        self.lane(origin, destination, mode).map_or(0.0, |l| l.transit_time)
    }

    pub fn node(&self, name: &str) -> Option<&NodeRecord> {
        self.nodes.get(name)
    }

    /// `(demand, drop cost)` of a node, product and period.
    pub fn demand(&self, node: &str, product: &str, period: Period) -> Option<(f64, f64)> {
        self.demand
            .get(&(node.to_string(), product.to_string(), period))
            .copied()
    }

    /// `(product, rate)` pairs charged directly to a capacity type.
    pub fn consumption(&self, node: &str, period: Period, capacity_type: &str) -> &[(String, f64)] {
        self.consumption
            .get(&(node.to_string(), period, capacity_type.to_string()))
            .map_or(&[], Vec::as_slice)
    }

    /// Capacity types with a direct consumption rate at a node and period.
    pub fn consumed_types(&self, node: &str, period: Period) -> BTreeSet<String> {
        self.consumption
            .keys()
            .filter(|(n, t, _)| n == node && *t == period)
            .map(|(_, _, c)| c.clone())
            .collect()
    }

    pub fn resource_cost(&self, resource: &str, node: &str, period: Period) -> Option<&ResourceCostRecord> {
        self.resource_costs
            .get(&(resource.to_string(), node.to_string(), period))
    }

    /// Whether any period declares costs for a resource at a node.
    pub fn has_resource_costs(&self, resource: &str, node: &str) -> bool {
        self.resource_costs
            .keys()
            .any(|(r, n, _)| r == resource && n == node)
    }

    pub fn resource_capacity(
        &self,
        node: &str,
        period: Period,
        capacity_type: &str,
    ) -> &[ResourceCapacityRecord] {
        self.resource_capacity
            .get(&(node.to_string(), period, capacity_type.to_string()))
            .map_or(&[], Vec::as_slice)
    }

    pub fn capacity_keys(&self) -> impl Iterator<Item = &(String, Period, String)> {
        self.resource_capacity.keys()
    }

    pub fn attribute(&self, resource: &str, period: Period, attribute: &str) -> f64 {
        self.attributes
            .get(&(resource.to_string(), period, attribute.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn operating_cost(&self, node: &str, period: Period) -> Option<&OperatingCostRecord> {
        self.operating_costs.get(&(node.to_string(), period))
    }

    pub fn variable_cost(&self, node: &str, product: &str, period: Period) -> f64 {
        self.variable_costs
            .get(&(node.to_string(), product.to_string(), period))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn carrying_cost(&self, node: &str, product: &str, period: Period) -> Option<&CarryingCostRecord> {
        self.carrying_costs
            .get(&(node.to_string(), product.to_string(), period))
    }

    /// Forced `(launch, shutdown)` events of a node in a period.
    pub fn events(&self, node: &str, period: Period) -> (bool, bool) {
        self.events
            .get(&(node.to_string(), period))
            .copied()
            .unwrap_or((false, false))
    }
}
