//! Decision variables, declared per category over structurally feasible
//! index tuples.
//!
//! A category's domain never varies by tuple: flows are continuous, loads
//! and resource cohorts integer, node states binary.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use flowforge_core::{ObjectiveKind, Period, ScenarioData};

use crate::error::Result;
use crate::linear::VarId;
use crate::model::{Domain, Model};
use crate::params::Params;

pub type FlowKey = (String, String, String, Period, String);
pub type ShipmentKey = (String, String, Period, String);
pub type NodeProductPeriod = (String, String, Period);
pub type AgeKey = (String, String, Period, u32);
pub type NodePeriod = (String, Period);
pub type ResourceKey = (String, String, Period);
pub type ConsumptionKey = (String, Period, String);
pub type TransportExpansionKey = (String, String, String, String, String, Period);
pub type CarryingExpansionKey = (String, String, String, Period);
pub type LaneProductPeriod = (String, String, String, Period);

/// Variable categories and their fixed domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarFamily {
    Flow,
    Loads,
    Shipment,
    TransportCost,
    Arrived,
    Processed,
    InboundCarried,
    OutboundCarried,
    CarriedByAge,
    AgeHeld,
    AgeViolation,
    Delivered,
    Dropped,
    Operating,
    Launched,
    ShutDown,
    ResourcesAssigned,
    ResourcesAdded,
    ResourcesRemoved,
    AddCohorts,
    RemoveCohorts,
    AddFlag,
    RemoveFlag,
    Consumption,
    TransportExpansion,
    CarryingExpansion,
    VolumeUp,
    VolumeDown,
    Kpi,
    Cost,
}

impl VarFamily {
    pub fn domain(self) -> Domain {
        use VarFamily::*;
        match self {
            Loads | ResourcesAssigned | ResourcesAdded | ResourcesRemoved | AddCohorts
            | RemoveCohorts | TransportExpansion => Domain::Integer,
            Shipment | AgeHeld | Operating | Launched | ShutDown | AddFlag | RemoveFlag
            | CarryingExpansion => Domain::Binary,
            _ => Domain::Continuous,
        }
    }

    pub fn prefix(self) -> &'static str {
        use VarFamily::*;
        match self {
            Flow => "flow",
            Loads => "loads",
            Shipment => "shipment",
            TransportCost => "transport_cost",
            Arrived => "arrived",
            Processed => "processed",
            InboundCarried => "ib_carried",
            OutboundCarried => "ob_carried",
            CarriedByAge => "carried_by_age",
            AgeHeld => "age_held",
            AgeViolation => "age_violation",
            Delivered => "delivered",
            Dropped => "dropped",
            Operating => "operating",
            Launched => "launched",
            ShutDown => "shut_down",
            ResourcesAssigned => "resources_assigned",
            ResourcesAdded => "resources_added",
            ResourcesRemoved => "resources_removed",
            AddCohorts => "resource_add_cohorts",
            RemoveCohorts => "resource_remove_cohorts",
            AddFlag => "resource_added_flag",
            RemoveFlag => "resource_removed_flag",
            Consumption => "consumption",
            TransportExpansion => "transport_expansion",
            CarryingExpansion => "carrying_expansion",
            VolumeUp => "volume_up",
            VolumeDown => "volume_down",
            Kpi => "kpi",
            Cost => "cost",
        }
    }
}

/// Named cost components summed by the cost objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CostComponent {
    Transportation,
    TransportationExpansion,
    FixedOperating,
    VariableOperating,
    Launch,
    Shutdown,
    Carrying,
    CarryingExpansion,
    Dropping,
    AgeViolation,
    PlanOverPlan,
    Resource,
}

impl CostComponent {
    pub const ALL: [CostComponent; 12] = [
        CostComponent::Transportation,
        CostComponent::TransportationExpansion,
        CostComponent::FixedOperating,
        CostComponent::VariableOperating,
        CostComponent::Launch,
        CostComponent::Shutdown,
        CostComponent::Carrying,
        CostComponent::CarryingExpansion,
        CostComponent::Dropping,
        CostComponent::AgeViolation,
        CostComponent::PlanOverPlan,
        CostComponent::Resource,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CostComponent::Transportation => "transportation",
            CostComponent::TransportationExpansion => "transportation_expansion",
            CostComponent::FixedOperating => "fixed_operating",
            CostComponent::VariableOperating => "variable_operating",
            CostComponent::Launch => "launch",
            CostComponent::Shutdown => "shutdown",
            CostComponent::Carrying => "carrying",
            CostComponent::CarryingExpansion => "carrying_expansion",
            CostComponent::Dropping => "dropping",
            CostComponent::AgeViolation => "age_violation",
            CostComponent::PlanOverPlan => "plan_over_plan",
            CostComponent::Resource => "resource",
        }
    }
}

impl fmt::Display for CostComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar indicators used by the min-max objectives.
#[derive(Debug, Clone, Copy)]
pub struct Kpis {
    pub max_transit_distance: VarId,
    pub max_age: VarId,
    pub max_utilization: VarId,
    pub total_volume_moved: VarId,
    pub total_delivered: VarId,
}

/// Every declared variable, keyed by its index tuple.
#[derive(Debug, Clone)]
pub struct VariableSpace {
    pub flow: BTreeMap<FlowKey, VarId>,
    pub loads: BTreeMap<ShipmentKey, VarId>,
    pub shipment: BTreeMap<ShipmentKey, VarId>,
    pub transport_cost: BTreeMap<ShipmentKey, VarId>,
    pub arrived: BTreeMap<NodeProductPeriod, VarId>,
    pub processed: BTreeMap<NodeProductPeriod, VarId>,
    pub ib_carried: BTreeMap<NodeProductPeriod, VarId>,
    pub ob_carried: BTreeMap<NodeProductPeriod, VarId>,
    pub carried_by_age: BTreeMap<AgeKey, VarId>,
    pub age_held: BTreeMap<AgeKey, VarId>,
    pub age_violation: BTreeMap<AgeKey, VarId>,
    pub delivered: BTreeMap<NodeProductPeriod, VarId>,
    pub dropped: BTreeMap<NodeProductPeriod, VarId>,
    pub operating: BTreeMap<NodePeriod, VarId>,
    pub launched: BTreeMap<NodePeriod, VarId>,
    pub shut_down: BTreeMap<NodePeriod, VarId>,
    pub resources_assigned: BTreeMap<ResourceKey, VarId>,
    pub resources_added: BTreeMap<ResourceKey, VarId>,
    pub resources_removed: BTreeMap<ResourceKey, VarId>,
    pub add_cohorts: BTreeMap<ResourceKey, VarId>,
    pub remove_cohorts: BTreeMap<ResourceKey, VarId>,
    pub add_flag: BTreeMap<ResourceKey, VarId>,
    pub remove_flag: BTreeMap<ResourceKey, VarId>,
    pub consumption: BTreeMap<ConsumptionKey, VarId>,
    pub transport_expansion: BTreeMap<TransportExpansionKey, VarId>,
    pub carrying_expansion: BTreeMap<CarryingExpansionKey, VarId>,
    pub volume_up: BTreeMap<LaneProductPeriod, VarId>,
    pub volume_down: BTreeMap<LaneProductPeriod, VarId>,
    pub costs: BTreeMap<CostComponent, VarId>,
    pub kpis: Kpis,
    /// Resource-node pairs whose counts are planned rather than fixed.
    pub planned_resources: BTreeSet<(String, String)>,
}

struct Declarer<'m> {
    model: &'m mut Model,
}

impl Declarer<'_> {
    fn add<K: Ord>(
        &mut self,
        map: &mut BTreeMap<K, VarId>,
        family: VarFamily,
        key: K,
        label: fmt::Arguments<'_>,
        upper: f64,
    ) -> Result<VarId> {
        let id = self.model.add_variable(
            format!("{}[{}]", family.prefix(), label),
            family.domain(),
            0.0,
            upper,
        )?;
        map.insert(key, id);
        Ok(id)
    }

    fn scalar(&mut self, family: VarFamily, label: &str) -> Result<VarId> {
        self.model.add_variable(
            format!("{}[{}]", family.prefix(), label),
            family.domain(),
            0.0,
            f64::INFINITY,
        )
    }
}

const INF: f64 = f64::INFINITY;

impl VariableSpace {
    /// Declares every variable category of one scenario into `model`.
    pub fn declare(data: &ScenarioData, params: &Params, model: &mut Model) -> Result<Self> {
        let sets = &data.sets;
        let records = &data.records;
        let mut d = Declarer { model };

        let mut flow = BTreeMap::new();
        let mut shipment = BTreeMap::new();
        let mut transport_cost = BTreeMap::new();
        for arc in &sets.arcs {
            let (o, dst, m) = (&arc.origin, &arc.destination, &arc.mode);
            let lag = params.lag(o, dst, m);
            for &t in &sets.periods {
                if sets.period_after(t, lag).is_none() {
                    continue;
                }
                for p in &sets.products {
                    d.add(
                        &mut flow,
                        VarFamily::Flow,
                        (o.clone(), dst.clone(), p.clone(), t, m.clone()),
                        format_args!("{o},{dst},{p},{t},{m}"),
                        INF,
                    )?;
                }
                let key = (o.clone(), dst.clone(), t, m.clone());
                d.add(&mut shipment, VarFamily::Shipment, key.clone(), format_args!("{o},{dst},{t},{m}"), 1.0)?;
                d.add(&mut transport_cost, VarFamily::TransportCost, key, format_args!("{o},{dst},{t},{m}"), INF)?;
            }
        }

        let load_lanes: BTreeSet<ShipmentKey> = records
            .transport_costs
            .iter()
            .filter(|c| c.container == flowforge_core::Container::Load)
            .map(|c| (c.origin.clone(), c.destination.clone(), c.period, c.mode.clone()))
            .chain(
                records
                    .load_capacity
                    .iter()
                    .map(|c| (c.origin.clone(), c.destination.clone(), c.period, c.mode.clone())),
            )
            .filter(|k| shipment.contains_key(k))
            .collect();
        let mut loads = BTreeMap::new();
        for (o, dst, t, m) in load_lanes {
            let label = format!("{o},{dst},{t},{m}");
            d.add(&mut loads, VarFamily::Loads, (o, dst, t, m), format_args!("{label}"), INF)?;
        }

        let active: BTreeSet<&String> = sets
            .departing_nodes
            .iter()
            .chain(&sets.receiving_nodes)
            .collect();
        let producing: BTreeSet<&String> = sets.origins.iter().chain(&sets.receiving_nodes).collect();

        let mut arrived = BTreeMap::new();
        let mut processed = BTreeMap::new();
        let mut ib_carried = BTreeMap::new();
        let mut ob_carried = BTreeMap::new();
        for &t in &sets.periods {
            for p in &sets.products {
                for n in &sets.receiving_nodes {
                    let key = (n.clone(), p.clone(), t);
                    d.add(&mut arrived, VarFamily::Arrived, key.clone(), format_args!("{n},{p},{t}"), INF)?;
                    d.add(&mut ib_carried, VarFamily::InboundCarried, key, format_args!("{n},{p},{t}"), INF)?;
                }
                for n in &producing {
                    d.add(&mut processed, VarFamily::Processed, ((*n).clone(), p.clone(), t), format_args!("{n},{p},{t}"), INF)?;
                }
                for n in &sets.departing_nodes {
                    d.add(&mut ob_carried, VarFamily::OutboundCarried, (n.clone(), p.clone(), t), format_args!("{n},{p},{t}"), INF)?;
                }
            }
        }

        let track_age = !records.age_constraints.is_empty()
            || records
                .objectives
                .iter()
                .any(|o| o.objective == ObjectiveKind::MinimizeMaximumAge);
        let mut carried_by_age = BTreeMap::new();
        let mut age_held = BTreeMap::new();
        if track_age {
            for (n, p, t) in ib_carried.keys() {
                for &a in &sets.ages {
                    let key = (n.clone(), p.clone(), *t, a);
                    d.add(&mut carried_by_age, VarFamily::CarriedByAge, key.clone(), format_args!("{n},{p},{t},{a}"), INF)?;
                    d.add(&mut age_held, VarFamily::AgeHeld, key, format_args!("{n},{p},{t},{a}"), 1.0)?;
                }
            }
        }
        let mut age_violation = BTreeMap::new();
        for r in records.age_constraints.iter().filter(|r| r.violation_cost.is_some()) {
            let (n, p, t, a) = (&r.destination, &r.product, r.period, r.age);
            d.add(&mut age_violation, VarFamily::AgeViolation, (n.clone(), p.clone(), t, a), format_args!("{n},{p},{t},{a}"), INF)?;
        }

        let mut delivered = BTreeMap::new();
        let mut dropped = BTreeMap::new();
        for r in &records.demand {
            let (n, p, t) = (&r.destination, &r.product, r.period);
            let key = (n.clone(), p.clone(), t);
            d.add(&mut delivered, VarFamily::Delivered, key.clone(), format_args!("{n},{p},{t}"), INF)?;
            d.add(&mut dropped, VarFamily::Dropped, key, format_args!("{n},{p},{t}"), INF)?;
        }

        let mut operating = BTreeMap::new();
        let mut launched = BTreeMap::new();
        let mut shut_down = BTreeMap::new();
        for n in &active {
            for &t in &sets.periods {
                let key = ((*n).clone(), t);
                d.add(&mut operating, VarFamily::Operating, key.clone(), format_args!("{n},{t}"), 1.0)?;
                d.add(&mut launched, VarFamily::Launched, key.clone(), format_args!("{n},{t}"), 1.0)?;
                d.add(&mut shut_down, VarFamily::ShutDown, key, format_args!("{n},{t}"), 1.0)?;
            }
        }

        let resource_pairs: BTreeSet<(String, String)> = records
            .resource_capacities
            .iter()
            .map(|r| (r.resource.clone(), r.node.clone()))
            .chain(records.resource_costs.iter().map(|r| (r.resource.clone(), r.node.clone())))
            .collect();
        let planned_resources: BTreeSet<(String, String)> = resource_pairs
            .iter()
            .filter(|(r, n)| params.has_resource_costs(r, n))
            .cloned()
            .collect();
        let mut resources_assigned = BTreeMap::new();
        let mut resources_added = BTreeMap::new();
        let mut resources_removed = BTreeMap::new();
        let mut add_cohorts = BTreeMap::new();
        let mut remove_cohorts = BTreeMap::new();
        let mut add_flag = BTreeMap::new();
        let mut remove_flag = BTreeMap::new();
        for (r, n) in &resource_pairs {
            let planned = planned_resources.contains(&(r.clone(), n.clone()));
            for &t in &sets.periods {
                let key = (r.clone(), n.clone(), t);
                d.add(&mut resources_assigned, VarFamily::ResourcesAssigned, key.clone(), format_args!("{r},{n},{t}"), INF)?;
                if !planned {
                    continue;
                }
                d.add(&mut resources_added, VarFamily::ResourcesAdded, key.clone(), format_args!("{r},{n},{t}"), INF)?;
                d.add(&mut resources_removed, VarFamily::ResourcesRemoved, key.clone(), format_args!("{r},{n},{t}"), INF)?;
                d.add(&mut add_cohorts, VarFamily::AddCohorts, key.clone(), format_args!("{r},{n},{t}"), INF)?;
                d.add(&mut remove_cohorts, VarFamily::RemoveCohorts, key.clone(), format_args!("{r},{n},{t}"), INF)?;
                d.add(&mut add_flag, VarFamily::AddFlag, key.clone(), format_args!("{r},{n},{t}"), 1.0)?;
                d.add(&mut remove_flag, VarFamily::RemoveFlag, key, format_args!("{r},{n},{t}"), 1.0)?;
            }
        }

        let mut consumption = BTreeMap::new();
        for n in &sets.nodes {
            for &t in &sets.periods {
                let mut types = params.consumed_types(n, t);
                let ancestors: Vec<String> = types
                    .iter()
                    .flat_map(|c| sets.capacity_types.ancestors(c))
                    .map(|(a, _)| a)
                    .collect();
                types.extend(ancestors);
                for c in types {
                    let label = format!("{n},{t},{c}");
                    d.add(&mut consumption, VarFamily::Consumption, (n.clone(), t, c), format_args!("{label}"), INF)?;
                }
            }
        }

        let mut transport_expansion = BTreeMap::new();
        for r in &records.transport_expansions {
            if !shipment.contains_key(&(r.origin.clone(), r.destination.clone(), r.period, r.mode.clone())) {
                continue;
            }
            let (o, dst, m, u, e, t) = (&r.origin, &r.destination, &r.mode, &r.measure, &r.expansion, r.period);
            d.add(
                &mut transport_expansion,
                VarFamily::TransportExpansion,
                (o.clone(), dst.clone(), m.clone(), u.clone(), e.clone(), t),
                format_args!("{o},{dst},{m},{u},{e},{t}"),
                f64::from(r.max_count),
            )?;
        }

        let mut carrying_expansion = BTreeMap::new();
        for r in &records.carrying_expansions {
            let (n, u, e, t) = (&r.node, &r.measure, &r.expansion, r.period);
            d.add(
                &mut carrying_expansion,
                VarFamily::CarryingExpansion,
                (n.clone(), u.clone(), e.clone(), t),
                format_args!("{n},{u},{e},{t}"),
                1.0,
            )?;
        }

        let lanes: BTreeSet<(String, String, String)> = flow
            .keys()
            .map(|(o, dst, p, _, _)| (o.clone(), dst.clone(), p.clone()))
            .collect();
        let mut volume_up = BTreeMap::new();
        let mut volume_down = BTreeMap::new();
        for (o, dst, p) in &lanes {
            for &t in sets.periods.iter().skip(1) {
                let key = (o.clone(), dst.clone(), p.clone(), t);
                d.add(&mut volume_up, VarFamily::VolumeUp, key.clone(), format_args!("{o},{dst},{p},{t}"), INF)?;
                d.add(&mut volume_down, VarFamily::VolumeDown, key, format_args!("{o},{dst},{p},{t}"), INF)?;
            }
        }

        let mut costs = BTreeMap::new();
        for c in CostComponent::ALL {
            let id = d.scalar(VarFamily::Cost, c.name())?;
            costs.insert(c, id);
        }
        let kpis = Kpis {
            max_transit_distance: d.scalar(VarFamily::Kpi, "max_transit_distance")?,
            max_age: d.scalar(VarFamily::Kpi, "max_age")?,
            max_utilization: d.scalar(VarFamily::Kpi, "max_utilization")?,
            total_volume_moved: d.scalar(VarFamily::Kpi, "total_volume_moved")?,
            total_delivered: d.scalar(VarFamily::Kpi, "total_delivered")?,
        };

        Ok(Self {
            flow,
            loads,
            shipment,
            transport_cost,
            arrived,
            processed,
            ib_carried,
            ob_carried,
            carried_by_age,
            age_held,
            age_violation,
            delivered,
            dropped,
            operating,
            launched,
            shut_down,
            resources_assigned,
            resources_added,
            resources_removed,
            add_cohorts,
            remove_cohorts,
            add_flag,
            remove_flag,
            consumption,
            transport_expansion,
            carrying_expansion,
            volume_up,
            volume_down,
            costs,
            kpis,
            planned_resources,
        })
    }

    pub fn cost(&self, component: CostComponent) -> Option<VarId> {
        self.costs.get(&component).copied()
    }

    pub fn tracks_age(&self) -> bool {
        !self.carried_by_age.is_empty()
    }
}

/// Owned node-product-period key.
pub(crate) fn npt(node: &str, product: &str, period: Period) -> NodeProductPeriod {
    (node.to_string(), product.to_string(), period)
}
