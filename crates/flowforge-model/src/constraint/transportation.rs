//! Shipments, loads, lane limits, expansions and transportation cost.

use std::collections::BTreeMap;

use flowforge_core::records::TransportCostRecord;
use flowforge_core::Container;

use super::BuildContext;
use crate::error::Result;
use crate::linear::{LinearExpr, Sense, VarId};
use crate::model::Model;
use crate::variables::ShipmentKey;

/// Flows of one lane and period, grouped by product.
struct LaneFlows<'a> {
    ctx: &'a BuildContext<'a>,
    by_lane: BTreeMap<ShipmentKey, Vec<(String, VarId)>>,
}

impl<'a> LaneFlows<'a> {
    fn new(ctx: &'a BuildContext<'a>) -> Self {
        let mut by_lane: BTreeMap<ShipmentKey, Vec<(String, VarId)>> = BTreeMap::new();
        for ((o, d, p, t, m), &f) in &ctx.vars.flow {
            by_lane
                .entry((o.clone(), d.clone(), *t, m.clone()))
                .or_default()
                .push((p.clone(), f));
        }
        Self { ctx, by_lane }
    }

    fn flows(&self, key: &ShipmentKey) -> impl Iterator<Item = &(String, VarId)> {
        self.by_lane.get(key).into_iter().flatten()
    }

    /// Total flow in product units.
    fn volume(&self, key: &ShipmentKey) -> LinearExpr {
        LinearExpr::weighted(self.flows(key).map(|(_, f)| (*f, 1.0)))
    }

    /// Flow sized in `measure`.
    fn sized(&self, key: &ShipmentKey, measure: &str) -> LinearExpr {
        LinearExpr::weighted(
            self.flows(key)
                .map(|(p, f)| (*f, self.ctx.params.measure(p, measure))),
        )
    }
}

pub(super) fn build(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let lanes = LaneFlows::new(ctx);
    shipments(ctx, &lanes, model)?;
    loads(ctx, &lanes, model)?;
    costs(ctx, &lanes, model)?;
    lane_limits(ctx, &lanes, model)?;
    expansion_counts(ctx, model)
}

fn label((o, d, t, m): &ShipmentKey) -> String {
    format!("{o},{d},{t},{m}")
}

/// Flow on a lane requires a shipment, and every shipment raises the
/// maximum transit distance to at least the lane's distance.
fn shipments(ctx: &BuildContext<'_>, lanes: &LaneFlows<'_>, model: &mut Model) -> Result<()> {
    let vars = ctx.vars;
    for (key, &ship) in &vars.shipment {
        let (o, d, _, m) = key;
        let volume = lanes.volume(key);
        if !volume.is_empty() {
            model.add_constraint(
                format!("shipment_gate[{}]", label(key)),
                volume,
                Sense::Le,
                LinearExpr::term(ship, ctx.big_m()),
            )?;
        }
        let distance = ctx.params.distance(o, d, m);
        if distance > 0.0 {
            model.add_constraint(
                format!("transit_distance[{}]", label(key)),
                LinearExpr::from(vars.kpis.max_transit_distance),
                Sense::Ge,
                LinearExpr::term(ship, distance),
            )?;
        }
    }
    Ok(())
}

fn loads(ctx: &BuildContext<'_>, lanes: &LaneFlows<'_>, model: &mut Model) -> Result<()> {
    for r in &ctx.records().load_capacity {
        let key = (r.origin.clone(), r.destination.clone(), r.period, r.mode.clone());
        let Some(&loads) = ctx.vars.loads.get(&key) else {
            continue;
        };
        model.add_constraint(
            format!("load_capacity[{},{}]", label(&key), r.measure),
            lanes.sized(&key, &r.measure),
            Sense::Le,
            LinearExpr::term(loads, r.capacity),
        )?;
    }
    Ok(())
}

fn costs(ctx: &BuildContext<'_>, lanes: &LaneFlows<'_>, model: &mut Model) -> Result<()> {
    let vars = ctx.vars;
    let params = ctx.params;
    let mut rows: BTreeMap<ShipmentKey, Vec<&TransportCostRecord>> = BTreeMap::new();
    for r in &ctx.records().transport_costs {
        rows.entry((r.origin.clone(), r.destination.clone(), r.period, r.mode.clone()))
            .or_default()
            .push(r);
    }

    for (key, &cost) in &vars.transport_cost {
        let (o, d, t, m) = key;
        let Some(&ship) = vars.shipment.get(key) else {
            continue;
        };
        let weight = params.weight(*t);
        let distance = params.distance(o, d, m);
        let transit_time = params.transit_time(o, d, m);
        let mut charged = LinearExpr::zero();
        for row in rows.get(key).into_iter().flatten() {
            let rate = row.cost_per_unit
                + row.cost_per_distance * distance
                + row.cost_per_time * transit_time;
            match row.container {
                Container::Unit => {
                    charged.add_scaled(&lanes.sized(key, &row.measure), rate);
                    charged.add_term(ship, row.fixed_cost);
                }
                Container::Load => {
                    if let Some(&l) = vars.loads.get(key) {
                        charged.add_term(l, rate + row.fixed_cost);
                    }
                }
            }
            if row.minimum_cost > 0.0 {
                model.add_constraint(
                    format!(
                        "transport_minimum_cost[{},{},{}]",
                        label(key),
                        row.container.name(),
                        row.measure
                    ),
                    LinearExpr::from(cost),
                    Sense::Ge,
                    LinearExpr::term(ship, weight * row.minimum_cost),
                )?;
            }
        }
        model.add_constraint(
            format!("transport_cost[{}]", label(key)),
            LinearExpr::from(cost),
            Sense::Ge,
            charged * weight,
        )?;
    }
    Ok(())
}

/// Volume bounds per lane, lifted by any expansion taken up to the period,
/// and lane closure where distance or transit time exceed their limits.
fn lane_limits(ctx: &BuildContext<'_>, lanes: &LaneFlows<'_>, model: &mut Model) -> Result<()> {
    let vars = ctx.vars;
    let params = ctx.params;
    let records = ctx.records();
    for r in &records.transport_constraints {
        let (o, d, t, m) = (&r.origin, &r.destination, r.period, &r.mode);
        let key = (o.clone(), d.clone(), t, m.clone());
        let Some(&ship) = vars.shipment.get(&key) else {
            continue;
        };
        let volume = lanes.sized(&key, &r.measure);
        if let Some(min) = r.min {
            model.add_constraint(
                format!("lane_min[{},{}]", label(&key), r.measure),
                volume.clone(),
                Sense::Ge,
                min,
            )?;
        }
        if let Some(max) = r.max {
            let mut limit = LinearExpr::from_const(max);
            for e in records.transport_expansions.iter().filter(|e| {
                e.origin == *o && e.destination == *d && e.mode == *m && e.measure == r.measure && e.period <= t
            }) {
                let ek = (o.clone(), d.clone(), m.clone(), e.measure.clone(), e.expansion.clone(), e.period);
                if let Some(&x) = vars.transport_expansion.get(&ek) {
                    limit.add_term(x, e.capacity);
                }
            }
            model.add_constraint(
                format!("lane_max[{},{}]", label(&key), r.measure),
                volume,
                Sense::Le,
                limit,
            )?;
        }
        let too_far = r.max_distance.is_some_and(|limit| params.distance(o, d, m) > limit);
        let too_slow = r
            .max_transit_time
            .is_some_and(|limit| params.transit_time(o, d, m) > limit);
        if too_far || too_slow {
            model.add_constraint(
                format!("lane_closed[{},{}]", label(&key), r.measure),
                LinearExpr::from(ship),
                Sense::Le,
                0.0,
            )?;
        }
    }
    Ok(())
}

/// An expansion is taken at most its declared count across the horizon.
fn expansion_counts(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let mut limit: BTreeMap<(String, String, String, String, String), u32> = BTreeMap::new();
    for e in &ctx.records().transport_expansions {
        let k = (e.origin.clone(), e.destination.clone(), e.mode.clone(), e.measure.clone(), e.expansion.clone());
        let slot = limit.entry(k).or_insert(0);
        *slot = (*slot).max(e.max_count);
    }
    let mut taken: BTreeMap<(String, String, String, String, String), LinearExpr> = BTreeMap::new();
    for ((o, d, m, u, e, _), &x) in &ctx.vars.transport_expansion {
        taken
            .entry((o.clone(), d.clone(), m.clone(), u.clone(), e.clone()))
            .or_default()
            .add_term(x, 1.0);
    }
    for (k, count) in taken {
        let max = limit.get(&k).copied().unwrap_or(0);
        let (o, d, m, u, e) = k;
        model.add_constraint(
            format!("transport_expansion_count[{o},{d},{m},{u},{e}]"),
            count,
            Sense::Le,
            f64::from(max),
        )?;
    }
    Ok(())
}
