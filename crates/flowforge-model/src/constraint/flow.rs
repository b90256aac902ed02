//! Flow balance, demand satisfaction and flow rules.

use std::collections::BTreeMap;

use flowforge_core::records::FlowRecord;

use super::{BuildContext, DemandMode};
use crate::error::Result;
use crate::linear::{LinearExpr, Sense};
use crate::model::Model;
use crate::variables::{npt, NodeProductPeriod};

pub(super) fn build(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    arrivals(ctx, model)?;
    inbound_balance(ctx, model)?;
    outbound_balance(ctx, model)?;
    demand(ctx, model)?;
    operating_gate(ctx, model)?;
    for (i, rule) in ctx.records().flow.iter().enumerate() {
        flow_rule(ctx, model, i, rule)?;
    }
    max_dropped(ctx, model)
}

/// Volume arriving at a node is what departed `lag` periods earlier.
fn arrivals(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let sets = ctx.sets();
    let mut inbound: BTreeMap<NodeProductPeriod, LinearExpr> = BTreeMap::new();
    for ((o, d, p, t, m), &f) in &ctx.vars.flow {
        if let Some(arrival) = sets.period_after(*t, ctx.params.lag(o, d, m)) {
            inbound.entry(npt(d, p, arrival)).or_default().add_term(f, 1.0);
        }
    }
    for (key, &a) in &ctx.vars.arrived {
        let (n, p, t) = key;
        let shipped = inbound.remove(key).unwrap_or_default();
        model.add_constraint(
            format!("arrival[{n},{p},{t}]"),
            LinearExpr::from(a) - shipped,
            Sense::Eq,
            0.0,
        )?;
    }
    Ok(())
}

/// `arrived + carried(t-1) = carried(t) + processed` at receiving nodes.
///
/// Origins that also receive may produce on top of what arrives, so the
/// row is an inequality there.
fn inbound_balance(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let sets = ctx.sets();
    let vars = ctx.vars;
    for ((n, p, t), &ib) in &vars.ib_carried {
        let key = npt(n, p, *t);
        let mut expr = LinearExpr::term(ib, -1.0);
        if let Some(&a) = vars.arrived.get(&key) {
            expr.add_term(a, 1.0);
        }
        if let Some(&prev) = sets
            .prev_period(*t)
            .and_then(|prev| vars.ib_carried.get(&npt(n, p, prev)))
        {
            expr.add_term(prev, 1.0);
        }
        if let Some(&x) = vars.processed.get(&key) {
            expr.add_term(x, -1.0);
        }
        let sense = if sets.origins.contains(n) {
            Sense::Le
        } else {
            Sense::Eq
        };
        model.add_constraint(format!("inbound_balance[{n},{p},{t}]"), expr, sense, 0.0)?;
    }
    Ok(())
}

/// `processed + carried(t-1) = carried(t) + shipped + delivered`.
fn outbound_balance(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let sets = ctx.sets();
    let vars = ctx.vars;
    let mut outflow: BTreeMap<NodeProductPeriod, LinearExpr> = BTreeMap::new();
    for ((o, _, p, t, _), &f) in &vars.flow {
        outflow.entry(npt(o, p, *t)).or_default().add_term(f, 1.0);
    }

    for ((n, p, t), &x) in &vars.processed {
        let key = npt(n, p, *t);
        let mut expr = LinearExpr::from(x);
        if let Some(shipped) = outflow.get(&key) {
            expr -= shipped;
        }
        if let Some(&ob) = vars.ob_carried.get(&key) {
            expr.add_term(ob, -1.0);
        }
        if let Some(&prev) = sets
            .prev_period(*t)
            .and_then(|prev| vars.ob_carried.get(&npt(n, p, prev)))
        {
            expr.add_term(prev, 1.0);
        }
        if let Some(&del) = vars.delivered.get(&key) {
            expr.add_term(del, -1.0);
        }
        model.add_constraint(format!("outbound_balance[{n},{p},{t}]"), expr, Sense::Eq, 0.0)?;
    }
    Ok(())
}

fn demand(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let sense = match ctx.demand_mode {
        DemandMode::Exact => Sense::Eq,
        DemandMode::AtLeast => Sense::Ge,
    };
    for r in &ctx.records().demand {
        let key = npt(&r.destination, &r.product, r.period);
        let (Some(&del), Some(&drop)) = (ctx.vars.delivered.get(&key), ctx.vars.dropped.get(&key))
        else {
            continue;
        };
        model.add_constraint(
            format!("demand[{},{},{}]", r.destination, r.product, r.period),
            LinearExpr::from(del) + drop,
            sense,
            r.demand,
        )?;
    }
    Ok(())
}

/// No volume is received or processed at a node that is not operating.
fn operating_gate(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let vars = ctx.vars;
    for ((n, t), &op) in &vars.operating {
        let mut volume = LinearExpr::zero();
        for p in &ctx.sets().products {
            let key = npt(n, p, *t);
            for v in [vars.processed.get(&key), vars.arrived.get(&key)].into_iter().flatten() {
                volume.add_term(*v, 1.0);
            }
        }
        if volume.is_empty() {
            continue;
        }
        volume.add_term(op, -ctx.big_m());
        model.add_constraint(format!("operating_gate[{n},{t}]"), volume, Sense::Le, 0.0)?;
    }
    Ok(())
}

/// Flow percentages above 1 are read as percent.
fn fraction(value: f64) -> f64 {
    if value > 1.0 {
        value / 100.0
    } else {
        value
    }
}

/// Flows selected by a rule, sized in the rule's measure.
///
/// The origin and destination filters can be dropped to get the base of an
/// outbound or inbound share.
fn selected(ctx: &BuildContext<'_>, rule: &FlowRecord, by_origin: bool, by_destination: bool) -> LinearExpr {
    let sets = ctx.sets();
    let in_group = |group: &Option<String>, node: &str| group.as_ref().map_or(true, |g| sets.in_group(g, node));
    let mut expr = LinearExpr::zero();
    for ((o, d, p, t, m), &f) in &ctx.vars.flow {
        if !(rule.period.matches(t) && rule.product.matches(p) && rule.mode.matches(m)) {
            continue;
        }
        if by_origin && !(rule.node.matches(o) && in_group(&rule.node_group, o)) {
            continue;
        }
        if by_destination && !(rule.downstream.matches(d) && in_group(&rule.downstream_group, d)) {
            continue;
        }
        expr.add_term(f, ctx.params.measure(p, &rule.measure));
    }
    expr
}

fn flow_rule(ctx: &BuildContext<'_>, model: &mut Model, i: usize, rule: &FlowRecord) -> Result<()> {
    let lane = selected(ctx, rule, true, true);
    if let Some(min) = rule.min {
        model.add_constraint(format!("flow_min[{i}]"), lane.clone(), Sense::Ge, min)?;
    }
    if let Some(max) = rule.max {
        model.add_constraint(format!("flow_max[{i}]"), lane.clone(), Sense::Le, max)?;
    }

    let shares = [
        ("flow_min_pct_outbound", rule.min_pct_outbound, Sense::Ge, true),
        ("flow_max_pct_outbound", rule.max_pct_outbound, Sense::Le, true),
        ("flow_min_pct_inbound", rule.min_pct_inbound, Sense::Ge, false),
        ("flow_max_pct_inbound", rule.max_pct_inbound, Sense::Le, false),
    ];
    for (name, pct, sense, outbound) in shares {
        let Some(pct) = pct else { continue };
        let base = selected(ctx, rule, outbound, !outbound);
        model.add_constraint(
            format!("{name}[{i}]"),
            lane.clone() - base.scaled(fraction(pct)),
            sense,
            0.0,
        )?;
    }
    Ok(())
}

fn max_dropped(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    for (i, rule) in ctx.records().max_dropped.iter().enumerate() {
        let dropped = LinearExpr::weighted(
            ctx.vars
                .dropped
                .iter()
                .filter(|((n, p, t), _)| {
                    rule.node.matches(n) && rule.product.matches(p) && rule.period.matches(t)
                })
                .map(|(_, &v)| (v, 1.0)),
        );
        model.add_constraint(format!("max_dropped[{i}]"), dropped, Sense::Le, rule.max_dropped)?;
    }
    Ok(())
}
