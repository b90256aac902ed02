//! Resource capacity, capacity-type roll-up, utilization and carrying
//! capacity.

use std::collections::BTreeMap;

use flowforge_core::Period;

use super::BuildContext;
use crate::error::Result;
use crate::linear::{LinearExpr, Sense};
use crate::model::Model;
use crate::variables::npt;

pub(super) fn build(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    consumption(ctx, model)?;
    resource_capacity(ctx, model)?;
    carrying_capacity(ctx, model)
}

/// Consumption of a capacity type is its direct product consumption plus
/// every child type's consumption converted at the child's relative rate.
fn consumption(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let vars = ctx.vars;
    let hierarchy = &ctx.sets().capacity_types;
    for ((n, t, c), &total) in &vars.consumption {
        let mut expr = LinearExpr::from(total);
        for (p, rate) in ctx.params.consumption(n, *t, c) {
            if let Some(&x) = vars.processed.get(&npt(n, p, *t)) {
                expr.add_term(x, -rate);
            }
        }
        for child in hierarchy.types() {
            let Some(link) = hierarchy.parent(child).filter(|l| l.parent == *c) else {
                continue;
            };
            if let Some(&k) = vars.consumption.get(&(n.clone(), *t, child.clone())) {
                expr.add_term(k, -link.rate);
            }
        }
        model.add_constraint(format!("consumption[{n},{t},{c}]"), expr, Sense::Eq, 0.0)?;
    }
    Ok(())
}

/// Consumption stays within the capacity of the resources assigned, and
/// utilization against the largest possible resource count is bounded by
/// the maximum-utilization indicator.
fn resource_capacity(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let vars = ctx.vars;
    for (n, t, c) in ctx.params.capacity_keys() {
        let Some(&used) = vars.consumption.get(&(n.clone(), *t, c.clone())) else {
            continue;
        };
        let mut available = LinearExpr::zero();
        let mut reference = 0.0;
        for cap in ctx.params.resource_capacity(n, *t, c) {
            if let Some(&count) = vars.resources_assigned.get(&(cap.resource.clone(), n.clone(), *t)) {
                available.add_term(count, cap.capacity);
            }
            reference += cap.capacity * max_count(ctx, &cap.resource, n, *t);
        }
        model.add_constraint(
            format!("resource_capacity[{n},{t},{c}]"),
            LinearExpr::from(used),
            Sense::Le,
            available,
        )?;
        if reference > 0.0 {
            model.add_constraint(
                format!("utilization[{n},{t},{c}]"),
                LinearExpr::from(vars.kpis.max_utilization),
                Sense::Ge,
                LinearExpr::term(used, 1.0 / reference),
            )?;
        }
    }
    Ok(())
}

/// Largest resource count a node may hold in a period.
fn max_count(ctx: &BuildContext<'_>, resource: &str, node: &str, period: Period) -> f64 {
    match ctx.params.resource_cost(resource, node, period) {
        Some(cost) => cost.max_count.unwrap_or(cost.initial_count),
        None if ctx.params.has_resource_costs(resource, node) => 0.0,
        None => 1.0,
    }
}

fn carrying_capacity(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let vars = ctx.vars;
    let records = ctx.records();
    for r in &records.carrying_capacity {
        let (n, u, t) = (&r.node, &r.measure, r.period);
        let sides = [
            ("inbound", r.inbound, &vars.ib_carried),
            ("outbound", r.outbound, &vars.ob_carried),
        ];
        for (side, cap, carried) in sides {
            let Some(cap) = cap else { continue };
            let mut held = LinearExpr::zero();
            for p in &ctx.sets().products {
                if let Some(&v) = carried.get(&npt(n, p, t)) {
                    held.add_term(v, ctx.params.measure(p, u));
                }
            }
            for e in records
                .carrying_expansions
                .iter()
                .filter(|e| e.node == *n && e.measure == *u && e.period <= t)
            {
                let increment = if side == "inbound" { e.inbound } else { e.outbound };
                if let Some(&x) = vars
                    .carrying_expansion
                    .get(&(n.clone(), u.clone(), e.expansion.clone(), e.period))
                {
                    held.add_term(x, -increment);
                }
            }
            model.add_constraint(format!("{side}_carrying_capacity[{n},{u},{t}]"), held, Sense::Le, cap)?;
        }
    }

    let mut once: BTreeMap<(String, String, String), LinearExpr> = BTreeMap::new();
    for ((n, u, e, _), &x) in &vars.carrying_expansion {
        once.entry((n.clone(), u.clone(), e.clone()))
            .or_default()
            .add_term(x, 1.0);
    }
    for ((n, u, e), taken) in once {
        model.add_constraint(format!("carrying_expansion_once[{n},{u},{e}]"), taken, Sense::Le, 1.0)?;
    }
    Ok(())
}
