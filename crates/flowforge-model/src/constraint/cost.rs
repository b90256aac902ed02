//! Cost components and volume indicators.
//!
//! Each cost component variable equals its period-weighted expression, so
//! the cost objective is just their sum and per-component totals can be
//! reported after a solve.

use super::BuildContext;
use crate::error::Result;
use crate::linear::{LinearExpr, Sense};
use crate::model::Model;
use crate::variables::CostComponent;

pub(super) fn build(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    for component in CostComponent::ALL {
        let Some(var) = ctx.vars.cost(component) else {
            continue;
        };
        model.add_constraint(
            format!("cost[{component}]"),
            LinearExpr::from(var),
            Sense::Eq,
            expression(ctx, component),
        )?;
    }
    let delivered = LinearExpr::weighted(ctx.vars.delivered.values().map(|&v| (v, 1.0)));
    model.add_constraint(
        "total_delivered",
        LinearExpr::from(ctx.vars.kpis.total_delivered),
        Sense::Eq,
        delivered,
    )?;
    Ok(())
}

fn expression(ctx: &BuildContext<'_>, component: CostComponent) -> LinearExpr {
    let vars = ctx.vars;
    let params = ctx.params;
    let records = ctx.records();
    let w = |t| params.weight(t);
    match component {
        CostComponent::Transportation => {
            LinearExpr::weighted(vars.transport_cost.values().map(|&v| (v, 1.0)))
        }
        CostComponent::TransportationExpansion => {
            LinearExpr::weighted(records.transport_expansions.iter().filter_map(|e| {
                let key = (
                    e.origin.clone(),
                    e.destination.clone(),
                    e.mode.clone(),
                    e.measure.clone(),
                    e.expansion.clone(),
                    e.period,
                );
                vars.transport_expansion
                    .get(&key)
                    .map(|&x| (x, w(e.period) * e.cost))
            }))
        }
        CostComponent::FixedOperating => LinearExpr::weighted(vars.operating.iter().map(|((n, t), &v)| {
            (v, w(*t) * params.operating_cost(n, *t).map_or(0.0, |c| c.fixed_cost))
        })),
        CostComponent::VariableOperating => {
            LinearExpr::weighted(vars.processed.iter().map(|((n, p, t), &v)| {
                (v, w(*t) * params.variable_cost(n, p, *t))
            }))
        }
        CostComponent::Launch => LinearExpr::weighted(vars.launched.iter().map(|((n, t), &v)| {
            (v, w(*t) * params.operating_cost(n, *t).map_or(0.0, |c| c.launch_cost))
        })),
        CostComponent::Shutdown => LinearExpr::weighted(vars.shut_down.iter().map(|((n, t), &v)| {
            (v, w(*t) * params.operating_cost(n, *t).map_or(0.0, |c| c.shutdown_cost))
        })),
        CostComponent::Carrying => {
            let inbound = vars.ib_carried.iter().map(|((n, p, t), &v)| {
                (v, w(*t) * params.carrying_cost(n, p, *t).map_or(0.0, |c| c.inbound_cost))
            });
            let outbound = vars.ob_carried.iter().map(|((n, p, t), &v)| {
                (v, w(*t) * params.carrying_cost(n, p, *t).map_or(0.0, |c| c.outbound_cost))
            });
            LinearExpr::weighted(inbound.chain(outbound))
        }
        CostComponent::CarryingExpansion => {
            LinearExpr::weighted(records.carrying_expansions.iter().filter_map(|e| {
                vars.carrying_expansion
                    .get(&(e.node.clone(), e.measure.clone(), e.expansion.clone(), e.period))
                    .map(|&x| (x, w(e.period) * e.cost))
            }))
        }
        CostComponent::Dropping => LinearExpr::weighted(vars.dropped.iter().map(|((n, p, t), &v)| {
            let drop_cost = params
                .demand(n, p, *t)
                .map_or(params.default_drop_cost, |(_, c)| c);
            (v, w(*t) * drop_cost)
        })),
        CostComponent::AgeViolation => {
            LinearExpr::weighted(records.age_constraints.iter().filter_map(|r| {
                let key = (r.destination.clone(), r.product.clone(), r.period, r.age);
                match (vars.age_violation.get(&key), r.violation_cost) {
                    (Some(&x), Some(cost)) => Some((x, w(r.period) * cost)),
                    _ => None,
                }
            }))
        }
        CostComponent::PlanOverPlan => {
            LinearExpr::weighted(records.plan_over_plan.iter().flat_map(|r| {
                let key = (r.origin.clone(), r.destination.clone(), r.product.clone(), r.period);
                let rate = w(r.period) * r.cost_per_volume_moved;
                [vars.volume_up.get(&key), vars.volume_down.get(&key)]
                    .into_iter()
                    .flatten()
                    .map(move |&x| (x, rate))
            }))
        }
        CostComponent::Resource => {
            let mut expr = LinearExpr::zero();
            for (key, &assigned) in &vars.resources_assigned {
                let (r, n, t) = key;
                let Some(cost) = params.resource_cost(r, n, *t) else {
                    continue;
                };
                let weight = w(*t);
                expr.add_term(assigned, weight * cost.cost_per_period);
                if let Some(&flag) = vars.add_flag.get(key) {
                    expr.add_term(flag, weight * cost.add_cost);
                }
                if let Some(&flag) = vars.remove_flag.get(key) {
                    expr.add_term(flag, weight * cost.remove_cost);
                }
            }
            expr
        }
    }
}
