//! Resource counts over time: carry-forward, increments, bounds and
//! attribute limits.

use super::BuildContext;
use crate::error::Result;
use crate::linear::{LinearExpr, Sense};
use crate::model::Model;

pub(super) fn build(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    counts(ctx, model)?;
    attributes(ctx, model)
}

fn counts(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let vars = ctx.vars;
    let sets = ctx.sets();
    for (key, &assigned) in &vars.resources_assigned {
        let (r, n, t) = key;
        let label = format!("{r},{n},{t}");
        if !vars.planned_resources.contains(&(r.clone(), n.clone())) {
            model.add_constraint(format!("fixed_resource[{label}]"), assigned.into(), Sense::Eq, 1.0)?;
            continue;
        }
        let (Some(&added), Some(&removed), Some(&add_n), Some(&remove_n), Some(&add_f), Some(&remove_f)) = (
            vars.resources_added.get(key),
            vars.resources_removed.get(key),
            vars.add_cohorts.get(key),
            vars.remove_cohorts.get(key),
            vars.add_flag.get(key),
            vars.remove_flag.get(key),
        ) else {
            continue;
        };
        let cost = ctx.params.resource_cost(r, n, *t);

        let mut balance = LinearExpr::from(assigned) - added + removed;
        match sets.prev_period(*t) {
            Some(prev) => {
                if let Some(&before) = vars.resources_assigned.get(&(r.clone(), n.clone(), prev)) {
                    balance.add_term(before, -1.0);
                }
                model.add_constraint(format!("resource_balance[{label}]"), balance, Sense::Eq, 0.0)?;
            }
            None => {
                let initial = cost.map_or(0.0, |c| c.initial_count);
                model.add_constraint(format!("resource_balance[{label}]"), balance, Sense::Eq, initial)?;
            }
        }

        let add_increment = cost.map_or(1.0, |c| c.add_increment);
        let remove_increment = cost.map_or(1.0, |c| c.remove_increment);
        model.add_constraint(
            format!("resource_add_increment[{label}]"),
            added.into(),
            Sense::Eq,
            LinearExpr::term(add_n, add_increment),
        )?;
        model.add_constraint(
            format!("resource_remove_increment[{label}]"),
            removed.into(),
            Sense::Eq,
            LinearExpr::term(remove_n, remove_increment),
        )?;
        model.add_constraint(
            format!("resource_add_flag[{label}]"),
            added.into(),
            Sense::Le,
            LinearExpr::term(add_f, ctx.big_m()),
        )?;
        model.add_constraint(
            format!("resource_remove_flag[{label}]"),
            removed.into(),
            Sense::Le,
            LinearExpr::term(remove_f, ctx.big_m()),
        )?;

        if let Some(min) = cost.and_then(|c| c.min_count) {
            model.add_constraint(format!("resource_min[{label}]"), assigned.into(), Sense::Ge, min)?;
        }
        if let Some(max) = cost.and_then(|c| c.max_count) {
            model.add_constraint(format!("resource_max[{label}]"), assigned.into(), Sense::Le, max)?;
        }
    }
    Ok(())
}

/// Attribute totals of the resources at a node stay within their bounds.
fn attributes(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let vars = ctx.vars;
    for r in &ctx.records().attribute_constraints {
        let (n, t, a) = (&r.node, r.period, &r.attribute);
        let total = LinearExpr::weighted(
            vars.resources_assigned
                .iter()
                .filter(|((_, node, period), _)| node == n && *period == t)
                .map(|((res, _, _), &count)| (count, ctx.params.attribute(res, t, a))),
        );
        if let Some(min) = r.min {
            model.add_constraint(format!("attribute_min[{n},{t},{a}]"), total.clone(), Sense::Ge, min)?;
        }
        if let Some(max) = r.max {
            model.add_constraint(format!("attribute_max[{n},{t},{a}]"), total, Sense::Le, max)?;
        }
    }
    Ok(())
}
