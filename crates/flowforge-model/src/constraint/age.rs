//! Age tracking of inbound-carried volume.
//!
//! Volume carried at a node is split into age buckets. Bucket 0 holds
//! what arrived this period, bucket `a` holds what was in bucket `a - 1`
//! the period before, and the oldest bucket absorbs everything older.

use super::BuildContext;
use crate::error::Result;
use crate::linear::{LinearExpr, Sense};
use crate::model::Model;
use crate::variables::npt;

pub(super) fn build(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    if !ctx.vars.tracks_age() {
        return Ok(());
    }
    buckets(ctx, model)?;
    limits(ctx, model)
}

fn buckets(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let vars = ctx.vars;
    let sets = ctx.sets();
    let oldest = sets.ages.last().copied().unwrap_or(0);

    for ((n, p, t), &carried) in &vars.ib_carried {
        let prev = sets.prev_period(*t);
        let mut total = LinearExpr::term(carried, -1.0);
        for &a in &sets.ages {
            let Some(&bucket) = vars.carried_by_age.get(&(n.clone(), p.clone(), *t, a)) else {
                continue;
            };
            total.add_term(bucket, 1.0);

            let mut source = LinearExpr::zero();
            if a == 0 {
                if let Some(&arrived) = vars.arrived.get(&npt(n, p, *t)) {
                    source.add_term(arrived, 1.0);
                }
            }
            if let Some(prev) = prev {
                let mut feeders = Vec::with_capacity(2);
                if a > 0 {
                    feeders.push(a - 1);
                }
                if a == oldest {
                    feeders.push(a);
                }
                for f in feeders {
                    if let Some(&v) = vars.carried_by_age.get(&(n.clone(), p.clone(), prev, f)) {
                        source.add_term(v, 1.0);
                    }
                }
            }
            model.add_constraint(
                format!("age_bucket[{n},{p},{t},{a}]"),
                LinearExpr::from(bucket),
                Sense::Le,
                source,
            )?;

            if let Some(&held) = vars.age_held.get(&(n.clone(), p.clone(), *t, a)) {
                model.add_constraint(
                    format!("age_held[{n},{p},{t},{a}]"),
                    LinearExpr::from(bucket),
                    Sense::Le,
                    LinearExpr::term(held, ctx.big_m()),
                )?;
                if a > 0 {
                    model.add_constraint(
                        format!("max_age[{n},{p},{t},{a}]"),
                        LinearExpr::from(vars.kpis.max_age),
                        Sense::Ge,
                        LinearExpr::term(held, f64::from(a)),
                    )?;
                }
            }
        }
        model.add_constraint(format!("age_total[{n},{p},{t}]"), total, Sense::Eq, 0.0)?;
    }
    Ok(())
}

/// Volume at or above an age threshold stays under its limit, unless a
/// violation cost lets the excess through.
fn limits(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let vars = ctx.vars;
    for r in &ctx.records().age_constraints {
        let (n, p, t, age) = (&r.destination, &r.product, r.period, r.age);
        let mut old = LinearExpr::weighted(
            ctx.sets()
                .ages
                .iter()
                .filter(|&&a| a >= age)
                .filter_map(|&a| vars.carried_by_age.get(&(n.clone(), p.clone(), t, a)))
                .map(|&v| (v, 1.0)),
        );
        if let Some(&excess) = vars.age_violation.get(&(n.clone(), p.clone(), t, age)) {
            old.add_term(excess, -1.0);
        }
        model.add_constraint(format!("age_limit[{n},{p},{t},{age}]"), old, Sense::Le, r.max_volume)?;
    }
    Ok(())
}
