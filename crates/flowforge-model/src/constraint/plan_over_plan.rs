//! Period-over-period change in lane volume.

use std::collections::BTreeMap;

use super::BuildContext;
use crate::error::Result;
use crate::linear::{LinearExpr, Sense};
use crate::model::Model;
use crate::variables::LaneProductPeriod;

/// `sum_m flow(t) - sum_m flow(t-1) = up - down`; the total of all ups and
/// downs is the volume moved between plans.
pub(super) fn build(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let vars = ctx.vars;
    let mut lane: BTreeMap<LaneProductPeriod, LinearExpr> = BTreeMap::new();
    for ((o, d, p, t, _), &f) in &vars.flow {
        lane.entry((o.clone(), d.clone(), p.clone(), *t))
            .or_default()
            .add_term(f, 1.0);
    }

    let mut moved = LinearExpr::zero();
    for (key, &up) in &vars.volume_up {
        let Some(&down) = vars.volume_down.get(key) else {
            continue;
        };
        let (o, d, p, t) = key;
        let Some(prev) = ctx.sets().prev_period(*t) else {
            continue;
        };
        let mut change = lane.get(key).cloned().unwrap_or_default();
        if let Some(before) = lane.get(&(o.clone(), d.clone(), p.clone(), prev)) {
            change -= before;
        }
        change.add_term(up, -1.0);
        change.add_term(down, 1.0);
        model.add_constraint(format!("plan_change[{o},{d},{p},{t}]"), change, Sense::Eq, 0.0)?;
        moved.add_term(up, 1.0);
        moved.add_term(down, 1.0);
    }
    model.add_constraint(
        "total_volume_moved",
        LinearExpr::from(vars.kpis.total_volume_moved),
        Sense::Eq,
        moved,
    )?;
    Ok(())
}
