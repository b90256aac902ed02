//! Fixed product ratios at nodes and on lanes.

use super::BuildContext;
use crate::error::Result;
use crate::linear::{LinearExpr, Sense};
use crate::model::Model;
use crate::variables::npt;

/// `product_1 * quantity_2 = product_2 * quantity_1`, so the two products
/// move in the declared proportion.
pub(super) fn build(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let vars = ctx.vars;
    for r in &ctx.records().assembly {
        let (n, t) = (&r.node, r.period);
        let (Some(&x1), Some(&x2)) = (
            vars.processed.get(&npt(n, &r.product_1, t)),
            vars.processed.get(&npt(n, &r.product_2, t)),
        ) else {
            continue;
        };
        model.add_constraint(
            format!("assembly[{n},{t},{},{}]", r.product_1, r.product_2),
            LinearExpr::term(x1, r.quantity_2),
            Sense::Eq,
            LinearExpr::term(x2, r.quantity_1),
        )?;
    }

    for r in &ctx.records().shipping_assembly {
        let (o, d, m, t) = (&r.origin, &r.destination, &r.mode, r.period);
        let flow = |p: &str| {
            vars.flow
                .get(&(o.clone(), d.clone(), p.to_string(), t, m.clone()))
                .copied()
        };
        let (Some(f1), Some(f2)) = (flow(&r.product_1), flow(&r.product_2)) else {
            continue;
        };
        model.add_constraint(
            format!("shipping_assembly[{o},{d},{m},{t},{},{}]", r.product_1, r.product_2),
            LinearExpr::term(f1, r.quantity_2),
            Sense::Eq,
            LinearExpr::term(f2, r.quantity_1),
        )?;
    }
    Ok(())
}
