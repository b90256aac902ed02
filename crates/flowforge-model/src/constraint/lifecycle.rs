//! Node operating state: launches, shutdowns, duration windows, forced
//! events, node-type counts and the launch budget.

use std::collections::BTreeSet;
use std::ops::Range;

use flowforge_core::Period;

use super::BuildContext;
use crate::error::Result;
use crate::linear::{LinearExpr, Sense, VarId};
use crate::model::Model;

pub(super) fn build(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let nodes: BTreeSet<&String> = ctx.vars.operating.keys().map(|(n, _)| n).collect();
    for n in nodes {
        node_state(ctx, model, n)?;
    }
    node_types(ctx, model)?;
    launch_budget(ctx, model)
}

/// Per-period state variables of one node, in horizon order.
struct NodeTimeline {
    periods: Vec<Period>,
    operating: Vec<VarId>,
    launched: Vec<VarId>,
    shut_down: Vec<VarId>,
}

impl NodeTimeline {
    fn new(ctx: &BuildContext<'_>, node: &str) -> Self {
        let mut line = NodeTimeline {
            periods: Vec::new(),
            operating: Vec::new(),
            launched: Vec::new(),
            shut_down: Vec::new(),
        };
        for &t in &ctx.sets().periods {
            let key = (node.to_string(), t);
            let (Some(&op), Some(&l), Some(&s)) = (
                ctx.vars.operating.get(&key),
                ctx.vars.launched.get(&key),
                ctx.vars.shut_down.get(&key),
            ) else {
                continue;
            };
            line.periods.push(t);
            line.operating.push(op);
            line.launched.push(l);
            line.shut_down.push(s);
        }
        line
    }

    /// Index ranges of `len` consecutive periods.
    fn windows(&self, len: usize) -> impl Iterator<Item = Range<usize>> + '_ {
        let count = if len == 0 { 0 } else { (self.periods.len() + 1).saturating_sub(len) };
        (0..count).map(move |start| start..start + len)
    }

    /// Index ranges of up to `len` periods ending at each period.
    fn trailing(&self, len: usize) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        (0..self.periods.len()).map(move |i| (i, (i + 1).saturating_sub(len)..i + 1))
    }
}

fn sum(vars: &[VarId]) -> LinearExpr {
    LinearExpr::weighted(vars.iter().map(|&v| (v, 1.0)))
}

fn node_state(ctx: &BuildContext<'_>, model: &mut Model, n: &str) -> Result<()> {
    let line = NodeTimeline::new(ctx, n);
    let node = ctx.params.node(n);
    let initially = node.map_or(true, |r| r.initially_operating);

    for (i, &t) in line.periods.iter().enumerate() {
        let (op, l, s) = (line.operating[i], line.launched[i], line.shut_down[i]);
        let mut balance = LinearExpr::from(op) - l + s;
        let rhs = if i == 0 {
            if initially { 1.0 } else { 0.0 }
        } else {
            balance.add_term(line.operating[i - 1], -1.0);
            0.0
        };
        model.add_constraint(format!("node_state[{n},{t}]"), balance, Sense::Eq, rhs)?;
        model.add_constraint(
            format!("launch_or_shutdown[{n},{t}]"),
            LinearExpr::from(l) + s,
            Sense::Le,
            1.0,
        )?;

        let (launch, shutdown) = ctx.params.events(n, t);
        if launch {
            model.add_constraint(format!("forced_launch[{n},{t}]"), l.into(), Sense::Eq, 1.0)?;
        }
        if shutdown {
            model.add_constraint(format!("forced_shutdown[{n},{t}]"), s.into(), Sense::Eq, 1.0)?;
        }
    }

    let Some(bounds) = node.map(|r| &r.lifecycle) else {
        return Ok(());
    };
    let launches = sum(&line.launched);
    let shutdowns = sum(&line.shut_down);
    if let Some(min) = bounds.min_launches {
        model.add_constraint(format!("min_launches[{n}]"), launches.clone(), Sense::Ge, f64::from(min))?;
    }
    if let Some(max) = bounds.max_launches {
        model.add_constraint(format!("max_launches[{n}]"), launches, Sense::Le, f64::from(max))?;
    }
    if let Some(min) = bounds.min_shutdowns {
        model.add_constraint(format!("min_shutdowns[{n}]"), shutdowns.clone(), Sense::Ge, f64::from(min))?;
    }
    if let Some(max) = bounds.max_shutdowns {
        model.add_constraint(format!("max_shutdowns[{n}]"), shutdowns, Sense::Le, f64::from(max))?;
    }

    // A launch within the last k periods keeps the node operating.
    if let Some(k) = bounds.min_operating_duration.filter(|&k| k > 1) {
        for (i, window) in line.trailing(k as usize) {
            let t = line.periods[i];
            model.add_constraint(
                format!("min_operating_duration[{n},{t}]"),
                sum(&line.launched[window]),
                Sense::Le,
                LinearExpr::from(line.operating[i]),
            )?;
        }
    }
    if let Some(k) = bounds.max_operating_duration {
        for window in line.windows(k as usize + 1) {
            let t = line.periods[window.start];
            model.add_constraint(
                format!("max_operating_duration[{n},{t}]"),
                sum(&line.operating[window]),
                Sense::Le,
                f64::from(k),
            )?;
        }
    }
    if let Some(k) = bounds.min_shutdown_duration.filter(|&k| k > 1) {
        for (i, window) in line.trailing(k as usize) {
            let t = line.periods[i];
            model.add_constraint(
                format!("min_shutdown_duration[{n},{t}]"),
                sum(&line.shut_down[window]) + line.operating[i],
                Sense::Le,
                1.0,
            )?;
        }
    }
    // A shutdown at the window start must be followed by a relaunch within
    // the next k periods. Nodes that were never shut down are unconstrained.
    if let Some(k) = bounds.max_shutdown_duration {
        for window in line.windows(k as usize + 1) {
            let t = line.periods[window.start];
            let shut = line.shut_down[window.start];
            model.add_constraint(
                format!("max_shutdown_duration[{n},{t}]"),
                sum(&line.operating[window]),
                Sense::Ge,
                LinearExpr::from(shut),
            )?;
        }
    }
    Ok(())
}

fn node_types(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    for r in &ctx.records().node_types {
        let (ty, t) = (&r.node_type, r.period);
        let members = ctx.sets().node_type_members.get(ty);
        let operating = LinearExpr::weighted(
            members
                .into_iter()
                .flatten()
                .filter_map(|n| ctx.vars.operating.get(&(n.clone(), t)))
                .map(|&v| (v, 1.0)),
        );
        if let Some(min) = r.min_operating {
            model.add_constraint(format!("node_type_min[{ty},{t}]"), operating.clone(), Sense::Ge, f64::from(min))?;
        }
        if let Some(max) = r.max_operating {
            model.add_constraint(format!("node_type_max[{ty},{t}]"), operating, Sense::Le, f64::from(max))?;
        }
    }
    Ok(())
}

fn launch_budget(ctx: &BuildContext<'_>, model: &mut Model) -> Result<()> {
    let Some(budget) = ctx.data.max_launch_cost() else {
        return Ok(());
    };
    let spent = LinearExpr::weighted(ctx.vars.launched.iter().map(|((n, t), &l)| {
        let cost = ctx.params.operating_cost(n, *t).map_or(0.0, |c| c.launch_cost);
        (l, cost)
    }));
    model.add_constraint(format!("launch_budget[{}]", ctx.data.name), spent, Sense::Le, budget)?;
    Ok(())
}
