//! Colorful console output for run, scenario and stage events.
//!
//! Provides a custom `tracing` layer that formats solver events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (run/scenario/stage start and end)
//! - **DEBUG**: Freeze bounds added between stages, model assembly
//! - **TRACE**: Individual oracle calls

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Event targets rendered by [`FlowConsoleLayer`].
const TARGETS: [&str; 3] = ["flowforge_solver", "flowforge_model", "flowforge::"];

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the FlowForge banner and sets up tracing. `RUST_LOG` overrides
/// the default INFO level.
pub fn init() {
    INIT.get_or_init(|| {
        EPOCH.get_or_init(Instant::now);
        print_banner();

        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(FlowConsoleLayer)
            .try_init();
    });
}

fn elapsed_secs() -> f64 {
    EPOCH.get().map_or(0.0, |epoch| epoch.elapsed().as_secs_f64())
}

fn print_banner() {
    let banner = r#"
 _____ _               _____
|  ___| | _____      _|  ___|__  _ __ __ _  ___
| |_  | |/ _ \ \ /\ / / |_ / _ \| '__/ _` |/ _ \
|  _| | | (_) \ V  V /|  _| (_) | | | (_| |  __/
|_|   |_|\___/ \_/\_/ |_|  \___/|_|  \__, |\___|
                                     |___/
"#;

    let version_line = format!(
        "             v{} - Prioritized Network Optimization\n",
        VERSION
    );

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats FlowForge events with colors.
pub struct FlowConsoleLayer;

impl<S: Subscriber> Layer<S> for FlowConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !TARGETS.iter().any(|t| metadata.target().starts_with(t)) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    scenario: Option<String>,
    objective: Option<String>,
    status: Option<String>,
    error: Option<String>,
    oracle: Option<String>,
    sense: Option<String>,
    priority: Option<i64>,
    stage_index: Option<u64>,
    stages: Option<u64>,
    duration_ms: Option<u64>,
    scenario_count: Option<u64>,
    scenarios_solved: Option<u64>,
    scenarios_failed: Option<u64>,
    stages_solved: Option<u64>,
    variable_count: Option<u64>,
    constraint_count: Option<u64>,
    value: Option<f64>,
    relaxation: Option<f64>,
    bound: Option<f64>,
    parallel: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.record_str(field, s.trim_matches('"'));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "stage_index" => self.stage_index = Some(value),
            "stages" => self.stages = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "scenario_count" => self.scenario_count = Some(value),
            "scenarios_solved" => self.scenarios_solved = Some(value),
            "scenarios_failed" => self.scenarios_failed = Some(value),
            "stages_solved" => self.stages_solved = Some(value),
            "variable_count" => self.variable_count = Some(value),
            "constraint_count" => self.constraint_count = Some(value),
            "priority" => self.priority = Some(value as i64),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        match field.name() {
            "priority" => self.priority = Some(value),
            _ => self.record_u64(field, value.max(0) as u64),
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "value" => self.value = Some(value),
            "relaxation" => self.relaxation = Some(value),
            "bound" => self.bound = Some(value),
            _ => {}
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "parallel" {
            self.parallel = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        let slot = match field.name() {
            "event" => &mut self.event,
            "scenario" => &mut self.scenario,
            "objective" => &mut self.objective,
            "status" => &mut self.status,
            "error" => &mut self.error,
            "oracle" => &mut self.oracle,
            "sense" => &mut self.sense,
            _ => return,
        };
        *slot = Some(value.to_string());
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    match v.event.as_deref().unwrap_or("") {
        "run_start" => format_run_start(v),
        "run_end" => format_run_end(v),
        "scenario_start" => format_scenario_start(v),
        "scenario_end" => format_scenario_end(v),
        "stage_start" => format_stage_start(v),
        "stage_end" => format_stage_end(v),
        "freeze" => format_freeze(v),
        "model_built" => format_model_built(v),
        "oracle_call" if level == Level::TRACE => format_oracle_call(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn scenario(v: &EventVisitor) -> &str {
    v.scenario.as_deref().unwrap_or("?")
}

fn format_run_start(v: &EventVisitor) -> String {
    let count = v.scenario_count.unwrap_or(0);
    let mode = if v.parallel.unwrap_or(false) {
        "parallel"
    } else {
        "sequential"
    };
    format!(
        "{} {} Run │ {} scenarios │ {} │ {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        count.to_formatted_string(&Locale::en).bright_yellow(),
        mode,
        v.oracle.as_deref().unwrap_or("oracle").bright_magenta()
    )
}

fn format_scenario_start(v: &EventVisitor) -> String {
    format!(
        "{} {} Scenario {} started",
        format_elapsed(),
        "▶".bright_blue(),
        scenario(v).white().bold()
    )
}

fn format_scenario_end(v: &EventVisitor) -> String {
    let duration = v.duration_ms.unwrap_or(0);
    let mut output = format!(
        "{} {} Scenario {} ended │ {} │ {}",
        format_elapsed(),
        "◀".bright_blue(),
        scenario(v).white().bold(),
        format_duration_ms(duration).yellow(),
        format_status(v.status.as_deref().unwrap_or("unknown"))
    );
    if let Some(stages) = v.stages {
        output.push_str(&format!(" │ {} stages", stages));
    }
    if let Some(ref error) = v.error {
        output.push_str(&format!(" │ {}", error.bright_red()));
    }
    output
}

fn format_stage_start(v: &EventVisitor) -> String {
    let mut output = format!(
        "{}   {} [{}] P{} {}",
        format_elapsed(),
        "▸".bright_cyan(),
        scenario(v),
        v.priority.unwrap_or(0),
        v.objective.as_deref().unwrap_or("?").white().bold()
    );
    if let Some(r) = v.relaxation.filter(|r| *r > 0.0) {
        output.push_str(&format!(" │ {:.1}% relaxation", r * 100.0));
    }
    output
}

fn format_stage_end(v: &EventVisitor) -> String {
    let mut output = format!(
        "{}   {} [{}] P{} {} │ {}",
        format_elapsed(),
        "◂".bright_cyan(),
        scenario(v),
        v.priority.unwrap_or(0),
        v.objective.as_deref().unwrap_or("?").white().bold(),
        format_status(v.status.as_deref().unwrap_or("unknown"))
    );
    if let Some(value) = v.value {
        output.push_str(&format!(" │ {}", format_value(value).bright_magenta().bold()));
    }
    if let Some(duration) = v.duration_ms {
        output.push_str(&format!(" │ {}", format_duration_ms(duration).yellow()));
    }
    if let Some(ref error) = v.error {
        output.push_str(&format!(" │ {}", error.bright_red()));
    }
    output
}

fn format_freeze(v: &EventVisitor) -> String {
    format!(
        "{}     {} [{}] freeze P{} {} {}",
        format_elapsed(),
        "❄".bright_blue(),
        scenario(v),
        v.priority.unwrap_or(0),
        v.sense.as_deref().unwrap_or("?"),
        format_value(v.bound.unwrap_or(0.0)).bright_yellow()
    )
}

fn format_model_built(v: &EventVisitor) -> String {
    format!(
        "{}     {} [{}] model │ {} variables │ {} constraints",
        format_elapsed(),
        "◆".bright_black(),
        scenario(v),
        v.variable_count
            .unwrap_or(0)
            .to_formatted_string(&Locale::en)
            .bright_yellow(),
        v.constraint_count
            .unwrap_or(0)
            .to_formatted_string(&Locale::en)
            .bright_yellow()
    )
}

fn format_oracle_call(v: &EventVisitor) -> String {
    format!(
        "{}     {} [{}] {} │ {} × {}",
        format_elapsed(),
        "→".bright_black(),
        scenario(v),
        v.oracle.as_deref().unwrap_or("oracle"),
        v.variable_count.unwrap_or(0),
        v.constraint_count.unwrap_or(0)
    )
    .bright_black()
    .to_string()
}

fn format_run_end(v: &EventVisitor) -> String {
    let solved = v.scenarios_solved.unwrap_or(0);
    let failed = v.scenarios_failed.unwrap_or(0);
    let stages = v.stages_solved.unwrap_or(0);
    let duration = v.duration_ms.unwrap_or(0);
    let success = failed == 0;

    let mut output = format!(
        "{} {} Run complete │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        format_duration_ms(duration).yellow()
    );

    let border = |s: &str| s.bright_cyan().to_string();
    output.push_str("\n\n");
    output.push_str(&border(
        "╔══════════════════════════════════════════════════════════╗",
    ));
    output.push('\n');

    let status_text = if success {
        "ALL SCENARIOS SOLVED"
    } else {
        "SOME SCENARIOS FAILED"
    };
    let inner_width: usize = 58;
    let total_pad = inner_width.saturating_sub(status_text.len());
    let left_pad = total_pad / 2;
    let right_pad = total_pad - left_pad;
    let status_colored = if success {
        status_text.bright_green().bold().to_string()
    } else {
        status_text.bright_red().bold().to_string()
    };
    output.push_str(&format!(
        "{}{}{}{}{}",
        border("║"),
        " ".repeat(left_pad),
        status_colored,
        " ".repeat(right_pad),
        border("║")
    ));
    output.push('\n');
    output.push_str(&border(
        "╠══════════════════════════════════════════════════════════╣",
    ));
    output.push('\n');

    for (label, value) in [
        ("Scenarios solved:", solved),
        ("Scenarios failed:", failed),
        ("Stages solved:", stages),
    ] {
        output.push_str(&format!(
            "{}  {:<18}{:>36}  {}",
            border("║"),
            label,
            value.to_formatted_string(&Locale::en),
            border("║")
        ));
        output.push('\n');
    }

    output.push_str(&border(
        "╚══════════════════════════════════════════════════════════╝",
    ));
    output.push('\n');
    output
}

fn format_status(status: &str) -> String {
    match status {
        "optimal" => "OPTIMAL".bright_green().bold().to_string(),
        "time_limited" => "TIME LIMIT".yellow().bold().to_string(),
        "failed" => "FAILED".bright_red().bold().to_string(),
        other => other.to_uppercase().white().to_string(),
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_formatted_string(&Locale::en)
    } else {
        format!("{:.4}", value)
    }
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}
