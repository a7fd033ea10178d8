//! Static flow summaries for the `inspect` command

use std::fmt;

use replay_core_types::{Flow, Step, MAIN_TARGET};
use replay_flow::ReplaySettings;
use serde::Serialize;

/// One step as the engine will see it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSummary {
    pub index: usize,
    pub kind: &'static str,
    pub target: String,
    pub frame: Vec<usize>,
    /// Effective timeout after the step / flow / engine cascade
    pub timeout_ms: u64,
    pub selectors: Vec<String>,
    pub asserted_events: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSummary {
    pub title: String,
    pub timeout_ms: Option<u64>,
    pub step_count: usize,
    pub steps: Vec<StepSummary>,
}

fn summarize_step(index: usize, step: &Step, flow: &Flow, settings: &ReplaySettings) -> StepSummary {
    StepSummary {
        index,
        kind: step.kind().name(),
        target: if step.targets_main_page() {
            MAIN_TARGET.to_string()
        } else {
            step.target.clone().unwrap_or_default()
        },
        frame: step.frame.clone(),
        timeout_ms: flow.timeout_for(step, settings.default_timeout_ms()),
        selectors: step
            .kind()
            .selectors()
            .map(|chains| chains.iter().map(ToString::to_string).collect())
            .unwrap_or_default(),
        asserted_events: step
            .asserted_events
            .iter()
            .map(|event| match &event.url {
                Some(url) => format!("{} {}", event.kind, url),
                None => event.kind.to_string(),
            })
            .collect(),
    }
}

/// Summarize `flow` under `settings`
pub fn summarize(flow: &Flow, settings: &ReplaySettings) -> FlowSummary {
    FlowSummary {
        title: flow.title.clone(),
        timeout_ms: flow.timeout,
        step_count: flow.steps.len(),
        steps: flow
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| summarize_step(index, step, flow, settings))
            .collect(),
    }
}

impl fmt::Display for FlowSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Flow: {} ({} steps)", self.title, self.step_count)?;
        for step in &self.steps {
            write!(
                f,
                "  #{:<3} {:<24} target={} timeout={}ms",
                step.index, step.kind, step.target, step.timeout_ms
            )?;
            if !step.frame.is_empty() {
                write!(f, " frame={:?}", step.frame)?;
            }
            writeln!(f)?;
            for selector in &step.selectors {
                writeln!(f, "        selector {}", selector)?;
            }
            for event in &step.asserted_events {
                writeln!(f, "        expects {}", event)?;
            }
        }
        Ok(())
    }
}
