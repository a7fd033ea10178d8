use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use flow_replay::{Flow, ReplayExtension, ReplaySettings, Runner, StepExecutor, StepKind};
use replay_core_types::MAIN_TARGET;
use replay_primitives::fake::{FakeBrowser, FakeFrame, FakePage};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::runtime::read_flow;

#[derive(Args, Clone, Debug)]
pub struct RehearseArgs {
    /// Recorded flow (JSON)
    pub flow: PathBuf,

    /// Drop asserted events before replaying
    #[arg(long)]
    pub strip_assertions: bool,
}

/// Replay a flow against the in-memory driver and print every driver call
pub async fn cmd_rehearse(args: RehearseArgs, settings: ReplaySettings) -> Result<()> {
    let mut flow = read_flow(&args.flow).await?;
    if args.strip_assertions {
        for step in &mut flow.steps {
            step.asserted_events.clear();
        }
    }

    let browser = Arc::new(FakeBrowser::permissive());
    let pages = stage_pages(&browser, &flow);
    let primary = pages
        .get(MAIN_TARGET)
        .cloned()
        .context("Primary page was not staged")?;

    info!(
        "Rehearsing '{}' ({} steps, {} pages)",
        flow.title,
        flow.steps.len(),
        pages.len()
    );

    let executor = StepExecutor::new(browser.clone(), primary).with_settings(settings);
    let extension = Arc::new(ReplayExtension::from_executor(executor));
    let runner = Runner::new(flow, extension);

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling after the current step");
            ctrl_c.cancel();
        }
    });

    let outcome = runner.run(&token).await;

    for entry in browser.journal().entries() {
        println!("{}", entry);
    }

    if !outcome.context("Rehearsal failed")? {
        bail!("Rehearsal cancelled");
    }
    println!("Rehearsal completed");
    Ok(())
}

/// Open one fake page per target and grow the frame tree each step descends into
fn stage_pages(browser: &FakeBrowser, flow: &Flow) -> HashMap<String, Arc<FakePage>> {
    let first_url = flow
        .steps
        .iter()
        .find_map(|step| match step.kind() {
            StepKind::Navigate(navigate) if step.targets_main_page() => {
                Some(navigate.url.clone())
            }
            _ => None,
        })
        .unwrap_or_else(|| "about:blank".to_string());

    let mut pages = HashMap::new();
    pages.insert(MAIN_TARGET.to_string(), browser.new_page(&first_url));

    for step in &flow.steps {
        let key = if step.targets_main_page() {
            MAIN_TARGET.to_string()
        } else {
            step.target.clone().unwrap_or_default()
        };
        let page = pages
            .entry(key.clone())
            .or_insert_with(|| browser.new_page(&key))
            .clone();
        stage_frames(page.main(), &step.frame);
    }

    pages
}

fn stage_frames(root: Arc<FakeFrame>, path: &[usize]) {
    let mut frame = root;
    for (depth, &index) in path.iter().enumerate() {
        while frame.child_count() <= index {
            let n = frame.child_count();
            frame.add_child_frame(
                &format!("about:blank#frame-{}-{}", depth, n),
                &format!("frame-{}", n),
            );
        }
        frame = match frame.child_frame(index) {
            Some(child) => child,
            None => return,
        };
    }
}
