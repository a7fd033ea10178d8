//! Flow runner: sequences steps through the extension hooks

use replay_core_types::Flow;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::ReplayError;
use crate::extension::RunnerExtension;

/// Replays one flow through a [`RunnerExtension`]
pub struct Runner {
    flow: Flow,
    extension: Arc<dyn RunnerExtension>,
}

impl Runner {
    pub fn new(flow: Flow, extension: Arc<dyn RunnerExtension>) -> Self {
        Self { flow, extension }
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    /// Run every step in order.
    ///
    /// Returns `Ok(true)` when all steps ran and `Ok(false)` when `cancel`
    /// fired between steps. Cancellation never interrupts a step in flight.
    /// The first hook or step error aborts the run and is returned as is.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<bool, ReplayError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("replay", %run_id, title = %self.flow.title);
        self.run_steps(cancel).instrument(span).await
    }

    async fn run_steps(&self, cancel: &CancellationToken) -> Result<bool, ReplayError> {
        let started = Instant::now();
        let total = self.flow.steps.len();
        info!(steps = total, "Starting replay");

        self.extension.before_all_steps(&self.flow).await?;

        let mut completed = true;
        for (index, step) in self.flow.steps.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(step_index = index, total, "Replay cancelled");
                completed = false;
                break;
            }

            let span = info_span!("step", step_index = index, kind = step.kind().name());
            async {
                self.extension.before_each_step(step, &self.flow).await?;
                self.extension.run_step(step, &self.flow).await?;
                self.extension.after_each_step(step, &self.flow).await
            }
            .instrument(span)
            .await?;
        }

        self.extension.after_all_steps(&self.flow).await?;

        info!(
            completed,
            latency_ms = started.elapsed().as_millis() as u64,
            "Replay finished"
        );
        Ok(completed)
    }
}
