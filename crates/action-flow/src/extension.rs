//! Lifecycle hooks around step execution

use async_trait::async_trait;
use replay_core_types::{Flow, Step};
use replay_primitives::{Browser, PageRef};
use std::sync::Arc;

use crate::errors::ReplayError;
use crate::executor::StepExecutor;

/// Hooks the [`Runner`](crate::Runner) invokes while walking a flow.
///
/// Only `run_step` is required. Embedders that want screenshots, metrics or
/// custom step kinds wrap a [`ReplayExtension`] and delegate to it.
#[async_trait]
pub trait RunnerExtension: Send + Sync {
    async fn before_all_steps(&self, _flow: &Flow) -> Result<(), ReplayError> {
        Ok(())
    }

    async fn after_all_steps(&self, _flow: &Flow) -> Result<(), ReplayError> {
        Ok(())
    }

    async fn before_each_step(&self, _step: &Step, _flow: &Flow) -> Result<(), ReplayError> {
        Ok(())
    }

    async fn run_step(&self, step: &Step, flow: &Flow) -> Result<(), ReplayError>;

    async fn after_each_step(&self, _step: &Step, _flow: &Flow) -> Result<(), ReplayError> {
        Ok(())
    }
}

/// Extension that performs nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExtension;

#[async_trait]
impl RunnerExtension for NoopExtension {
    async fn run_step(&self, _step: &Step, _flow: &Flow) -> Result<(), ReplayError> {
        Ok(())
    }
}

/// Extension that executes every step against a browser
pub struct ReplayExtension {
    executor: StepExecutor,
}

impl ReplayExtension {
    pub fn new(browser: Arc<dyn Browser>, page: PageRef) -> Self {
        Self::from_executor(StepExecutor::new(browser, page))
    }

    pub fn from_executor(executor: StepExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &StepExecutor {
        &self.executor
    }
}

#[async_trait]
impl RunnerExtension for ReplayExtension {
    async fn run_step(&self, step: &Step, flow: &Flow) -> Result<(), ReplayError> {
        self.executor.execute(step, flow).await
    }
}
