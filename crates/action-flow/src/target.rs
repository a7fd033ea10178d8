//! Step target resolution: which page and which frame a step runs in

use replay_core_types::Step;
use replay_primitives::{Browser, Frame, FrameRef, Page, PageRef, Target};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::errors::ReplayError;

/// Live handles a step executes against
#[derive(Clone)]
pub struct StepContext {
    /// Page matched by the step's target, `None` when only an out-of-process
    /// frame matched
    pub page: Option<PageRef>,
    /// Page that receives page-level operations (viewport, keyboard,
    /// navigation): the matched page, else the primary page hosting the frame
    pub host: PageRef,
    /// Frame that receives selector queries and scripts
    pub frame: FrameRef,
}

/// Maps `step.target` and `step.frame` onto driver handles
pub struct TargetResolver {
    browser: Arc<dyn Browser>,
    primary: PageRef,
}

impl TargetResolver {
    pub fn new(browser: Arc<dyn Browser>, primary: PageRef) -> Self {
        Self { browser, primary }
    }

    /// The flow's primary page
    pub fn primary(&self) -> &PageRef {
        &self.primary
    }

    /// Page named by `step.target`.
    ///
    /// Main-page targets return the primary page. Any other target is a URL;
    /// `Ok(None)` means no such page appeared within `timeout`.
    pub async fn resolve_page(
        &self,
        step: &Step,
        timeout: Duration,
    ) -> Result<Option<PageRef>, ReplayError> {
        let url = match step.target.as_deref() {
            Some(url) if !step.targets_main_page() => url,
            _ => return Ok(Some(self.primary.clone())),
        };

        let target = match self.browser.wait_for_target(url, timeout).await {
            Ok(target) => target,
            Err(e) if e.is_timeout() => {
                debug!(target = %url, "No page target matched");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let page = target.page().await?;
        if let Some(page) = &page {
            page.set_default_timeout(timeout);
        }
        Ok(page)
    }

    /// Frame the step executes in.
    ///
    /// Starts from `page`'s main frame, or from an out-of-process frame of the
    /// primary page whose URL equals the target, then follows `step.frame`.
    pub async fn resolve_frame(
        &self,
        page: Option<&PageRef>,
        step: &Step,
        timeout: Duration,
    ) -> Result<FrameRef, ReplayError> {
        let mut frame = match page {
            Some(page) => page.main_frame(),
            None => self.find_frame_target(step, timeout).await?,
        };

        for &index in &step.frame {
            let children = frame.child_frames();
            let available = children.len();
            frame = children
                .into_iter()
                .nth(index)
                .ok_or(ReplayError::InvalidFrameIndex { index, available })?;
        }
        Ok(frame)
    }

    async fn find_frame_target(&self, step: &Step, timeout: Duration) -> Result<FrameRef, ReplayError> {
        let url = step.target.clone().unwrap_or_default();

        if let Some(frame) = self
            .primary
            .frames()
            .into_iter()
            .find(|frame| frame.is_out_of_process() && frame.url() == url)
        {
            debug!(target = %url, "Matched out-of-process frame");
            return Ok(frame);
        }

        match self.primary.wait_for_frame(&url, timeout).await {
            Ok(frame) => Ok(frame),
            Err(e) if e.is_timeout() => Err(ReplayError::TargetNotFound(url)),
            Err(e) => Err(e.into()),
        }
    }

    /// Page, page-level host and frame for `step`
    pub async fn resolve(&self, step: &Step, timeout: Duration) -> Result<StepContext, ReplayError> {
        let page = self.resolve_page(step, timeout).await?;
        let frame = self.resolve_frame(page.as_ref(), step, timeout).await?;
        let host = page.clone().unwrap_or_else(|| self.primary.clone());
        Ok(StepContext { page, host, frame })
    }
}
