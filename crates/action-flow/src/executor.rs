//! Step executor: per-kind actions raced with asserted-event waits

use futures::future::{try_join_all, BoxFuture};
use replay_core_types::{
    describe_selectors, ChangeStep, ClickStep, EventType, Flow, NetworkConditionsStep,
    ScrollStep, SelectorChain, SetViewportStep, Step, StepButton, StepKind, WaitForElementStep,
};
use replay_locator::{DefaultElementResolver, ElementResolver, ResolveOptions};
use replay_primitives::{
    bounded, scripts, Browser, ClickOffset, ClickOptions, DriverError, Element, ElementRef,
    Frame, FrameRef, MouseButton, NavigationOptions, NetworkConditions, Page, PageRef, Viewport,
};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::errors::ReplayError;
use crate::settings::ReplaySettings;
use crate::target::{StepContext, TargetResolver};

/// Input types that receive keystrokes rather than a direct value assignment
const TYPEABLE_INPUTS: &[&str] = &[
    "textarea", "text", "url", "tel", "search", "password", "number", "email",
];

/// Keystrokes needed to turn a field's current value into the target value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDiff {
    /// Clear the field before typing
    pub clear: bool,
    /// Text to type
    pub text: String,
}

/// Type only the suffix when `value` extends `current`, else clear and retype
pub fn type_diff(current: &str, value: &str) -> TypeDiff {
    match value.strip_prefix(current) {
        Some(suffix) => TypeDiff {
            clear: false,
            text: suffix.to_string(),
        },
        None => TypeDiff {
            clear: true,
            text: value.to_string(),
        },
    }
}

fn mouse_button(button: StepButton) -> MouseButton {
    match button {
        StepButton::Primary => MouseButton::Left,
        StepButton::Secondary => MouseButton::Right,
        StepButton::Auxiliary => MouseButton::Middle,
        StepButton::Back => MouseButton::Back,
        StepButton::Forward => MouseButton::Forward,
    }
}

/// Driver click options for a recorded click.
///
/// `duration` is the press-to-release delay and only applies to single clicks.
pub fn click_options(step: &ClickStep, click_count: u32) -> ClickOptions {
    ClickOptions {
        button: mouse_button(step.button.unwrap_or_default()),
        click_count,
        delay: step
            .duration
            .filter(|_| click_count == 1)
            .map(Duration::from_millis),
        offset: Some(ClickOffset {
            x: step.offset_x,
            y: step.offset_y,
        }),
    }
}

type EventWait = BoxFuture<'static, Result<(), DriverError>>;

/// Run `action` while the armed event waits complete; all must succeed
async fn join_with_events<F>(action: F, events: Vec<EventWait>) -> Result<(), ReplayError>
where
    F: Future<Output = Result<(), ReplayError>>,
{
    let waits = async {
        try_join_all(events).await?;
        Ok::<(), ReplayError>(())
    };
    futures::try_join!(action, waits)?;
    Ok(())
}

/// Executes single steps against a browser
pub struct StepExecutor {
    targets: TargetResolver,
    resolver: Arc<dyn ElementResolver>,
    settings: ReplaySettings,
}

impl StepExecutor {
    /// Executor for flows whose primary page is `page`
    pub fn new(browser: Arc<dyn Browser>, page: PageRef) -> Self {
        Self {
            targets: TargetResolver::new(browser, page),
            resolver: Arc::new(DefaultElementResolver::new()),
            settings: ReplaySettings::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ElementResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_settings(mut self, settings: ReplaySettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &ReplaySettings {
        &self.settings
    }

    pub fn targets(&self) -> &TargetResolver {
        &self.targets
    }

    /// Execute `step` of `flow`
    pub async fn execute(&self, step: &Step, flow: &Flow) -> Result<(), ReplayError> {
        let timeout_ms = flow.timeout_for(step, self.settings.default_timeout_ms());
        let timeout = Duration::from_millis(timeout_ms);
        let kind = step.kind().name();
        let started = Instant::now();
        info!(kind, timeout_ms, target = ?step.target, "Executing step");

        match step.kind() {
            StepKind::Close | StepKind::CustomStep(_) => {
                // Neither needs a frame, only the page the events fire on
                let page = self.targets.resolve_page(step, timeout).await?;
                let host = page
                    .clone()
                    .unwrap_or_else(|| self.targets.primary().clone());
                let events = self.arm_asserted_events(step, &host, timeout)?;
                let action = async {
                    match step.kind() {
                        StepKind::CustomStep(custom) => {
                            debug!(name = %custom.name, "Skipping custom step");
                        }
                        _ => self.close(step, page).await?,
                    }
                    Ok::<(), ReplayError>(())
                };
                join_with_events(action, events).await?;
            }
            _ => {
                let context = self.targets.resolve(step, timeout).await?;
                let events = self.arm_asserted_events(step, &context.host, timeout)?;
                join_with_events(self.perform(step, &context, timeout), events).await?;
            }
        }

        info!(
            kind,
            latency_ms = started.elapsed().as_millis() as u64,
            "Step completed"
        );
        Ok(())
    }

    /// Start every asserted-event wait before the action is issued
    fn arm_asserted_events(
        &self,
        step: &Step,
        host: &PageRef,
        timeout: Duration,
    ) -> Result<Vec<EventWait>, ReplayError> {
        step.asserted_events
            .iter()
            .map(|event| match &event.kind {
                EventType::Navigation => {
                    debug!(url = ?event.url, "Armed navigation wait");
                    Ok(host.wait_for_navigation(NavigationOptions::new(timeout)))
                }
                EventType::Other(kind) => Err(ReplayError::UnsupportedEventType(kind.clone())),
            })
            .collect()
    }

    async fn perform(
        &self,
        step: &Step,
        context: &StepContext,
        timeout: Duration,
    ) -> Result<(), ReplayError> {
        match step.kind() {
            StepKind::SetViewport(viewport) => self.set_viewport(context, viewport).await,
            StepKind::Navigate(navigate) => {
                context
                    .host
                    .navigate(&navigate.url, &NavigationOptions::new(timeout))
                    .await?;
                Ok(())
            }
            StepKind::Click(click) => self.click(context, click, 1, timeout).await,
            StepKind::DoubleClick(click) => self.click(context, click, 2, timeout).await,
            StepKind::Change(change) => self.change(context, change, timeout).await,
            StepKind::KeyDown(key) => {
                context.host.key_down(&key.key).await?;
                sleep(self.settings.key_settle).await;
                Ok(())
            }
            StepKind::KeyUp(key) => {
                context.host.key_up(&key.key).await?;
                sleep(self.settings.key_settle).await;
                Ok(())
            }
            StepKind::Hover(hover) => {
                self.scroll_into_view_if_needed(context, &hover.selectors, timeout)
                    .await?;
                let element = self
                    .resolve_one(&context.frame, &hover.selectors, timeout, true)
                    .await?;
                element.hover().await?;
                Ok(())
            }
            StepKind::Scroll(scroll) => self.scroll(context, scroll, timeout).await,
            StepKind::WaitForElement(wait) => self.wait_for_element(context, wait, timeout).await,
            StepKind::WaitForExpression(wait) => {
                context
                    .frame
                    .wait_for_expression(&wait.expression, timeout)
                    .await?;
                Ok(())
            }
            StepKind::EmulateNetworkConditions(conditions) => {
                self.emulate_network_conditions(context, conditions).await
            }
            StepKind::Close | StepKind::CustomStep(_) => Ok(()),
        }
    }

    async fn resolve_one(
        &self,
        frame: &FrameRef,
        selectors: &[SelectorChain],
        timeout: Duration,
        visible: bool,
    ) -> Result<ElementRef, ReplayError> {
        let element = self
            .resolver
            .resolve_one(frame, selectors, ResolveOptions::new(timeout, visible))
            .await?;
        Ok(element)
    }

    async fn set_viewport(
        &self,
        context: &StepContext,
        step: &SetViewportStep,
    ) -> Result<(), ReplayError> {
        let viewport = Viewport {
            width: step.width,
            height: step.height,
            device_scale_factor: step.device_scale_factor,
            is_mobile: step.is_mobile,
            has_touch: step.has_touch,
            is_landscape: step.is_landscape,
        };
        context.host.set_viewport(&viewport).await?;
        Ok(())
    }

    async fn emulate_network_conditions(
        &self,
        context: &StepContext,
        step: &NetworkConditionsStep,
    ) -> Result<(), ReplayError> {
        let conditions = NetworkConditions {
            download: step.download,
            upload: step.upload,
            latency: step.latency,
        };
        context
            .host
            .emulate_network_conditions(&conditions)
            .await?;
        Ok(())
    }

    async fn click(
        &self,
        context: &StepContext,
        step: &ClickStep,
        click_count: u32,
        timeout: Duration,
    ) -> Result<(), ReplayError> {
        self.scroll_into_view_if_needed(context, &step.selectors, timeout)
            .await?;
        let element = self
            .resolve_one(&context.frame, &step.selectors, timeout, false)
            .await?;

        let options = click_options(step, click_count);
        if let Err(error) = element.click(&options).await {
            warn!(%error, "Click failed, falling back to script click");
            if let Err(fallback) = element.evaluate(scripts::SCRIPT_CLICK, vec![]).await {
                debug!(error = %fallback, "Script click failed");
                return Err(error.into());
            }
        }
        Ok(())
    }

    async fn change(
        &self,
        context: &StepContext,
        step: &ChangeStep,
        timeout: Duration,
    ) -> Result<(), ReplayError> {
        self.scroll_into_view_if_needed(context, &step.selectors, timeout)
            .await?;
        let element = self
            .resolve_one(&context.frame, &step.selectors, timeout, true)
            .await?;

        let input_type = element.evaluate(scripts::READ_INPUT_TYPE, vec![]).await?;
        let input_type = input_type.as_str().unwrap_or_default().to_ascii_lowercase();
        debug!(input_type = %input_type, "Changing value");

        match input_type.as_str() {
            "select-one" => {
                element.select(std::slice::from_ref(&step.value)).await?;
                element.evaluate(scripts::BLUR_AND_FOCUS, vec![]).await?;
            }
            kind if TYPEABLE_INPUTS.contains(&kind) => {
                let current = element.evaluate(scripts::READ_VALUE, vec![]).await?;
                let diff = type_diff(current.as_str().unwrap_or_default(), &step.value);
                let prepare = if diff.clear {
                    scripts::CLEAR_VALUE
                } else {
                    scripts::RESET_CURSOR
                };
                element.evaluate(prepare, vec![]).await?;
                if !diff.text.is_empty() {
                    element.type_text(&diff.text).await?;
                }
            }
            _ => {
                element.focus().await?;
                element
                    .evaluate(scripts::SET_VALUE_AND_DISPATCH, vec![json!(step.value)])
                    .await?;
            }
        }
        Ok(())
    }

    async fn scroll(
        &self,
        context: &StepContext,
        step: &ScrollStep,
        timeout: Duration,
    ) -> Result<(), ReplayError> {
        let offsets = vec![json!(step.x), json!(step.y)];
        if step.selectors.is_empty() {
            context
                .frame
                .evaluate(scripts::SCROLL_WINDOW_TO, offsets)
                .await?;
            return Ok(());
        }

        self.scroll_into_view_if_needed(context, &step.selectors, timeout)
            .await?;
        let element = self
            .resolve_one(&context.frame, &step.selectors, timeout, true)
            .await?;
        element.evaluate(scripts::SCROLL_ELEMENT_TO, offsets).await?;
        Ok(())
    }

    async fn wait_for_element(
        &self,
        context: &StepContext,
        step: &WaitForElementStep,
        timeout: Duration,
    ) -> Result<(), ReplayError> {
        let options = ResolveOptions::new(timeout, step.visible);
        let poll = async {
            loop {
                let count = self
                    .resolver
                    .resolve_all(&context.frame, &step.selectors, options)
                    .await?
                    .len();
                if step.operator.compare(count, step.count) {
                    return Ok::<usize, ReplayError>(count);
                }
                debug!(
                    count,
                    expected = step.count,
                    operator = %step.operator,
                    "Element count not satisfied"
                );
                sleep(self.settings.wait_poll_interval).await;
            }
        };

        match bounded(timeout, poll).await {
            Some(Ok(count)) => {
                debug!(count, "Element count satisfied");
                Ok(())
            }
            Some(Err(e)) => Err(e),
            None => Err(ReplayError::Timeout(format!(
                "Could not find {}{} elements for selectors: {}",
                step.operator,
                step.count,
                describe_selectors(&step.selectors)
            ))),
        }
    }

    async fn close(&self, step: &Step, page: Option<PageRef>) -> Result<(), ReplayError> {
        match page {
            Some(page) => page.close().await?,
            None => debug!(target = ?step.target, "No page to close"),
        }
        Ok(())
    }

    /// Smooth-scroll the first matching element into the viewport unless it
    /// already intersects it, then wait for the page offsets to settle.
    ///
    /// Offsets are sampled on the host page's main frame, also when the
    /// element lives in a child frame.
    async fn scroll_into_view_if_needed(
        &self,
        context: &StepContext,
        selectors: &[SelectorChain],
        timeout: Duration,
    ) -> Result<(), ReplayError> {
        let element = self
            .resolve_one(&context.frame, selectors, timeout, false)
            .await?;
        if element.is_intersecting_viewport().await? {
            return Ok(());
        }

        element
            .evaluate(scripts::SMOOTH_SCROLL_INTO_VIEW, vec![])
            .await?;

        let limit = if self.settings.bound_scroll_settle {
            timeout
        } else {
            Duration::ZERO
        };
        let page_frame = context.host.main_frame();
        match bounded(limit, self.wait_for_scroll_settle(&page_frame)).await {
            Some(settled) => settled?,
            None => warn!(
                timeout_ms = limit.as_millis() as u64,
                "Scroll did not settle before the step timeout"
            ),
        }

        let in_view = element.is_intersecting_viewport().await?;
        debug!(in_view, "Scroll settled");
        Ok(())
    }

    /// Sample page offsets until two consecutive samples match
    async fn wait_for_scroll_settle(&self, frame: &FrameRef) -> Result<(), ReplayError> {
        let mut previous = self.page_offsets(frame).await?;
        loop {
            sleep(self.settings.scroll_poll_interval).await;
            let current = self.page_offsets(frame).await?;
            if current == previous {
                return Ok(());
            }
            previous = current;
        }
    }

    async fn page_offsets(&self, frame: &FrameRef) -> Result<Value, ReplayError> {
        Ok(frame.evaluate(scripts::PAGE_SCROLL_OFFSETS, vec![]).await?)
    }
}
