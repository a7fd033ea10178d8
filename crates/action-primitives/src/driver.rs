//! Browser, page, frame and element capabilities

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::DriverError;
use crate::types::{
    ClickOptions, NavigationOptions, NetworkConditions, Viewport, WaitForSelectorOptions,
};

pub type TargetRef = Arc<dyn Target>;
pub type PageRef = Arc<dyn Page>;
pub type FrameRef = Arc<dyn Frame>;
pub type ElementRef = Arc<dyn Element>;

/// Connected browser
#[async_trait]
pub trait Browser: Send + Sync {
    /// Wait until a top-level target whose URL equals `url` exists.
    ///
    /// Fails with [`DriverError::Timeout`] when none appears in time.
    async fn wait_for_target(&self, url: &str, timeout: Duration) -> Result<TargetRef, DriverError>;
}

/// Top-level target (tab, popup, worker)
#[async_trait]
pub trait Target: Send + Sync {
    fn url(&self) -> String;

    /// Page handle, `None` for targets without one
    async fn page(&self) -> Result<Option<PageRef>, DriverError>;
}

/// Browser page
#[async_trait]
pub trait Page: Send + Sync {
    fn url(&self) -> String;

    fn main_frame(&self) -> FrameRef;

    /// All frames attached to the page, main frame first
    fn frames(&self) -> Vec<FrameRef>;

    /// Wait for a frame whose URL or name equals `url_or_name`
    async fn wait_for_frame(
        &self,
        url_or_name: &str,
        timeout: Duration,
    ) -> Result<FrameRef, DriverError>;

    /// Default timeout for driver-side waits issued through this page
    fn set_default_timeout(&self, timeout: Duration);

    async fn set_viewport(&self, viewport: &Viewport) -> Result<(), DriverError>;

    async fn emulate_network_conditions(
        &self,
        conditions: &NetworkConditions,
    ) -> Result<(), DriverError>;

    /// Navigate and wait for `options.wait_until`
    async fn navigate(&self, url: &str, options: &NavigationOptions) -> Result<(), DriverError>;

    /// Arm a listener for the next navigation of this page.
    ///
    /// The listener is registered before this method returns, so a navigation
    /// triggered after the call but before the future is first polled is still
    /// observed.
    fn wait_for_navigation(
        &self,
        options: NavigationOptions,
    ) -> BoxFuture<'static, Result<(), DriverError>>;

    async fn key_down(&self, key: &str) -> Result<(), DriverError>;

    async fn key_up(&self, key: &str) -> Result<(), DriverError>;

    async fn close(&self) -> Result<(), DriverError>;
}

/// Selector lookups shared by frames and elements
#[async_trait]
pub trait Queryable: Send + Sync {
    /// Wait for the first element matching `selector`.
    ///
    /// Fails with [`DriverError::Timeout`] when nothing (visible, if requested)
    /// matches in time.
    async fn wait_for_selector(
        &self,
        selector: &str,
        options: WaitForSelectorOptions,
    ) -> Result<ElementRef, DriverError>;

    /// Every current match, without waiting
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementRef>, DriverError>;
}

/// Document inside a page (main frame or iframe)
#[async_trait]
pub trait Frame: Queryable {
    fn url(&self) -> String;

    fn name(&self) -> String;

    /// Whether the frame runs in a separate renderer process
    fn is_out_of_process(&self) -> bool;

    /// Direct child frames in document order
    fn child_frames(&self) -> Vec<FrameRef>;

    async fn evaluate(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError>;

    /// Wait until `expression` evaluates truthy in this frame
    async fn wait_for_expression(
        &self,
        expression: &str,
        timeout: Duration,
    ) -> Result<(), DriverError>;
}

/// Element handle
#[async_trait]
pub trait Element: Queryable {
    async fn is_intersecting_viewport(&self) -> Result<bool, DriverError>;

    async fn is_visible(&self) -> Result<bool, DriverError>;

    async fn click(&self, options: &ClickOptions) -> Result<(), DriverError>;

    async fn hover(&self) -> Result<(), DriverError>;

    async fn focus(&self) -> Result<(), DriverError>;

    /// Send key presses for each character of `text`
    async fn type_text(&self, text: &str) -> Result<(), DriverError>;

    /// Select options by value, returning the values that ended up selected
    async fn select(&self, values: &[String]) -> Result<Vec<String>, DriverError>;

    /// Evaluate `script` with this element as its first argument
    async fn evaluate(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError>;
}
