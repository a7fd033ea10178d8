//! In-memory driver.
//!
//! Every capability call is appended to a shared [`Journal`] so tests can
//! assert ordering. Elements, frames and targets can be scheduled to appear
//! after a delay. A permissive browser synthesizes an element for any selector
//! that has no match, which lets a flow be rehearsed without a browser.

mod dom;
mod element;
mod frame;
mod page;

pub use dom::FakeDom;
pub use element::FakeElement;
pub use frame::FakeFrame;
pub use page::FakePage;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::driver::{Browser, PageRef, Target, TargetRef};
use crate::errors::DriverError;
use crate::scripts;
use crate::waiting::bounded;
use tracing::trace;

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Ordered record of driver calls
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        let entry = entry.into();
        trace!(call = %entry, "Fake driver call");
        self.0.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Index of the first entry containing `fragment`
    pub fn position(&self, fragment: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e.contains(fragment))
    }

    pub fn count(&self, fragment: &str) -> usize {
        self.0.lock().iter().filter(|e| e.contains(fragment)).count()
    }

    pub fn contains(&self, fragment: &str) -> bool {
        self.position(fragment).is_some()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Short journal name for a well-known script
pub(crate) fn script_name(script: &str) -> &'static str {
    match script {
        scripts::READ_INPUT_TYPE => "read_input_type",
        scripts::READ_VALUE => "read_value",
        scripts::CLEAR_VALUE => "clear_value",
        scripts::RESET_CURSOR => "reset_cursor",
        scripts::SET_VALUE_AND_DISPATCH => "set_value_and_dispatch",
        scripts::BLUR_AND_FOCUS => "blur_and_focus",
        scripts::SCRIPT_CLICK => "script_click",
        scripts::SMOOTH_SCROLL_INTO_VIEW => "scroll_into_view",
        scripts::PAGE_SCROLL_OFFSETS => "page_scroll_offsets",
        scripts::SCROLL_ELEMENT_TO => "scroll_element_to",
        scripts::SCROLL_WINDOW_TO => "scroll_window_to",
        _ => "script",
    }
}

struct TargetEntry {
    url: String,
    page: Option<Arc<FakePage>>,
    ready_at: Instant,
}

impl TargetEntry {
    fn current_url(&self) -> String {
        match &self.page {
            Some(page) => page.current_url(),
            None => self.url.clone(),
        }
    }
}

/// In-memory browser
pub struct FakeBrowser {
    journal: Journal,
    permissive: bool,
    targets: Mutex<Vec<TargetEntry>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Browser whose documents synthesize elements for unmatched selectors
    pub fn permissive() -> Self {
        Self::build(true)
    }

    fn build(permissive: bool) -> Self {
        Self {
            journal: Journal::default(),
            permissive,
            targets: Mutex::new(Vec::new()),
        }
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    /// Open a page immediately
    pub fn new_page(&self, url: &str) -> Arc<FakePage> {
        self.open_page_after(url, Duration::ZERO)
    }

    /// Open a page that becomes discoverable after `delay`, like a popup
    pub fn open_page_after(&self, url: &str, delay: Duration) -> Arc<FakePage> {
        let page = FakePage::new(url, self.journal.clone(), self.permissive);
        self.targets.lock().push(TargetEntry {
            url: url.to_string(),
            page: Some(page.clone()),
            ready_at: Instant::now() + delay,
        });
        page
    }

    /// Register a target without a page (service worker, extension background)
    pub fn add_pageless_target(&self, url: &str) {
        self.targets.lock().push(TargetEntry {
            url: url.to_string(),
            page: None,
            ready_at: Instant::now(),
        });
    }

    fn find_target(&self, url: &str) -> Option<FakeTarget> {
        let now = Instant::now();
        self.targets
            .lock()
            .iter()
            .filter(|entry| entry.ready_at <= now)
            .find(|entry| entry.current_url() == url)
            .map(|entry| FakeTarget {
                url: entry.current_url(),
                page: entry.page.clone(),
            })
    }
}

impl Default for FakeBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn wait_for_target(&self, url: &str, timeout: Duration) -> Result<TargetRef, DriverError> {
        self.journal.record(format!("browser wait_for_target {}", url));
        let found = bounded(timeout, async {
            loop {
                if let Some(target) = self.find_target(url) {
                    return target;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await;

        match found {
            Some(target) => Ok(Arc::new(target)),
            None => Err(DriverError::timed_out(
                format!("waiting for target '{}'", url),
                timeout,
            )),
        }
    }
}

/// Target handle returned by [`FakeBrowser`]
#[derive(Clone)]
pub struct FakeTarget {
    url: String,
    page: Option<Arc<FakePage>>,
}

#[async_trait]
impl Target for FakeTarget {
    fn url(&self) -> String {
        self.url.clone()
    }

    async fn page(&self) -> Result<Option<PageRef>, DriverError> {
        Ok(self.page.clone().map(|page| page as PageRef))
    }
}
