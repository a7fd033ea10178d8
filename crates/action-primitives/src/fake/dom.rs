use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::element::FakeElement;
use super::{Journal, POLL_INTERVAL};
use crate::driver::ElementRef;
use crate::errors::DriverError;
use crate::types::WaitForSelectorOptions;
use crate::waiting::bounded;

struct DomEntry {
    selector: String,
    element: Arc<FakeElement>,
    ready_at: Instant,
}

/// Selector-keyed element store backing a frame or an element's subtree.
///
/// Selectors match by exact string; several elements may share one selector.
pub struct FakeDom {
    owner: String,
    journal: Journal,
    permissive: bool,
    entries: Mutex<Vec<DomEntry>>,
    /// Selector -> error returned by `wait_for_selector` after a delay
    failures: Mutex<HashMap<String, (DriverError, Duration)>>,
}

impl FakeDom {
    pub(crate) fn new(owner: String, journal: Journal, permissive: bool) -> Self {
        Self {
            owner,
            journal,
            permissive,
            entries: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Add an element matching `selector`
    pub fn insert(&self, selector: &str) -> Arc<FakeElement> {
        self.insert_after(selector, Duration::ZERO)
    }

    /// Add an element that starts matching `selector` after `delay`
    pub fn insert_after(&self, selector: &str, delay: Duration) -> Arc<FakeElement> {
        let element = Arc::new(FakeElement::new(
            selector,
            self.journal.clone(),
            self.permissive,
        ));
        self.entries.lock().push(DomEntry {
            selector: selector.to_string(),
            element: element.clone(),
            ready_at: Instant::now() + delay,
        });
        element
    }

    /// Make waits for `selector` fail with `error` once `delay` has passed
    pub fn fail_selector_after(&self, selector: &str, error: DriverError, delay: Duration) {
        self.failures
            .lock()
            .insert(selector.to_string(), (error, delay));
    }

    /// Detach every element matching `selector`
    pub fn remove(&self, selector: &str) {
        self.entries.lock().retain(|entry| entry.selector != selector);
    }

    fn present(&self, selector: &str) -> Vec<Arc<FakeElement>> {
        let now = Instant::now();
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.selector == selector && entry.ready_at <= now)
            .map(|entry| entry.element.clone())
            .collect()
    }

    pub(crate) async fn wait_for_selector(
        &self,
        selector: &str,
        options: WaitForSelectorOptions,
    ) -> Result<ElementRef, DriverError> {
        self.journal
            .record(format!("{} wait_for_selector {}", self.owner, selector));

        let failure = self.failures.lock().get(selector).cloned();
        if let Some((error, delay)) = failure {
            tokio::time::sleep(delay).await;
            return Err(error);
        }

        let found = bounded(options.timeout, async {
            loop {
                let present = self.present(selector);
                if let Some(element) = present
                    .iter()
                    .find(|element| !options.visible || element.visible())
                {
                    return element.clone();
                }
                if present.is_empty() && self.permissive {
                    return self.insert(selector);
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await;

        match found {
            Some(element) => Ok(element as ElementRef),
            None => Err(DriverError::timed_out(
                format!("waiting for selector '{}'", selector),
                options.timeout,
            )),
        }
    }

    pub(crate) fn query_all(&self, selector: &str) -> Vec<ElementRef> {
        self.journal
            .record(format!("{} query_all {}", self.owner, selector));

        let mut present = self.present(selector);
        if present.is_empty() && self.permissive {
            present.push(self.insert(selector));
        }
        present
            .into_iter()
            .map(|element| element as ElementRef)
            .collect()
    }
}
