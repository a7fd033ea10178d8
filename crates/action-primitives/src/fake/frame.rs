use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::dom::FakeDom;
use super::element::FakeElement;
use super::{script_name, Journal, POLL_INTERVAL};
use crate::driver::{ElementRef, Frame, FrameRef, Queryable};
use crate::errors::DriverError;
use crate::scripts;
use crate::types::WaitForSelectorOptions;
use crate::waiting::bounded;

/// In-memory frame with its own document and window scroll offsets
pub struct FakeFrame {
    url: Mutex<String>,
    name: String,
    out_of_process: bool,
    permissive: bool,
    journal: Journal,
    dom: FakeDom,
    children: Mutex<Vec<Arc<FakeFrame>>>,
    scroll: Mutex<(f64, f64)>,
    /// Every offset sample moves the window, so scrolling never settles
    drifting: AtomicBool,
    /// Expression -> instant it turns truthy, `None` for never.
    /// Unlisted expressions are truthy immediately.
    expressions: Mutex<HashMap<String, Option<Instant>>>,
}

impl FakeFrame {
    pub(crate) fn new(
        url: &str,
        name: &str,
        out_of_process: bool,
        journal: Journal,
        permissive: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            url: Mutex::new(url.to_string()),
            name: name.to_string(),
            out_of_process,
            permissive,
            dom: FakeDom::new(format!("frame({})", url), journal.clone(), permissive),
            journal,
            children: Mutex::new(Vec::new()),
            scroll: Mutex::new((0.0, 0.0)),
            drifting: AtomicBool::new(false),
            expressions: Mutex::new(HashMap::new()),
        })
    }

    pub fn dom(&self) -> &FakeDom {
        &self.dom
    }

    pub fn insert(&self, selector: &str) -> Arc<FakeElement> {
        self.dom.insert(selector)
    }

    pub fn insert_after(&self, selector: &str, delay: Duration) -> Arc<FakeElement> {
        self.dom.insert_after(selector, delay)
    }

    pub fn remove(&self, selector: &str) {
        self.dom.remove(selector);
    }

    /// Append an in-process child frame
    pub fn add_child_frame(&self, url: &str, name: &str) -> Arc<FakeFrame> {
        let child = FakeFrame::new(url, name, false, self.journal.clone(), self.permissive);
        self.children.lock().push(child.clone());
        child
    }

    pub fn child_frame(&self, index: usize) -> Option<Arc<FakeFrame>> {
        self.children.lock().get(index).cloned()
    }

    pub fn child_count(&self) -> usize {
        self.children.lock().len()
    }

    pub fn current_url(&self) -> String {
        self.url.lock().clone()
    }

    pub(crate) fn set_url(&self, url: &str) {
        *self.url.lock() = url.to_string();
    }

    /// Window scroll offsets `(x, y)`
    pub fn scroll_offsets(&self) -> (f64, f64) {
        *self.scroll.lock()
    }

    /// Move the window on every offset sample from now on
    pub fn drift_scroll_offsets(&self) {
        self.drifting.store(true, Ordering::SeqCst);
    }

    /// `expression` turns truthy after `delay`
    pub fn set_expression_truthy_after(&self, expression: &str, delay: Duration) {
        self.expressions
            .lock()
            .insert(expression.to_string(), Some(Instant::now() + delay));
    }

    /// `expression` never turns truthy
    pub fn set_expression_never_truthy(&self, expression: &str) {
        self.expressions.lock().insert(expression.to_string(), None);
    }

    fn is_truthy(&self, expression: &str) -> bool {
        match self.expressions.lock().get(expression) {
            None => true,
            Some(Some(at)) => *at <= Instant::now(),
            Some(None) => false,
        }
    }

    fn record(&self, action: impl std::fmt::Display) {
        self.journal
            .record(format!("frame({}) {}", self.current_url(), action));
    }
}

#[async_trait]
impl Queryable for FakeFrame {
    async fn wait_for_selector(
        &self,
        selector: &str,
        options: WaitForSelectorOptions,
    ) -> Result<ElementRef, DriverError> {
        self.dom.wait_for_selector(selector, options).await
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementRef>, DriverError> {
        Ok(self.dom.query_all(selector))
    }
}

#[async_trait]
impl Frame for FakeFrame {
    fn url(&self) -> String {
        self.current_url()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_out_of_process(&self) -> bool {
        self.out_of_process
    }

    fn child_frames(&self) -> Vec<FrameRef> {
        self.children
            .lock()
            .iter()
            .map(|child| child.clone() as FrameRef)
            .collect()
    }

    async fn evaluate(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.record(format_args!("evaluate {}", script_name(script)));
        match script {
            scripts::PAGE_SCROLL_OFFSETS => {
                let mut scroll = self.scroll.lock();
                if self.drifting.load(Ordering::SeqCst) {
                    scroll.1 += 1.0;
                }
                let (x, y) = *scroll;
                Ok(json!([x, y]))
            }
            scripts::SCROLL_WINDOW_TO => {
                let coordinate = |index: usize| {
                    args.get(index).and_then(Value::as_f64).ok_or_else(|| {
                        DriverError::Evaluation(format!("argument {} is not a number", index))
                    })
                };
                *self.scroll.lock() = (coordinate(0)?, coordinate(1)?);
                Ok(json!(true))
            }
            _ => Ok(Value::Null),
        }
    }

    async fn wait_for_expression(
        &self,
        expression: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        self.record(format_args!("wait_for_expression {}", expression));
        let truthy = bounded(timeout, async {
            while !self.is_truthy(expression) {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await;

        truthy.ok_or_else(|| {
            DriverError::timed_out(format!("waiting for expression '{}'", expression), timeout)
        })
    }
}
