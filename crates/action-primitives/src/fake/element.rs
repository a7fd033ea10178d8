use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::dom::FakeDom;
use super::{script_name, Journal};
use crate::driver::{Element, ElementRef, Queryable};
use crate::errors::DriverError;
use crate::scripts;
use crate::types::{ClickOptions, WaitForSelectorOptions};

/// Scriptable element.
///
/// Starts visible, inside the viewport, with an empty input type and value.
pub struct FakeElement {
    label: String,
    journal: Journal,
    children: FakeDom,
    input_type: Mutex<String>,
    value: Mutex<String>,
    visible: AtomicBool,
    in_viewport: AtomicBool,
    click_error: Mutex<Option<DriverError>>,
    script_click_error: Mutex<Option<DriverError>>,
    clicks: Mutex<Vec<ClickOptions>>,
    script_clicks: AtomicUsize,
    typed: Mutex<Vec<String>>,
    events: Mutex<Vec<String>>,
    selected: Mutex<Vec<String>>,
    scroll: Mutex<(f64, f64)>,
    hovered: AtomicBool,
    focus_count: AtomicUsize,
}

impl FakeElement {
    pub(crate) fn new(label: &str, journal: Journal, permissive: bool) -> Self {
        Self {
            label: label.to_string(),
            children: FakeDom::new(format!("element({})", label), journal.clone(), permissive),
            journal,
            input_type: Mutex::new(String::new()),
            value: Mutex::new(String::new()),
            visible: AtomicBool::new(true),
            in_viewport: AtomicBool::new(true),
            click_error: Mutex::new(None),
            script_click_error: Mutex::new(None),
            clicks: Mutex::new(Vec::new()),
            script_clicks: AtomicUsize::new(0),
            typed: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            selected: Mutex::new(Vec::new()),
            scroll: Mutex::new((0.0, 0.0)),
            hovered: AtomicBool::new(false),
            focus_count: AtomicUsize::new(0),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Add a descendant reachable through this element (shadow root, iframe)
    pub fn insert(&self, selector: &str) -> Arc<FakeElement> {
        self.children.insert(selector)
    }

    pub fn insert_after(&self, selector: &str, delay: Duration) -> Arc<FakeElement> {
        self.children.insert_after(selector, delay)
    }

    pub fn set_input_type(&self, input_type: &str) {
        *self.input_type.lock() = input_type.to_string();
    }

    pub fn set_value(&self, value: &str) {
        *self.value.lock() = value.to_string();
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    pub fn set_in_viewport(&self, in_viewport: bool) {
        self.in_viewport.store(in_viewport, Ordering::SeqCst);
    }

    /// Make native clicks fail with `error`
    pub fn fail_clicks(&self, error: DriverError) {
        *self.click_error.lock() = Some(error);
    }

    /// Make the script click fallback fail with `error`
    pub fn fail_script_clicks(&self, error: DriverError) {
        *self.script_click_error.lock() = Some(error);
    }

    pub fn value(&self) -> String {
        self.value.lock().clone()
    }

    pub fn visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn in_viewport(&self) -> bool {
        self.in_viewport.load(Ordering::SeqCst)
    }

    /// Successful native clicks
    pub fn clicks(&self) -> Vec<ClickOptions> {
        self.clicks.lock().clone()
    }

    pub fn script_clicks(&self) -> usize {
        self.script_clicks.load(Ordering::SeqCst)
    }

    /// Text passed to each `type_text` call
    pub fn typed(&self) -> Vec<String> {
        self.typed.lock().clone()
    }

    /// DOM events dispatched by scripts, in order
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn selected(&self) -> Vec<String> {
        self.selected.lock().clone()
    }

    pub fn scroll_position(&self) -> (f64, f64) {
        *self.scroll.lock()
    }

    pub fn hovered(&self) -> bool {
        self.hovered.load(Ordering::SeqCst)
    }

    pub fn focus_count(&self) -> usize {
        self.focus_count.load(Ordering::SeqCst)
    }

    fn record(&self, action: impl std::fmt::Display) {
        self.journal
            .record(format!("element({}) {}", self.label, action));
    }
}

fn number_arg(args: &[Value], index: usize) -> Result<f64, DriverError> {
    args.get(index)
        .and_then(Value::as_f64)
        .ok_or_else(|| DriverError::Evaluation(format!("argument {} is not a number", index)))
}

#[async_trait]
impl Queryable for FakeElement {
    async fn wait_for_selector(
        &self,
        selector: &str,
        options: WaitForSelectorOptions,
    ) -> Result<ElementRef, DriverError> {
        self.children.wait_for_selector(selector, options).await
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementRef>, DriverError> {
        Ok(self.children.query_all(selector))
    }
}

#[async_trait]
impl Element for FakeElement {
    async fn is_intersecting_viewport(&self) -> Result<bool, DriverError> {
        Ok(self.in_viewport())
    }

    async fn is_visible(&self) -> Result<bool, DriverError> {
        Ok(self.visible())
    }

    async fn click(&self, options: &ClickOptions) -> Result<(), DriverError> {
        self.record(format_args!(
            "click {:?} x{}",
            options.button, options.click_count
        ));
        if let Some(error) = self.click_error.lock().clone() {
            return Err(error);
        }
        self.clicks.lock().push(*options);
        Ok(())
    }

    async fn hover(&self) -> Result<(), DriverError> {
        self.record("hover");
        self.hovered.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn focus(&self) -> Result<(), DriverError> {
        self.record("focus");
        self.focus_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), DriverError> {
        self.record(format_args!("type {}", text));
        self.value.lock().push_str(text);
        self.typed.lock().push(text.to_string());
        Ok(())
    }

    async fn select(&self, values: &[String]) -> Result<Vec<String>, DriverError> {
        self.record(format_args!("select {}", values.join(",")));
        if let Some(first) = values.first() {
            *self.value.lock() = first.clone();
        }
        *self.selected.lock() = values.to_vec();
        Ok(values.to_vec())
    }

    async fn evaluate(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.record(format_args!("evaluate {}", script_name(script)));
        match script {
            scripts::READ_INPUT_TYPE => Ok(json!(self.input_type.lock().clone())),
            scripts::READ_VALUE => Ok(json!(self.value())),
            scripts::CLEAR_VALUE => {
                self.value.lock().clear();
                Ok(Value::Null)
            }
            scripts::RESET_CURSOR => Ok(Value::Null),
            scripts::SET_VALUE_AND_DISPATCH => {
                let value = args
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| DriverError::Evaluation("value is not a string".into()))?;
                *self.value.lock() = value.to_string();
                self.events
                    .lock()
                    .extend(["input".to_string(), "change".to_string()]);
                Ok(Value::Null)
            }
            scripts::BLUR_AND_FOCUS => {
                self.events
                    .lock()
                    .extend(["blur".to_string(), "focus".to_string()]);
                Ok(Value::Null)
            }
            scripts::SCRIPT_CLICK => {
                if let Some(error) = self.script_click_error.lock().clone() {
                    return Err(error);
                }
                self.script_clicks.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Null)
            }
            scripts::SMOOTH_SCROLL_INTO_VIEW => {
                self.in_viewport.store(true, Ordering::SeqCst);
                Ok(json!(true))
            }
            scripts::SCROLL_ELEMENT_TO => {
                *self.scroll.lock() = (number_arg(&args, 0)?, number_arg(&args, 1)?);
                Ok(json!(true))
            }
            _ => Ok(Value::Null),
        }
    }
}
