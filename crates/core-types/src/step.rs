//! Step definitions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::selector::SelectorChain;

/// Target name that always designates the flow's primary page
pub const MAIN_TARGET: &str = "main";

/// One recorded action or assertion.
///
/// The routing fields (`timeout`, `target`, `frame`, `asserted_events`) are
/// shared by every kind; kind-specific data lives in [`StepKind`], which is
/// fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Overrides the flow timeout for this step only (milliseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Page selector: absent or `main` is the primary page, anything else a URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Child-frame indices to descend into from the target's main frame
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frame: Vec<usize>,

    /// Side effects the action is expected to trigger
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub asserted_events: Vec<AssertedEvent>,

    #[serde(flatten)]
    kind: StepKind,
}

impl Step {
    /// Create a step of the given kind with default routing
    pub fn new(kind: StepKind) -> Self {
        Self {
            timeout: None,
            target: None,
            frame: Vec::new(),
            asserted_events: Vec::new(),
            kind,
        }
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    /// Set step timeout
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }

    /// Set target page
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set frame index path
    pub fn with_frame(mut self, frame: Vec<usize>) -> Self {
        self.frame = frame;
        self
    }

    /// Add asserted event
    pub fn with_asserted_event(mut self, event: AssertedEvent) -> Self {
        self.asserted_events.push(event);
        self
    }

    /// Whether this step runs against the flow's primary page
    pub fn targets_main_page(&self) -> bool {
        match self.target.as_deref().map(str::trim) {
            None | Some("") | Some(MAIN_TARGET) => true,
            Some(_) => false,
        }
    }
}

/// Closed set of step kinds, tagged by `type` in the serialized form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StepKind {
    SetViewport(SetViewportStep),
    Navigate(NavigateStep),
    Click(ClickStep),
    DoubleClick(ClickStep),
    Change(ChangeStep),
    KeyDown(KeyStep),
    KeyUp(KeyStep),
    Hover(HoverStep),
    Scroll(ScrollStep),
    WaitForElement(WaitForElementStep),
    WaitForExpression(WaitForExpressionStep),
    Close,
    CustomStep(CustomStep),
    EmulateNetworkConditions(NetworkConditionsStep),
}

impl StepKind {
    /// Serialized kind name
    pub fn name(&self) -> &'static str {
        match self {
            StepKind::SetViewport(_) => "setViewport",
            StepKind::Navigate(_) => "navigate",
            StepKind::Click(_) => "click",
            StepKind::DoubleClick(_) => "doubleClick",
            StepKind::Change(_) => "change",
            StepKind::KeyDown(_) => "keyDown",
            StepKind::KeyUp(_) => "keyUp",
            StepKind::Hover(_) => "hover",
            StepKind::Scroll(_) => "scroll",
            StepKind::WaitForElement(_) => "waitForElement",
            StepKind::WaitForExpression(_) => "waitForExpression",
            StepKind::Close => "close",
            StepKind::CustomStep(_) => "customStep",
            StepKind::EmulateNetworkConditions(_) => "emulateNetworkConditions",
        }
    }

    /// Selector alternatives, for kinds that locate elements
    pub fn selectors(&self) -> Option<&[SelectorChain]> {
        match self {
            StepKind::Click(step) | StepKind::DoubleClick(step) => Some(&step.selectors),
            StepKind::Change(step) => Some(&step.selectors),
            StepKind::Hover(step) => Some(&step.selectors),
            StepKind::Scroll(step) if !step.selectors.is_empty() => Some(&step.selectors),
            StepKind::WaitForElement(step) => Some(&step.selectors),
            _ => None,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetViewportStep {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_scale_factor")]
    pub device_scale_factor: f64,
    #[serde(default)]
    pub is_mobile: bool,
    #[serde(default)]
    pub has_touch: bool,
    #[serde(default)]
    pub is_landscape: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigateStep {
    pub url: String,
}

/// Shared by `click` and `doubleClick`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickStep {
    pub selectors: Vec<SelectorChain>,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<StepButton>,
    /// Delay between mouse down and up (milliseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeStep {
    pub selectors: Vec<SelectorChain>,
    pub value: String,
}

/// Shared by `keyDown` and `keyUp`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyStep {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverStep {
    pub selectors: Vec<SelectorChain>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollStep {
    /// Element to scroll; the window scrolls when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selectors: Vec<SelectorChain>,
    #[serde(default, alias = "offsetX")]
    pub x: f64,
    #[serde(default, alias = "offsetY")]
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitForElementStep {
    pub selectors: Vec<SelectorChain>,
    #[serde(default)]
    pub operator: CountOperator,
    #[serde(default = "default_count")]
    pub count: usize,
    /// Only count elements that are visible
    #[serde(default = "default_visible")]
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitForExpressionStep {
    pub expression: String,
}

/// Embedder-defined step; the built-in executor skips it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomStep {
    pub name: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConditionsStep {
    /// Download throughput in bytes/s (-1 disables throttling)
    pub download: f64,
    /// Upload throughput in bytes/s (-1 disables throttling)
    pub upload: f64,
    /// Added round-trip latency in milliseconds
    pub latency: f64,
}

/// Recorded mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepButton {
    #[default]
    Primary,
    Secondary,
    Auxiliary,
    Back,
    Forward,
}

/// Count comparator for `waitForElement`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CountOperator {
    #[default]
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = "==")]
    Exactly,
    #[serde(rename = "<=")]
    AtMost,
}

impl CountOperator {
    /// Apply the comparator as `actual <op> expected`
    pub fn compare(self, actual: usize, expected: usize) -> bool {
        match self {
            CountOperator::AtLeast => actual >= expected,
            CountOperator::Exactly => actual == expected,
            CountOperator::AtMost => actual <= expected,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CountOperator::AtLeast => ">=",
            CountOperator::Exactly => "==",
            CountOperator::AtMost => "<=",
        }
    }
}

impl fmt::Display for CountOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Side effect a step's action is expected to produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertedEvent {
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl AssertedEvent {
    /// Navigation assertion
    pub fn navigation(url: impl Into<String>) -> Self {
        Self {
            kind: EventType::Navigation,
            url: Some(url.into()),
            title: None,
        }
    }
}

/// Asserted event type.
///
/// Any string parses; kinds the engine cannot wait for are reported when the
/// step runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Navigation,
    Other(String),
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "navigation" => EventType::Navigation,
            _ => EventType::Other(value),
        }
    }
}

impl From<EventType> for String {
    fn from(kind: EventType) -> Self {
        match kind {
            EventType::Navigation => "navigation".to_string(),
            EventType::Other(other) => other,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Navigation => f.write_str("navigation"),
            EventType::Other(other) => f.write_str(other),
        }
    }
}

fn default_scale_factor() -> f64 {
    1.0
}

fn default_count() -> usize {
    1
}

fn default_visible() -> bool {
    true
}
