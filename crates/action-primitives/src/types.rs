//! Option structs passed across the capability boundary

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options for a bounded selector wait.
///
/// A zero `timeout` means no deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitForSelectorOptions {
    pub timeout: Duration,
    /// Only accept an element that is rendered and not hidden
    pub visible: bool,
}

impl WaitForSelectorOptions {
    pub fn new(timeout: Duration, visible: bool) -> Self {
        Self { timeout, visible }
    }
}

/// Mouse button for click operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

/// Click position relative to the element's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClickOffset {
    pub x: f64,
    pub y: f64,
}

/// Click options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickOptions {
    pub button: MouseButton,
    pub click_count: u32,
    /// Time between press and release
    pub delay: Option<Duration>,
    pub offset: Option<ClickOffset>,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            click_count: 1,
            delay: None,
            offset: None,
        }
    }
}

/// Page viewport emulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
    pub is_mobile: bool,
    pub has_touch: bool,
    pub is_landscape: bool,
}

/// Navigation lifecycle milestone that completes a navigation wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitUntil {
    /// Page `load` event
    #[default]
    Load,
    DomContentLoaded,
    NetworkIdle,
}

/// Options for navigating or awaiting a navigation.
///
/// A zero `timeout` means no deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationOptions {
    pub timeout: Duration,
    pub wait_until: WaitUntil,
}

impl NavigationOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            wait_until: WaitUntil::Load,
        }
    }
}

/// Network throttling profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkConditions {
    /// Download throughput in bytes per second
    pub download: f64,
    /// Upload throughput in bytes per second
    pub upload: f64,
    /// Added round-trip latency in milliseconds
    pub latency: f64,
}
