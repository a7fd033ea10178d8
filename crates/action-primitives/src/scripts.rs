//! Page scripts evaluated by the engine.
//!
//! Element scripts receive the element as their first argument followed by the
//! evaluation arguments. Frame scripts receive only the arguments. Drivers that
//! cannot run JavaScript may match on these constants instead.

/// Element `type` attribute, empty for non-input elements
pub const READ_INPUT_TYPE: &str = "(el) => (typeof el.type === 'string' ? el.type : '')";

/// Current `value` of a form control
pub const READ_VALUE: &str = "(el) => el.value";

pub const CLEAR_VALUE: &str = "(el) => { el.value = ''; }";

/// Re-assign the value so the caret lands at the end
pub const RESET_CURSOR: &str = "(el) => { const value = el.value; el.value = ''; el.value = value; }";

/// Assign `value` and dispatch bubbling `input` then `change`
pub const SET_VALUE_AND_DISPATCH: &str = "(el, value) => { \
    el.value = value; \
    el.dispatchEvent(new Event('input', { bubbles: true })); \
    el.dispatchEvent(new Event('change', { bubbles: true })); \
}";

/// Blur then refocus so selection controls commit their value
pub const BLUR_AND_FOCUS: &str = "(el) => { el.blur(); el.focus(); }";

/// DOM-level click used when a native click is rejected
pub const SCRIPT_CLICK: &str = "(el) => el.click()";

pub const SMOOTH_SCROLL_INTO_VIEW: &str = "(el) => { \
    el.scrollIntoView({ behavior: 'smooth', block: 'nearest', inline: 'nearest' }); \
    return true; \
}";

/// `[pageXOffset, pageYOffset]` of the frame's window
pub const PAGE_SCROLL_OFFSETS: &str = "() => [window.pageXOffset, window.pageYOffset]";

/// Scroll an element's content to `(x, y)`
pub const SCROLL_ELEMENT_TO: &str = "(el, x, y) => { el.scrollLeft = x; el.scrollTop = y; return true; }";

/// Scroll the frame's window to `(x, y)`
pub const SCROLL_WINDOW_TO: &str = "(x, y) => { window.scroll(x, y); return true; }";
