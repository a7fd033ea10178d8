//! Driver capability surface for flow replay
//!
//! The replay engine never talks to a browser directly. It drives these traits:
//! - `Browser` / `Target`: locate top-level targets by URL
//! - `Page`: viewport, navigation, keyboard, frames, close
//! - `Frame` / `Element`: selector waits, queries, script evaluation, input
//!
//! Implementations wrap a real automation protocol; the `fake` module (behind
//! the `fake` feature) provides an in-memory one.

mod driver;
pub mod errors;
pub mod scripts;
pub mod types;
mod waiting;

#[cfg(feature = "fake")]
pub mod fake;

pub use driver::*;
pub use errors::*;
pub use types::*;
pub use waiting::*;
