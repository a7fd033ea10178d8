pub mod app;
pub mod commands;
pub mod env;
pub mod inspect;
pub mod output;
pub mod rehearse;
pub mod runtime;

pub use inspect::{cmd_inspect, InspectArgs};
pub use rehearse::{cmd_rehearse, RehearseArgs};
