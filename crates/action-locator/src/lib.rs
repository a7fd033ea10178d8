//! Selector resolution for flow replay
//!
//! A step carries several alternative selector chains. This crate turns them
//! into live element handles:
//! - `resolve_one` races every chain and keeps the first to resolve
//! - `resolve_all` evaluates every chain and unions the matches
//! - each chain is a pierce path: hop N is queried inside the element of hop N-1

pub mod errors;
pub mod resolver;

pub use errors::*;
pub use resolver::*;
