#![forbid(unsafe_code)]

pub mod collect;
pub mod model;
pub mod time;

pub use time::Clock;
