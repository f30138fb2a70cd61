//! Data models for the drinks catalog.

mod drink;

pub use drink::*;
