//! Utility functions and helpers

pub mod duration;

pub use duration::{parse_duration, parse_positive_duration, SignedDuration};
