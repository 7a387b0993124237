//! Timing TestKit - psychophysical timing tests in the terminal
//!
//! Three tests of time perception (hold-duration reproduction, duration
//! estimation and rhythmic tapping), persistent results with notes and CSV
//! export, and user-defined sessions that play tests in sequence.

pub mod config;
pub mod export;
pub mod input;
pub mod records;
pub mod session;
pub mod stats;
pub mod store;
pub mod tests;
pub mod timing;
pub mod trial;
pub mod ui;

pub use config::Config;
