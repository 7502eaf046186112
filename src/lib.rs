//! Trigger Rate Monitor
//!
//! Folds per-time-frame trigger decisions (input and class bitmasks) into rate
//! histograms normalised by accumulated live time, driven by a host through a
//! fixed set of lifecycle hooks.

pub mod cli;
pub mod config;
pub mod decoder;
pub mod errors;
pub mod geometry;
pub mod histogram;
pub mod processor;
pub mod publish;
pub mod types;
pub mod utils;
