//! Integration Tests Module
//!
//! End-to-end replay of CSV captures and configuration loading.

pub mod config_env;
