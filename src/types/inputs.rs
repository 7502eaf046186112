//! Named trigger input table
//!
//! Maps trigger input names (e.g. `MTVX`) to their bit position in the input
//! mask. The table is loaded once from configuration and consulted at
//! initialisation to resolve the reference input.

use super::NUM_INPUTS;
use crate::errors::{AppError, AppResult};
use std::collections::HashMap;

/// Inputs with an established name; the remaining slots get positional names.
const KNOWN_INPUTS: [&str; 10] = [
    "MT0A", "MT0C", "MTVX", "MTSC", "MTCE", "MVBA", "MVOR", "MVIR", "MVNC", "MVCH",
];

/// Resolves a trigger input name to its 0-based bit in the input mask
pub trait InputNameResolver {
    fn resolve_input_index(&self, name: &str) -> Option<usize>;
}

/// Ordered table of input names, one per input bit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputsConfiguration {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl Default for InputsConfiguration {
    fn default() -> Self {
        let names = (0..NUM_INPUTS).map(default_input_name).collect();
        Self::build(names)
    }
}

impl InputsConfiguration {
    /// Build a table from configured names.
    ///
    /// Fewer than `NUM_INPUTS` names are padded with the default names for the
    /// missing positions. Empty, duplicate, or surplus names are rejected.
    pub fn from_names(names: &[String]) -> AppResult<Self> {
        if names.len() > NUM_INPUTS {
            return Err(AppError::Config(format!(
                "{} input names configured, at most {} inputs exist",
                names.len(),
                NUM_INPUTS
            )));
        }

        let mut table: Vec<String> = Vec::with_capacity(NUM_INPUTS);
        for (bit, name) in names.iter().enumerate() {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(AppError::Config(format!("input {} has an empty name", bit)));
            }
            table.push(trimmed.to_string());
        }
        for bit in names.len()..NUM_INPUTS {
            table.push(default_input_name(bit));
        }

        let config = Self::build(table);
        if config.lookup.len() != NUM_INPUTS {
            return Err(AppError::Config("input names must be unique".to_string()));
        }
        Ok(config)
    }

    fn build(names: Vec<String>) -> Self {
        let lookup = names
            .iter()
            .enumerate()
            .map(|(bit, name)| (name.clone(), bit))
            .collect();
        Self { names, lookup }
    }

    /// Name of the input at `bit`, if the bit is a real input
    pub fn name_of(&self, bit: usize) -> Option<&str> {
        self.names.get(bit).map(String::as_str)
    }

    /// All names in bit order
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl InputNameResolver for InputsConfiguration {
    fn resolve_input_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name.trim()).copied()
    }
}

fn default_input_name(bit: usize) -> String {
    match KNOWN_INPUTS.get(bit) {
        Some(name) => name.to_string(),
        None => format!("I{:02}", bit + 1),
    }
}
