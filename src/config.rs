//! Compilation options consumed by the core
//!
//! The toolchain hands options over as a string map (`optimize`,
//! `registerAllocation`, `debug`); [`Config::from_options`] turns that map
//! into a typed value.

use std::collections::HashMap;
use thiserror::Error;

use crate::consts::DEFAULT_OPTIMIZATION_ROUNDS;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("option '{key}' expects a boolean, found '{value}'")]
    InvalidBool { key: String, value: String },
    #[error("option '{key}' expects an integer, found '{value}'")]
    InvalidInt { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Run constant folding/propagation before lowering
    pub optimize: bool,
    /// Register budget: negative disables allocation, 0 means unlimited
    pub register_budget: i32,
    /// Upper bound on folding/propagation rounds
    pub max_optimization_rounds: usize,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            optimize: false,
            register_budget: -1,
            max_optimization_rounds: DEFAULT_OPTIMIZATION_ROUNDS,
            debug: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_register_budget(mut self, budget: i32) -> Self {
        self.register_budget = budget;
        self
    }

    pub fn with_max_optimization_rounds(mut self, rounds: usize) -> Self {
        self.max_optimization_rounds = rounds;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Whether the register allocator should run at all
    pub fn allocation_enabled(&self) -> bool {
        self.register_budget >= 0
    }

    /// Build a config from the toolchain's option map.
    ///
    /// Missing keys keep their defaults; unknown keys are ignored.
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = options.get("optimize") {
            config.optimize = parse_bool("optimize", value)?;
        }
        if let Some(value) = options.get("registerAllocation") {
            config.register_budget = value.trim().parse().map_err(|_| ConfigError::InvalidInt {
                key: "registerAllocation".to_string(),
                value: value.clone(),
            })?;
        }
        if let Some(value) = options.get("debug") {
            config.debug = parse_bool("debug", value)?;
        }
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        other => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}
