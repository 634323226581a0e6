// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table configuration
//!
//! Loaded from TOML with humantime durations. Every key is optional.

use crate::coordination::{DEFAULT_FAIRNESS_MARGIN, DEFAULT_STARVATION_THRESHOLD};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating a [`TableConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(
        "fairness margin ({}) must be below the starvation threshold ({})",
        humantime::format_duration(*fairness_margin),
        humantime::format_duration(*starvation_threshold)
    )]
    InvalidThresholds {
        starvation_threshold: Duration,
        fairness_margin: Duration,
    },
    #[error("invalid delay range: {0}")]
    InvalidRange(String),
    #[error("need at least 2 workers, got {0}")]
    TooFewWorkers(usize),
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
}

/// How workers are granted their pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Central coordinator with starvation ceiling and fairness margin
    #[default]
    Fairness,
    /// Central coordinator, admit whenever both resources are free
    Greedy,
    /// Central coordinator, at most `workers - 1` eating at once
    Capacity,
    /// Per-resource locks, last worker picks up right first
    Asymmetric,
    /// Per-resource locks behind a `workers - 1` gate
    Gated,
    /// Per-resource locks, everyone picks up left first (can deadlock)
    LeftFirst,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::Fairness,
        Strategy::Greedy,
        Strategy::Capacity,
        Strategy::Asymmetric,
        Strategy::Gated,
        Strategy::LeftFirst,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Fairness => "fairness",
            Strategy::Greedy => "greedy",
            Strategy::Capacity => "capacity",
            Strategy::Asymmetric => "asymmetric",
            Strategy::Gated => "gated",
            Strategy::LeftFirst => "left-first",
        }
    }

    /// Whether this strategy goes through the central coordinator
    pub fn is_coordinated(&self) -> bool {
        matches!(
            self,
            Strategy::Fairness | Strategy::Greedy | Strategy::Capacity
        )
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownStrategy(s.to_string()))
    }
}

/// Inclusive range a random delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    #[serde(with = "humantime_serde")]
    pub min: Duration,
    #[serde(with = "humantime_serde")]
    pub max: Duration,
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Result<Self, ConfigError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Always the same delay
    pub fn fixed(delay: Duration) -> Self {
        Self {
            min: delay,
            max: delay,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidRange(self.to_string()));
        }
        Ok(())
    }

    /// Draw a delay uniformly from `min..=max`
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(1),
            max: Duration::from_secs(3),
        }
    }
}

impl fmt::Display for DelayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            humantime::format_duration(self.min),
            humantime::format_duration(self.max)
        )
    }
}

/// Parses `"1s..3s"`, or a single duration for a fixed delay
impl FromStr for DelayRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            humantime::parse_duration(part.trim())
                .map_err(|e| ConfigError::InvalidRange(format!("{s}: {e}")))
        };
        match s.split_once("..") {
            Some((min, max)) => Self::new(parse(min)?, parse(max)?),
            None => Ok(Self::fixed(parse(s)?)),
        }
    }
}

/// Everything needed to set a table and run it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// Number of workers, and so of resources
    pub workers: usize,
    pub strategy: Strategy,
    /// How long workers run before shutdown is requested
    #[serde(with = "humantime_serde")]
    pub run_for: Duration,
    /// How long to wait for workers to stop after shutdown
    #[serde(with = "humantime_serde")]
    pub grace: Duration,
    pub think: DelayRange,
    pub eat: DelayRange,
    #[serde(with = "humantime_serde")]
    pub starvation_threshold: Duration,
    #[serde(with = "humantime_serde")]
    pub fairness_margin: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            strategy: Strategy::default(),
            run_for: Duration::from_secs(120),
            grace: Duration::from_secs(1),
            think: DelayRange::default(),
            eat: DelayRange::default(),
            starvation_threshold: DEFAULT_STARVATION_THRESHOLD,
            fairness_margin: DEFAULT_FAIRNESS_MARGIN,
        }
    }
}

impl TableConfig {
    /// Read and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: TableConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers < 2 {
            return Err(ConfigError::TooFewWorkers(self.workers));
        }
        self.think.validate()?;
        self.eat.validate()?;
        if self.fairness_margin >= self.starvation_threshold {
            return Err(ConfigError::InvalidThresholds {
                starvation_threshold: self.starvation_threshold,
                fairness_margin: self.fairness_margin,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
