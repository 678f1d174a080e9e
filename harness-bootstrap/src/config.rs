// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Configuration
//!
//! `BootstrapConfig` holds validated settings for the process itself —
//! logging verbosity, the default run-log directory, default concurrency —
//! resolved from CLI flags and environment variables before the harness's own
//! `AppConfig` (model credentials, pipeline defaults) is loaded. Immutable
//! after construction so it can be shared across async tasks without
//! synchronization.

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unrecognized log level: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    app_name: String,
    log_level: LogLevel,
    run_log_dir: PathBuf,
    default_concurrency: usize,
    verbose: bool,
}

impl BootstrapConfig {
    pub fn builder() -> BootstrapConfigBuilder {
        BootstrapConfigBuilder::default()
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn run_log_dir(&self) -> &PathBuf {
        &self.run_log_dir
    }

    pub fn default_concurrency(&self) -> usize {
        self.default_concurrency
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Debug)]
pub struct BootstrapConfigBuilder {
    app_name: Option<String>,
    log_level: Option<LogLevel>,
    run_log_dir: Option<PathBuf>,
    default_concurrency: Option<usize>,
    verbose: bool,
}

impl Default for BootstrapConfigBuilder {
    fn default() -> Self {
        Self {
            app_name: None,
            log_level: None,
            run_log_dir: None,
            default_concurrency: None,
            verbose: false,
        }
    }
}

impl BootstrapConfigBuilder {
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn run_log_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.run_log_dir = Some(path.into());
        self
    }

    pub fn default_concurrency(mut self, count: usize) -> Self {
        self.default_concurrency = Some(count);
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    pub fn try_build(self) -> Result<BootstrapConfig, String> {
        Ok(BootstrapConfig {
            app_name: self.app_name.ok_or("app_name is required")?,
            log_level: self.log_level.unwrap_or_default(),
            run_log_dir: self.run_log_dir.unwrap_or_else(|| PathBuf::from(".harness/runs")),
            default_concurrency: self.default_concurrency.unwrap_or_else(|| {
                std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
            }),
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults_for_unset_fields() {
        let config = BootstrapConfig::builder().app_name("harness").try_build().unwrap();
        assert_eq!(config.app_name(), "harness");
        assert_eq!(config.log_level(), LogLevel::Info);
        assert_eq!(config.run_log_dir(), &PathBuf::from(".harness/runs"));
        assert!(config.default_concurrency() >= 1);
        assert!(!config.is_verbose());
    }

    #[test]
    fn builder_honors_explicit_overrides() {
        let config = BootstrapConfig::builder()
            .app_name("harness")
            .log_level(LogLevel::Debug)
            .run_log_dir("/tmp/runs")
            .default_concurrency(8)
            .verbose(true)
            .try_build()
            .unwrap();

        assert_eq!(config.log_level(), LogLevel::Debug);
        assert_eq!(config.run_log_dir(), &PathBuf::from("/tmp/runs"));
        assert_eq!(config.default_concurrency(), 8);
        assert!(config.is_verbose());
    }

    #[test]
    fn missing_app_name_fails_to_build() {
        let result = BootstrapConfig::builder().try_build();
        assert!(result.is_err());
    }

    #[test]
    fn log_level_parses_from_str_case_insensitively() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("bogus".parse::<LogLevel>().is_err());
    }
}
