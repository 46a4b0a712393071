//! Game configuration.
//!
//! Defaults match the tabletop pacing: dice are checked every 100 ms, the
//! rolled faces stay on screen for a second, and AI players "think" for one
//! second before committing a card decision. Every value can be overridden
//! from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::DomainError;

/// Replaces the dice-derived movement with a fixed step count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugOverride {
    /// Whether the override is active.
    pub enabled: bool,
    /// Steps to move while the override is active.
    pub fixed_steps: u32,
}

impl DebugOverride {
    /// An active override moving exactly `fixed_steps`.
    #[must_use]
    pub fn fixed(fixed_steps: u32) -> Self {
        Self {
            enabled: true,
            fixed_steps,
        }
    }
}

/// Intervals used by the turn coordinator and the AI decision delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// How often the coordinator checks whether both dice settled.
    pub settle_poll_interval: Duration,
    /// How often the coordinator checks whether a card is still animating.
    pub card_poll_interval: Duration,
    /// How long the rolled faces are displayed before the token moves.
    pub result_display_interval: Duration,
    /// Presentation delay before an AI player commits a card decision.
    pub ai_decision_delay: Duration,
    /// Time the token spends on each board space while moving.
    pub step_interval: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_poll_interval: Duration::from_millis(100),
            card_poll_interval: Duration::from_millis(100),
            result_display_interval: Duration::from_secs(1),
            ai_decision_delay: Duration::from_secs(1),
            step_interval: Duration::from_millis(250),
        }
    }
}

/// Top-level configuration for a simulated game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// RNG seed; `None` seeds from the operating system.
    pub seed: Option<u64>,
    /// Number of rounds to play.
    pub turns: u32,
    /// Optional card catalog file (`.json`, `.yaml` or `.yml`).
    pub catalog_path: Option<PathBuf>,
    /// Phase intervals.
    pub timing: TimingConfig,
    /// Movement override for deterministic runs.
    pub debug: DebugOverride,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            turns: 20,
            catalog_path: None,
            timing: TimingConfig::default(),
            debug: DebugOverride::default(),
        }
    }
}

impl GameConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if a variable is set but cannot
    /// be parsed.
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, starting from the defaults.
    ///
    /// Recognized keys: `CASHFLOW_SEED`, `CASHFLOW_TURNS`,
    /// `CASHFLOW_CATALOG`, `CASHFLOW_DEBUG_MOVE`, `CASHFLOW_DEBUG_STEPS`,
    /// `CASHFLOW_SETTLE_POLL_MS`, `CASHFLOW_CARD_POLL_MS`,
    /// `CASHFLOW_DISPLAY_MS`, `CASHFLOW_AI_DELAY_MS`, `CASHFLOW_STEP_MS`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("CASHFLOW_SEED") {
            config.seed = Some(parse_number("CASHFLOW_SEED", &raw)?);
        }
        if let Some(raw) = lookup("CASHFLOW_TURNS") {
            config.turns = parse_number("CASHFLOW_TURNS", &raw)?;
        }
        if let Some(raw) = lookup("CASHFLOW_CATALOG").filter(|raw| !raw.trim().is_empty()) {
            config.catalog_path = Some(PathBuf::from(raw.trim()));
        }

        if let Some(raw) = lookup("CASHFLOW_DEBUG_MOVE") {
            config.debug.enabled = parse_flag("CASHFLOW_DEBUG_MOVE", &raw)?;
        }
        if let Some(raw) = lookup("CASHFLOW_DEBUG_STEPS") {
            config.debug.fixed_steps = parse_number("CASHFLOW_DEBUG_STEPS", &raw)?;
        }
        if config.debug.enabled && config.debug.fixed_steps == 0 {
            config.debug.fixed_steps = 1;
        }

        let timing = &mut config.timing;
        for (key, slot) in [
            ("CASHFLOW_SETTLE_POLL_MS", &mut timing.settle_poll_interval),
            ("CASHFLOW_CARD_POLL_MS", &mut timing.card_poll_interval),
            ("CASHFLOW_DISPLAY_MS", &mut timing.result_display_interval),
            ("CASHFLOW_AI_DELAY_MS", &mut timing.ai_decision_delay),
            ("CASHFLOW_STEP_MS", &mut timing.step_interval),
        ] {
            if let Some(raw) = lookup(key) {
                *slot = Duration::from_millis(parse_number(key, &raw)?);
            }
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, DomainError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| DomainError::Configuration(format!("{key} must be a number: {e}")))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, DomainError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(DomainError::Configuration(format!(
            "{key} must be a boolean, got {other:?}"
        ))),
    }
}
