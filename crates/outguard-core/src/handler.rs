//! Severity-driven error handling policy.
//!
//! | Mode        | Below `Error`           | `Error`            | `Fatal`              |
//! |-------------|-------------------------|--------------------|----------------------|
//! | Strict      | warning hook, continue  | returned           | returned             |
//! | Lenient     | collected, continue     | collected, continue| collected and returned |
//! | Interactive | as strict               | prompter decides   | returned             |
//!
//! Without a [`Prompter`], interactive mode behaves exactly like strict mode.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use outguard_error::{OutputError, Severity, wrap_error};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handling policy applied to each error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Stop on anything at or above `Error`.
    #[default]
    Strict,
    /// Collect everything and stop only on `Fatal`.
    Lenient,
    /// Ask a [`Prompter`] about `Error`-level problems.
    Interactive,
}

impl ErrorMode {
    pub const ALL: [Self; 3] = [Self::Strict, Self::Lenient, Self::Interactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
            Self::Interactive => "interactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "lenient" => Some(Self::Lenient),
            "interactive" => Some(Self::Interactive),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised error mode name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error mode '{0}' (expected strict, lenient or interactive)")]
pub struct UnknownMode(pub String);

impl FromStr for ErrorMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownMode(s.to_string()))
    }
}

/// What an interactive prompt decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Record the error and keep going.
    Continue,
    /// Stop and return the error.
    Abort,
}

/// Hook consulted in interactive mode.
pub trait Prompter: Send + Sync {
    fn decide(&self, error: &OutputError) -> Decision;
}

type WarningHook = dyn Fn(&OutputError) + Send + Sync;

/// Aggregate view of the collected errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub total: usize,
    pub by_code: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub suggestions: Vec<String>,
    /// Errors at `Warning` or below.
    pub fixable: usize,
}

#[derive(Debug, Default)]
struct HandlerState {
    mode: ErrorMode,
    collected: Vec<OutputError>,
}

/// Applies an [`ErrorMode`] to each error and keeps what lenient or
/// interactive handling collected.
///
/// One handler usually serves one output session. All calls take the same
/// lock, so collected errors keep call order.
pub struct ErrorHandler {
    state: Mutex<HandlerState>,
    on_warning: Option<Box<WarningHook>>,
    prompter: Option<Box<dyn Prompter>>,
    /// Held from a prompt until its error is recorded.
    prompt: Mutex<()>,
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new(ErrorMode::default())
    }
}

impl ErrorHandler {
    pub fn new(mode: ErrorMode) -> Self {
        Self {
            state: Mutex::new(HandlerState {
                mode,
                collected: Vec::new(),
            }),
            on_warning: None,
            prompter: None,
            prompt: Mutex::new(()),
        }
    }

    pub fn strict() -> Self {
        Self::new(ErrorMode::Strict)
    }

    pub fn lenient() -> Self {
        Self::new(ErrorMode::Lenient)
    }

    /// Called for errors strict handling lets through.
    #[must_use]
    pub fn with_warning_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&OutputError) + Send + Sync + 'static,
    {
        self.on_warning = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn with_prompter(mut self, prompter: impl Prompter + 'static) -> Self {
        self.prompter = Some(Box::new(prompter));
        self
    }

    pub fn mode(&self) -> ErrorMode {
        self.lock().mode
    }

    pub fn set_mode(&self, mode: ErrorMode) {
        self.lock().mode = mode;
    }

    /// Apply the current policy.
    ///
    /// `Ok(())` means processing may continue; `Err` carries the error the
    /// caller must stop on.
    pub fn handle(&self, error: OutputError) -> Result<(), OutputError> {
        let mut state = self.lock();
        let mode = state.mode;
        match mode {
            ErrorMode::Strict => {
                drop(state);
                self.apply_strict(error)
            }
            ErrorMode::Lenient => {
                tracing::debug!(code = %error.code(), severity = %error.severity(), "collected");
                let fatal = error.severity() == Severity::Fatal;
                if fatal {
                    state.collected.push(error.clone());
                    Err(error)
                } else {
                    state.collected.push(error);
                    Ok(())
                }
            }
            ErrorMode::Interactive => {
                drop(state);
                self.interactive(error)
            }
        }
    }

    /// Handle an optional error of any type. `None` is a no-op.
    ///
    /// Errors that are not already [`OutputError`]s are wrapped first.
    pub fn handle_error<E>(&self, error: Option<E>) -> Result<(), OutputError>
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        match error {
            Some(error) => self.handle(wrap_error(error)),
            None => Ok(()),
        }
    }

    /// Handle the error side of a result. A suppressed error yields `None`.
    pub fn handle_result<T, E>(&self, result: Result<T, E>) -> Result<Option<T>, OutputError>
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(error) => self.handle(wrap_error(error)).map(|()| None),
        }
    }

    fn apply_strict(&self, error: OutputError) -> Result<(), OutputError> {
        if error.severity() >= Severity::Error {
            tracing::error!(code = %error.code(), "{}", error.message());
            return Err(error);
        }
        tracing::warn!(code = %error.code(), "{}", error.message());
        if let Some(hook) = &self.on_warning {
            hook(&error);
        }
        Ok(())
    }

    fn interactive(&self, error: OutputError) -> Result<(), OutputError> {
        let Some(prompter) = &self.prompter else {
            return self.apply_strict(error);
        };
        match error.severity() {
            Severity::Fatal => Err(error),
            Severity::Error => {
                // One prompt at a time; the push happens before the next one.
                let _prompting = self.prompt.lock().unwrap_or_else(PoisonError::into_inner);
                match prompter.decide(&error) {
                    Decision::Continue => {
                        self.lock().collected.push(error);
                        Ok(())
                    }
                    Decision::Abort => Err(error),
                }
            }
            Severity::Info | Severity::Warning => self.apply_strict(error),
        }
    }

    /// Snapshot of the collected errors, oldest first.
    pub fn get_collected_errors(&self) -> Vec<OutputError> {
        self.lock().collected.clone()
    }

    pub fn has_errors(&self) -> bool {
        !self.lock().collected.is_empty()
    }

    /// Whether any collected error is at or above `min`.
    pub fn has_errors_with_severity(&self, min: Severity) -> bool {
        self.lock().collected.iter().any(|e| e.severity() >= min)
    }

    pub fn summary(&self) -> ErrorSummary {
        let state = self.lock();
        let mut summary = ErrorSummary {
            total: state.collected.len(),
            ..ErrorSummary::default()
        };
        for error in &state.collected {
            *summary.by_code.entry(error.code().to_string()).or_default() += 1;
            *summary.by_severity.entry(error.severity()).or_default() += 1;
            if error.severity().is_fixable() {
                summary.fixable += 1;
            }
            for suggestion in error.suggestions() {
                if !summary.suggestions.contains(suggestion) {
                    summary.suggestions.push(suggestion.clone());
                }
            }
        }
        summary
    }

    /// Drop all collected errors. The mode is kept.
    pub fn clear(&self) {
        self.lock().collected.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HandlerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ErrorHandler")
            .field("mode", &state.mode)
            .field("collected", &state.collected.len())
            .field("has_warning_hook", &self.on_warning.is_some())
            .field("has_prompter", &self.prompter.is_some())
            .finish()
    }
}
