//! Confirmation gate
//!
//! The only control-flow decision point in the whole system: when a command
//! fails and its step carries a failure prompt, a human decides whether the
//! run continues or stops. The decision source is pluggable so tests and
//! `--yes` runs never touch a real terminal.

use super::errors::DeployError;
use crate::executor::CommandResult;
use std::collections::VecDeque;

/// Source of continue/abort answers
pub trait Confirmer {
    /// Asks the operator a yes/no question
    fn confirm(&mut self, prompt: &str) -> Result<bool, DeployError>;
}

/// Interactive confirmer backed by the operator's terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirmer;

impl TerminalConfirmer {
    /// Creates a terminal confirmer
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&mut self, prompt: &str) -> Result<bool, DeployError> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| DeployError::Prompt(e.to_string()))
    }
}

/// Non-interactive confirmer with scripted answers
///
/// Used by `--yes` runs and by tests. Queued answers are consumed in order;
/// once drained, the fallback answer is returned. Every prompt shown is
/// recorded for inspection.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConfirmer {
    answers: VecDeque<bool>,
    fallback: bool,
    prompts: Vec<String>,
}

impl ScriptedConfirmer {
    /// Creates a confirmer that always gives the same answer
    #[must_use]
    pub fn always(answer: bool) -> Self {
        Self {
            answers: VecDeque::new(),
            fallback: answer,
            prompts: Vec::new(),
        }
    }

    /// Creates a confirmer with a queue of answers (fallback: "no")
    #[must_use]
    pub fn with_answers(answers: Vec<bool>) -> Self {
        Self {
            answers: answers.into(),
            fallback: false,
            prompts: Vec::new(),
        }
    }

    /// Prompts seen so far, in order
    #[must_use]
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&mut self, prompt: &str) -> Result<bool, DeployError> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or(self.fallback))
    }
}

/// Routes a command result through the confirmation gate
///
/// No-op on success, and on failure when the prompt is empty (the gate is
/// suppressed for explicitly tolerated steps). Otherwise the confirmer is
/// asked: "yes" continues, "no" aborts the whole run.
pub fn guard(
    result: &CommandResult,
    prompt: &str,
    confirmer: &mut dyn Confirmer,
) -> Result<(), DeployError> {
    if result.is_success() || prompt.is_empty() {
        return Ok(());
    }

    tracing::warn!(exit_code = result.exit_code, "Command failed, asking the operator");

    if confirmer.confirm(prompt)? {
        Ok(())
    } else {
        Err(DeployError::Aborted)
    }
}
