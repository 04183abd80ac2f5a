//! Sequential recipe execution
//!
//! Executes a recipe top to bottom: expand placeholders, tokenize, run the
//! command, route the result through the confirmation gate. The first "no"
//! at a gate aborts the whole run; steps already completed are never rolled
//! back or re-executed.

use super::confirm::{Confirmer, guard};
use super::errors::DeployError;
use super::vars::{Vars, expand};
use super::{Recipe, RecipeStep};
use crate::executor::{CommandResult, CommandRunner, CommandSpec};
use std::time::Instant;

/// Outcome of one executed step
#[derive(Debug, Clone)]
pub struct StepReport {
    /// The step as authored (before placeholder expansion)
    pub step: RecipeStep,

    /// The command that actually ran
    pub command: String,

    /// Result of the execution
    pub result: CommandResult,

    /// True if the step failed and the run continued past the gate
    pub continued_after_failure: bool,
}

/// Summary of a completed recipe run
#[derive(Debug, Clone)]
pub struct RecipeReport {
    /// Recipe name
    pub recipe: String,

    /// Per-step outcomes, in execution order
    pub steps: Vec<StepReport>,
}

impl RecipeReport {
    /// Number of steps that failed but were waved through the gate
    #[must_use]
    pub fn tolerated_failures(&self) -> usize {
        self.steps.iter().filter(|s| s.continued_after_failure).count()
    }
}

/// Executes recipes against a command runner with a confirmation gate
pub struct Sequencer<'a> {
    runner: &'a dyn CommandRunner,
    confirmer: &'a mut dyn Confirmer,
    vars: Vars,
}

impl<'a> Sequencer<'a> {
    /// Creates a sequencer
    pub fn new(runner: &'a dyn CommandRunner, confirmer: &'a mut dyn Confirmer) -> Self {
        Self {
            runner,
            confirmer,
            vars: Vars::new(),
        }
    }

    /// Sets the variables substituted into authored commands
    #[must_use]
    pub fn with_vars(mut self, vars: Vars) -> Self {
        self.vars = vars;
        self
    }

    /// Executes a recipe strictly top to bottom
    ///
    /// Stops at the first transport error or at the first "no" answered at a
    /// gate ([`DeployError::Aborted`]). Effects of steps that already ran
    /// remain in place either way.
    pub fn execute(&mut self, recipe: &Recipe) -> Result<RecipeReport, DeployError> {
        recipe.validate()?;

        tracing::info!(recipe = %recipe.name, steps = recipe.steps.len(), "Starting recipe");

        let start = Instant::now();
        let mut reports = Vec::with_capacity(recipe.steps.len());

        for (i, step) in recipe.steps.iter().enumerate() {
            let command = expand(&step.command, &self.vars);
            let prompt = expand(&step.on_failure, &self.vars);
            let spec = CommandSpec::parse(&command)?;

            tracing::info!(step = i + 1, target = %step.target, command = %spec, "Executing step");

            let result = self.runner.run(step.target, &spec)?;
            let failed = result.is_failure();

            if failed {
                tracing::warn!(step = i + 1, exit_code = result.exit_code, "Step failed");
            }

            guard(&result, &prompt, &mut *self.confirmer)?;

            reports.push(StepReport {
                step: step.clone(),
                command,
                result,
                continued_after_failure: failed,
            });
        }

        tracing::info!(
            recipe = %recipe.name,
            duration_ms = start.elapsed().as_millis(),
            tolerated_failures = reports.iter().filter(|s| s.continued_after_failure).count(),
            "Recipe completed"
        );

        Ok(RecipeReport {
            recipe: recipe.name.clone(),
            steps: reports,
        })
    }

    /// Validates a recipe and logs every step without executing anything
    pub fn dry_run(&self, recipe: &Recipe) -> Result<(), DeployError> {
        recipe.validate()?;

        tracing::info!(recipe = %recipe.name, "Starting dry run");

        for (i, step) in recipe.steps.iter().enumerate() {
            let command = expand(&step.command, &self.vars);
            tracing::info!(
                step = i + 1,
                target = %step.target,
                gated = step.is_gated(),
                "Would execute: {command}"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExecutionTarget, HealthStatus};
    use crate::recipe::ScriptedConfirmer;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Runner that records executed commands and pops scripted exit codes
    struct FakeRunner {
        exit_codes: Mutex<VecDeque<i32>>,
        executed: Mutex<Vec<String>>,
    }

    impl FakeRunner {
        fn with_exit_codes(codes: Vec<i32>) -> Self {
            Self {
                exit_codes: Mutex::new(codes.into()),
                executed: Mutex::new(Vec::new()),
            }
        }

        fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(
            &self,
            _target: ExecutionTarget,
            spec: &CommandSpec,
        ) -> Result<CommandResult, DeployError> {
            self.executed.lock().unwrap().push(spec.rendered());
            let exit_code = self.exit_codes.lock().unwrap().pop_front().unwrap_or(0);
            Ok(CommandResult {
                stdout: String::new(),
                stderr: String::new(),
                exit_code,
                duration: Duration::ZERO,
            })
        }

        fn health_check(&self) -> HealthStatus {
            HealthStatus::Healthy
        }
    }

    fn three_step_recipe() -> Recipe {
        Recipe::new("provision", "")
            .with_step(RecipeStep::sudo("apt-get update", "Couldn't update, continue anyway?"))
            .with_step(RecipeStep::sudo(
                "apt-get -y install postgresql",
                "Couldn't install the database, continue anyway?",
            ))
            .with_step(RecipeStep::remote(
                "mkdir -p {{checkout_dir}}",
                "Couldn't create the checkout, continue anyway?",
            ))
    }

    #[test]
    fn test_all_steps_run_on_success() {
        let runner = FakeRunner::with_exit_codes(vec![0, 0, 0]);
        let mut confirmer = ScriptedConfirmer::always(false);
        let vars = Vars::new().with("checkout_dir", "/srv/myapp");

        let report = Sequencer::new(&runner, &mut confirmer)
            .with_vars(vars)
            .execute(&three_step_recipe())
            .unwrap();

        assert_eq!(report.steps.len(), 3);
        assert_eq!(report.tolerated_failures(), 0);
        assert!(confirmer.prompts().is_empty());
        assert_eq!(runner.executed()[2], "mkdir -p /srv/myapp");
    }

    #[test]
    fn test_abort_stops_before_subsequent_steps() {
        // Step 1 fails and the operator answers "no": steps 2 and 3 never run.
        let runner = FakeRunner::with_exit_codes(vec![1]);
        let mut confirmer = ScriptedConfirmer::always(false);

        let outcome = Sequencer::new(&runner, &mut confirmer).execute(&three_step_recipe());

        assert_eq!(outcome.unwrap_err(), DeployError::Aborted);
        assert_eq!(runner.executed().len(), 1);
        assert_eq!(confirmer.prompts().len(), 1);
    }

    #[test]
    fn test_yes_continues_past_failed_step() {
        let runner = FakeRunner::with_exit_codes(vec![0, 1, 0]);
        let mut confirmer = ScriptedConfirmer::always(true);

        let report = Sequencer::new(&runner, &mut confirmer)
            .execute(&three_step_recipe())
            .unwrap();

        assert_eq!(report.steps.len(), 3);
        assert_eq!(report.tolerated_failures(), 1);
        assert!(report.steps[1].continued_after_failure);
    }

    #[test]
    fn test_failing_step_gates_once_without_reexecuting_earlier_steps() {
        // Re-running against a host where step 3's artifact already exists:
        // only step 3 fails, the gate fires exactly once for it, and steps 1
        // and 2 are not executed again afterwards.
        let runner = FakeRunner::with_exit_codes(vec![0, 0, 1]);
        let mut confirmer = ScriptedConfirmer::always(true);

        Sequencer::new(&runner, &mut confirmer)
            .execute(&three_step_recipe())
            .unwrap();

        assert_eq!(confirmer.prompts().len(), 1);
        assert!(confirmer.prompts()[0].contains("checkout"));
        assert_eq!(runner.executed().len(), 3);
    }

    #[test]
    fn test_unguarded_failure_is_tolerated_silently() {
        let recipe = Recipe::new("tolerant", "")
            .with_step(RecipeStep::unguarded(ExecutionTarget::Local, "git init"))
            .with_step(RecipeStep::local("echo done", "Continue?"));
        let runner = FakeRunner::with_exit_codes(vec![1, 0]);
        let mut confirmer = ScriptedConfirmer::always(false);

        let report = Sequencer::new(&runner, &mut confirmer).execute(&recipe).unwrap();

        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.tolerated_failures(), 1);
        assert!(confirmer.prompts().is_empty());
    }

    #[test]
    fn test_prompt_placeholders_are_expanded() {
        let recipe = Recipe::new("gated", "").with_step(RecipeStep::sudo(
            "supervisorctl restart {{project}}",
            "Couldn't restart {{project}}, continue anyway?",
        ));
        let runner = FakeRunner::with_exit_codes(vec![1]);
        let mut confirmer = ScriptedConfirmer::always(true);

        Sequencer::new(&runner, &mut confirmer)
            .with_vars(Vars::new().with("project", "myapp"))
            .execute(&recipe)
            .unwrap();

        assert_eq!(confirmer.prompts(), ["Couldn't restart myapp, continue anyway?"]);
    }

    #[test]
    fn test_invalid_recipe_rejected_before_any_execution() {
        let recipe = Recipe::new("bad", "").with_step(RecipeStep::local("echo 'oops", "?"));
        let runner = FakeRunner::with_exit_codes(vec![]);
        let mut confirmer = ScriptedConfirmer::always(true);

        let outcome = Sequencer::new(&runner, &mut confirmer).execute(&recipe);

        assert!(matches!(outcome, Err(DeployError::Validation(_))));
        assert!(runner.executed().is_empty());
    }

    #[test]
    fn test_dry_run_executes_nothing() {
        let runner = FakeRunner::with_exit_codes(vec![]);
        let mut confirmer = ScriptedConfirmer::always(false);

        Sequencer::new(&runner, &mut confirmer)
            .dry_run(&three_step_recipe())
            .unwrap();

        assert!(runner.executed().is_empty());
    }
}
