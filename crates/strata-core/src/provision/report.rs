//! Per-step outcome reporting for provisioning runs.

use serde::Serialize;

/// A stage of the provisioning state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Reinstall of the package's head environment copy.
    HeadInstall,
    /// Install of a companion's head copy into the primary's latest tagged
    /// environment.
    HeadIntoLatest,
    /// Creation of the tagged environment as a clone of the head
    /// environment.
    CloneEnv,
    /// Install of the primary at the released tag.
    InstallTagged,
    /// Install of companion head copies into the tagged environment.
    InstallCompanions,
    /// Hard-linking of activation hooks from the head environment.
    LinkHooks,
    /// Creation and group hand-over of the output directories.
    ProvisionDirs,
}

impl Step {
    pub fn describe(&self) -> &'static str {
        match self {
            Step::HeadInstall => "head install",
            Step::HeadIntoLatest => "head into latest tagged environment",
            Step::CloneEnv => "clone environment",
            Step::InstallTagged => "install tagged package",
            Step::InstallCompanions => "install companions",
            Step::LinkHooks => "link activation hooks",
            Step::ProvisionDirs => "provision output directories",
        }
    }
}

/// What a step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// The step changed external state.
    Changed,
    /// The desired state was already in place.
    AlreadyDone,
    /// The step did not apply to this run.
    Skipped,
}

/// One executed step with its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub outcome: StepOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Everything a provisioning run did, in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    /// Package the run was invoked for.
    pub package: String,
    /// Latest tag of the primary, once resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Tagged environment the run targeted, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    pub steps: Vec<StepReport>,
}

impl ProvisionReport {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            tag: None,
            environment: None,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, step: Step, outcome: StepOutcome) {
        self.steps.push(StepReport {
            step,
            outcome,
            detail: None,
        });
    }

    pub fn record_with(&mut self, step: Step, outcome: StepOutcome, detail: impl Into<String>) {
        self.steps.push(StepReport {
            step,
            outcome,
            detail: Some(detail.into()),
        });
    }

    /// Outcome of a step, if the run reached it.
    pub fn outcome_of(&self, step: Step) -> Option<StepOutcome> {
        self.steps
            .iter()
            .find(|report| report.step == step)
            .map(|report| report.outcome)
    }

    /// Whether any step changed external state.
    pub fn changed(&self) -> bool {
        self.steps
            .iter()
            .any(|report| report.outcome == StepOutcome::Changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_of_finds_recorded_steps() {
        let mut report = ProvisionReport::new("pax");
        report.record(Step::HeadInstall, StepOutcome::Changed);
        report.record_with(Step::CloneEnv, StepOutcome::AlreadyDone, "already provisioned");

        assert_eq!(report.outcome_of(Step::HeadInstall), Some(StepOutcome::Changed));
        assert_eq!(
            report.outcome_of(Step::CloneEnv),
            Some(StepOutcome::AlreadyDone)
        );
        assert_eq!(report.outcome_of(Step::LinkHooks), None);
    }

    #[test]
    fn changed_requires_a_changing_step() {
        let mut report = ProvisionReport::new("pax");
        report.record(Step::CloneEnv, StepOutcome::AlreadyDone);
        assert!(!report.changed());

        report.record(Step::ProvisionDirs, StepOutcome::Changed);
        assert!(report.changed());
    }
}
