use crate::context::Context;
use crate::iac::TerraformExecutor;
use crate::provider::{GcloudProvider, Kubectl};
use crate::wizard::{ClusterFlags, HandoffOutcome, Wizard, WizardDefaults, WizardReport};
use anyhow::Result;
use std::path::Path;

/// Handler for `kubewiz gke`
pub struct GkeCommand;

impl GkeCommand {
    pub fn execute(ctx: &Context, flags: &ClusterFlags, config_path: Option<&Path>) -> Result<()> {
        let result = Self::run(ctx, flags, config_path);
        if let Err(err) = &result {
            ctx.output.error(&format!("{:#}", err));
        }
        result
    }

    fn run(ctx: &Context, flags: &ClusterFlags, config_path: Option<&Path>) -> Result<()> {
        let defaults = WizardDefaults::load(&*ctx.fs, config_path)?;

        let provider = GcloudProvider::new(ctx.command.clone());
        let iac = TerraformExecutor::new(ctx.command.clone(), flags.iac_binary.as_deref());
        let kubectl = Kubectl::new(ctx.command.clone());

        let report = Wizard::new(ctx, &provider, &iac, &kubectl, &defaults)
            .with_username(Self::get_current_user())
            .run(flags)?;

        match report {
            Some(report) => Self::print_report(ctx, &report),
            None => ctx.output.dimmed("Cluster creation cancelled"),
        }

        Ok(())
    }

    fn print_report(ctx: &Context, report: &WizardReport) {
        let name = &report.request.name;
        match report.outcome {
            HandoffOutcome::Provisioned => {
                ctx.output.success(&format!("Cluster {} is ready", name));
                ctx.output.key_value("Namespace", &report.request.namespace);
            }
            HandoffOutcome::PlanOnly => {
                ctx.output
                    .warning(&format!("Cluster {} was planned but not created", name));
            }
        }
    }

    fn get_current_user() -> Option<String> {
        let username = whoami::username();
        (!username.is_empty()).then_some(username)
    }
}
