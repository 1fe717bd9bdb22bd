use super::error::WizardError;
use super::resolver::{ParameterResolver, PromptSpec};
use crate::provider::CloudProvider;
use crate::traits::Output;
use anyhow::Result;

/// Picks the Google Cloud project to create the cluster in
pub struct ProjectSelector<'a> {
    provider: &'a dyn CloudProvider,
    resolver: &'a ParameterResolver<'a>,
    output: &'a dyn Output,
}

impl<'a> ProjectSelector<'a> {
    pub fn new(
        provider: &'a dyn CloudProvider,
        resolver: &'a ParameterResolver<'a>,
        output: &'a dyn Output,
    ) -> Self {
        Self {
            provider,
            resolver,
            output,
        }
    }

    /// Choose among the visible projects
    ///
    /// A single project is used without asking. With none, creating one is
    /// offered but not supported.
    pub fn select(&self) -> Result<String> {
        let projects = self.provider.list_projects()?;

        let project_id = match projects.len() {
            0 => {
                let create = self
                    .resolver
                    .confirm("No existing Google Projects exist, create one now?", true)?;
                if !create {
                    return Err(WizardError::NoProject(
                        "please manually create one and rerun this wizard".to_string(),
                    )
                    .into());
                }
                return Err(WizardError::NotImplemented(
                    "auto creating projects, please manually create one and rerun the wizard"
                        .to_string(),
                )
                .into());
            }
            1 => {
                let project_id = projects[0].clone();
                self.output.info(&format!(
                    "Using the only Google Cloud Project {} to create the cluster",
                    project_id
                ));
                project_id
            }
            _ => self.resolver.ask(
                &PromptSpec::select("Google Cloud Project:", projects)
                    .with_help("Select a Google Project to create the cluster in"),
            )?,
        };

        if project_id.is_empty() {
            return Err(WizardError::NoProject(
                "please manually create one and rerun this wizard".to_string(),
            )
            .into());
        }

        Ok(project_id)
    }
}
