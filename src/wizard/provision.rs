use super::config::WizardDefaults;
use super::identity::ServiceAccount;
use super::request::{ClusterRequest, Provisioner};
use super::resolver::ParameterResolver;
use crate::iac::{ClusterWorkspace, IacExecutor, WorkspaceRenderer};
use crate::provider::{CloudProvider, Kubectl};
use crate::traits::{FileSystem, Output};
use anyhow::Result;

/// How the handoff ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffOutcome {
    /// The cluster was created and kubectl points at it
    Provisioned,
    /// The user declined to apply the Terraform plan
    PlanOnly,
}

/// Turns a resolved request into a running cluster
pub struct ProvisioningHandoff<'a> {
    pub provider: &'a dyn CloudProvider,
    pub iac: &'a dyn IacExecutor,
    pub kubectl: &'a Kubectl,
    pub fs: &'a dyn FileSystem,
    pub output: &'a dyn Output,
    pub resolver: &'a ParameterResolver<'a>,
    pub defaults: &'a WizardDefaults,
}

impl<'a> ProvisioningHandoff<'a> {
    pub fn run(
        &self,
        request: &ClusterRequest,
        account: &ServiceAccount,
        provisioner: Provisioner,
    ) -> Result<HandoffOutcome> {
        match provisioner {
            Provisioner::Terraform => {
                if !self.terraform(request, account)? {
                    return Ok(HandoffOutcome::PlanOnly);
                }
            }
            Provisioner::Gcloud => {
                self.output.info("Creating cluster...");
                self.provider.create_cluster(request)?;
            }
        }

        self.connect(request)?;
        Ok(HandoffOutcome::Provisioned)
    }

    /// Render the workspace and run init/plan/apply; false when apply is declined
    fn terraform(&self, request: &ClusterRequest, account: &ServiceAccount) -> Result<bool> {
        let workspace =
            ClusterWorkspace::new(&self.defaults.clusters_dir()?, &request.name, &account.id);
        self.fs.create_dir_all(workspace.root())?;

        let key_path = workspace.key_path();
        if self.fs.exists(&key_path) {
            self.output.dimmed(&format!(
                "Using existing service account key {}",
                key_path.display()
            ));
        } else {
            self.output.info(&format!(
                "Downloading service account key to {}",
                key_path.display()
            ));
            self.provider
                .create_service_account_key(&account.email, &key_path)?;
        }

        let renderer = WorkspaceRenderer::new()?;
        let written = renderer.write(self.fs, &workspace, request, &account.email)?;
        self.output.success(&format!(
            "Wrote {} Terraform files to {}",
            written.len(),
            workspace.terraform_dir().display()
        ));

        let dir = workspace.terraform_dir();
        let state = workspace.state_path();
        let plan = workspace.plan_path();

        self.output
            .info(&format!("Running {} init...", self.iac.get_name()));
        self.iac.init(&dir)?;

        self.output
            .info(&format!("Running {} plan...", self.iac.get_name()));
        self.iac.plan(&dir, &state, &plan)?;

        if !self.resolver.confirm("Apply this plan and create the cluster?", true)? {
            self.output.warning(&format!(
                "Plan not applied. The workspace is kept in {}",
                workspace.root().display()
            ));
            return Ok(false);
        }

        self.output
            .info(&format!("Running {} apply...", self.iac.get_name()));
        self.iac.apply(&dir, &state, &plan)?;

        Ok(true)
    }

    /// Fetch credentials and point the current kubectl context at the namespace
    fn connect(&self, request: &ClusterRequest) -> Result<()> {
        self.output.info("Fetching cluster credentials...");
        self.provider.get_credentials(request)?;

        let context = self.kubectl.current_context()?;
        self.kubectl.set_namespace(&context, &request.namespace)?;
        self.output.key_value("Kubernetes context", &context);

        Ok(())
    }
}
