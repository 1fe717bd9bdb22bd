//! The GKE cluster provisioning wizard
//!
//! A run is strictly sequential: confirm, check tools, log in, resolve the
//! project and every cluster parameter, bootstrap the service account, then
//! hand off to the provisioner. Any error aborts the run.

pub mod config;
pub mod error;
pub mod identity;
pub mod labels;
pub mod names;
pub mod project;
pub mod provision;
pub mod request;
pub mod resolver;

pub use config::WizardDefaults;
pub use error::WizardError;
pub use identity::{IdentityBootstrap, ServiceAccount, ServiceAccountState};
pub use labels::LabelSet;
pub use project::ProjectSelector;
pub use provision::{HandoffOutcome, ProvisioningHandoff};
pub use request::{ClusterFlags, ClusterRequest, NodeBounds, Provisioner};
pub use resolver::{ParameterResolver, PromptSpec};

use crate::context::Context;
use crate::iac::IacExecutor;
use crate::provider::{CloudProvider, Kubectl};
use anyhow::Result;
use request::flag_value;

const EXPERIMENTAL_WARNING: &str =
    "Creating a GKE cluster with terraform is an experimental feature in kubewiz.  Would you like to continue?";

const ZONE_HELP: &str = "The compute zone (e.g. us-central1-a) for the cluster";
const MACHINE_TYPE_HELP: &str = "We recommend a minimum of n1-standard-2, a table of machine descriptions can be found here https://cloud.google.com/kubernetes-engine/docs/concepts/cluster-architecture";
const MIN_NODES_HELP: &str = "We recommend a minimum of 3, the minimum number of nodes to be created in each of the cluster's zones";
const MAX_NODES_HELP: &str = "We recommend at least 5, the maximum number of nodes to be created in each of the cluster's zones";

/// Result of a completed wizard run
#[derive(Debug, Clone, PartialEq)]
pub struct WizardReport {
    pub request: ClusterRequest,
    pub account: ServiceAccount,
    pub account_state: ServiceAccountState,
    pub outcome: HandoffOutcome,
}

/// Drives one cluster creation from flags to a running cluster
pub struct Wizard<'a> {
    ctx: &'a Context,
    provider: &'a dyn CloudProvider,
    iac: &'a dyn IacExecutor,
    kubectl: &'a Kubectl,
    defaults: &'a WizardDefaults,
    username: Option<String>,
}

impl<'a> Wizard<'a> {
    pub fn new(
        ctx: &'a Context,
        provider: &'a dyn CloudProvider,
        iac: &'a dyn IacExecutor,
        kubectl: &'a Kubectl,
        defaults: &'a WizardDefaults,
    ) -> Self {
        Self {
            ctx,
            provider,
            iac,
            kubectl,
            defaults,
            username: None,
        }
    }

    /// The user recorded in the `created-by` label
    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    /// Run the wizard; `None` means the user declined to continue
    pub fn run(&self, flags: &ClusterFlags) -> Result<Option<WizardReport>> {
        let resolver = ParameterResolver::new(&*self.ctx.input);

        if !resolver.confirm(EXPERIMENTAL_WARNING, false)? {
            return Ok(None);
        }

        self.check_requirements(flags.provisioner)?;

        if !flags.skip_login {
            self.provider.login()?;
        }

        let project_id = match flag_value(&flags.project_id) {
            Some(project_id) => project_id.to_string(),
            None => ProjectSelector::new(self.provider, &resolver, &*self.ctx.output).select()?,
        };
        self.provider.set_project(&project_id)?;

        let request = self.resolve_request(&resolver, flags, project_id)?;

        let (account, account_state) =
            IdentityBootstrap::new(self.provider, &*self.ctx.output, self.defaults)
                .ensure(&request.name, &request.project_id)?;

        self.print_summary(&request, &account);

        let handoff = ProvisioningHandoff {
            provider: self.provider,
            iac: self.iac,
            kubectl: self.kubectl,
            fs: &*self.ctx.fs,
            output: &*self.ctx.output,
            resolver: &resolver,
            defaults: self.defaults,
        };
        let outcome = handoff.run(&request, &account, flags.provisioner)?;

        Ok(Some(WizardReport {
            request,
            account,
            account_state,
            outcome,
        }))
    }

    /// Resolve every cluster parameter except the project
    fn resolve_request(
        &self,
        resolver: &ParameterResolver,
        flags: &ClusterFlags,
        project_id: String,
    ) -> Result<ClusterRequest> {
        let name = match flag_value(&flags.cluster_name) {
            Some(name) => name.to_string(),
            None => {
                let name = names::generate_cluster_name();
                self.ctx.output.info(&format!(
                    "No cluster name provided so using a generated one: {}",
                    name
                ));
                name
            }
        };

        let zone = resolver.resolve("zone", flag_value(&flags.zone), || {
            Ok(PromptSpec::select("Google Cloud Zone:", self.provider.list_zones()?)
                .with_help(ZONE_HELP))
        })?;

        let machine_type = resolver.resolve("machine type", flag_value(&flags.machine_type), || {
            Ok(PromptSpec::select(
                "Google Cloud Machine Type:",
                self.provider.list_machine_types(&zone)?,
            )
            .with_default(self.defaults.machine_type.clone())
            .with_help(MACHINE_TYPE_HELP))
        })?;

        let min_nodes = resolver.resolve("minimum number of nodes", flag_value(&flags.min_num_nodes), || {
            Ok(PromptSpec::text("Minimum number of Nodes")
                .with_default(self.defaults.min_nodes.to_string())
                .with_help(MIN_NODES_HELP))
        })?;

        let max_nodes = resolver.resolve("maximum number of nodes", flag_value(&flags.max_num_nodes), || {
            Ok(PromptSpec::text("Maximum number of Nodes")
                .with_default(self.defaults.max_nodes.to_string())
                .with_help(MAX_NODES_HELP))
        })?;

        let nodes = NodeBounds::parse(&min_nodes, &max_nodes)?;

        let labels = LabelSet::parse(flag_value(&flags.labels).unwrap_or_default())?
            .with_created_by(self.username.as_deref());

        let namespace = flag_value(&flags.namespace)
            .unwrap_or(self.defaults.namespace.as_str())
            .to_string();

        Ok(ClusterRequest {
            name,
            project_id,
            zone,
            machine_type,
            nodes,
            disk_size: flag_value(&flags.disk_size).map(str::to_string),
            image_type: flag_value(&flags.image_type).map(str::to_string),
            kubernetes_version: flag_value(&flags.kubernetes_version).map(str::to_string),
            cluster_ipv4_cidr: flag_value(&flags.cluster_ipv4_cidr).map(str::to_string),
            auto_upgrade: flags.auto_upgrade,
            namespace,
            labels,
        })
    }

    /// Make sure every binary this run shells out to is available
    fn check_requirements(&self, provisioner: Provisioner) -> Result<()> {
        let output = &self.ctx.output;
        output.section("Checking requirements");

        let mut checks = vec![
            (self.provider.binary().to_string(), self.provider.check_installed()?),
            ("kubectl".to_string(), self.kubectl.check_installed()?),
        ];
        if provisioner == Provisioner::Terraform {
            checks.push((self.iac.get_name().to_string(), self.iac.check_installed()?));
        }

        let mut missing = Vec::new();
        for (tool, available) in checks {
            output.status_check(&tool, available);
            if !available {
                missing.push(tool);
            }
        }

        if !missing.is_empty() {
            return Err(WizardError::MissingDependency(missing).into());
        }

        Ok(())
    }

    fn print_summary(&self, request: &ClusterRequest, account: &ServiceAccount) {
        let output = &self.ctx.output;
        output.section("Cluster");
        for (key, value) in request.summary() {
            output.key_value(key, &value);
        }
        output.key_value_highlight("Service account", &account.email);
        output.blank();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iac::TerraformExecutor;
    use crate::provider::GcloudProvider;
    use crate::traits::{
        MockCommandExecutor, MockCommandResult, MockFileSystem, MockOutput, MockResponse,
        MockUserInput,
    };
    use crate::wizard::error::wizard_error;
    use std::path::PathBuf;
    use std::sync::Arc;

    const PERMISSION_JSON: &str = r#"[{"name": "resourcemanager.projects.setIamPolicy"}]"#;

    struct Harness {
        executor: Arc<MockCommandExecutor>,
        input: Arc<MockUserInput>,
        output: Arc<MockOutput>,
        ctx: Context,
        defaults: WizardDefaults,
    }

    impl Harness {
        fn new(outputs: Vec<MockCommandResult>, responses: Vec<MockResponse>) -> Self {
            let executor = Arc::new(MockCommandExecutor::with_outputs(outputs));
            let input = Arc::new(MockUserInput::with_responses(responses));
            let output = Arc::new(MockOutput::new());
            let ctx = Context::test_with(
                Arc::new(MockFileSystem::new()),
                input.clone(),
                output.clone(),
                executor.clone(),
            );
            let defaults = WizardDefaults {
                clusters_dir: Some(PathBuf::from("/clusters")),
                ..WizardDefaults::default()
            };

            Self {
                executor,
                input,
                output,
                ctx,
                defaults,
            }
        }

        fn run(&self, flags: &ClusterFlags) -> Result<Option<WizardReport>> {
            let provider = GcloudProvider::new(self.executor.clone());
            let iac = TerraformExecutor::new(self.executor.clone(), None);
            let kubectl = Kubectl::new(self.executor.clone());

            Wizard::new(&self.ctx, &provider, &iac, &kubectl, &self.defaults)
                .with_username(Some("alice".to_string()))
                .run(flags)
        }
    }

    fn all_flags() -> ClusterFlags {
        ClusterFlags {
            cluster_name: Some("fuzzyotter".to_string()),
            project_id: Some("demo".to_string()),
            zone: Some("europe-west1-b".to_string()),
            machine_type: Some("n1-standard-4".to_string()),
            min_num_nodes: Some("2".to_string()),
            max_num_nodes: Some("7".to_string()),
            labels: Some("Foo=Bar,Baz=Qux".to_string()),
            skip_login: true,
            provisioner: Provisioner::Gcloud,
            ..ClusterFlags::default()
        }
    }

    fn existing_account() -> MockCommandResult {
        MockCommandResult::ok(
            "gcloud iam service-accounts list",
            r#"[{"email": "jx-fuzzyotter@demo.iam.gserviceaccount.com"}]"#,
        )
    }

    fn current_context() -> MockCommandResult {
        MockCommandResult::ok("kubectl config current-context", "gke_demo\n")
    }

    #[test]
    fn test_declined_confirmation_is_a_clean_no_op() {
        let harness = Harness::new(Vec::new(), vec![MockResponse::Confirm(false)]);

        let report = harness.run(&all_flags()).unwrap();

        assert!(report.is_none());
        assert!(harness.executor.calls().is_empty());
        assert_eq!(harness.input.prompts_shown(), vec![EXPERIMENTAL_WARNING]);
    }

    #[test]
    fn test_flags_suppress_every_prompt() {
        let harness = Harness::new(
            vec![existing_account(), current_context()],
            vec![MockResponse::Confirm(true)],
        );

        let report = harness.run(&all_flags()).unwrap().unwrap();

        assert_eq!(harness.input.prompts_shown(), vec![EXPERIMENTAL_WARNING]);
        let request = report.request;
        assert_eq!(request.name, "fuzzyotter");
        assert_eq!(request.project_id, "demo");
        assert_eq!(request.zone, "europe-west1-b");
        assert_eq!(request.machine_type, "n1-standard-4");
        assert_eq!(request.nodes, NodeBounds { min: 2, max: 7 });
        assert_eq!(request.namespace, "jx");
        assert_eq!(report.account_state, ServiceAccountState::Existing);
        assert_eq!(report.outcome, HandoffOutcome::Provisioned);

        assert!(!harness.executor.was_called("gcloud projects list"));
        assert!(!harness.executor.was_called("gcloud compute zones list"));
        assert!(!harness.executor.was_called("gcloud compute machine-types list"));
        assert!(!harness.executor.was_called("gcloud auth login"));
        assert!(!harness.executor.was_called("gcloud iam service-accounts create"));
        assert!(harness.executor.was_called("gcloud config set project demo"));
        assert!(harness.executor.calls().iter().any(|c| c.starts_with("gcloud container clusters create fuzzyotter")
            && c.ends_with("--labels=foo=bar,baz=qux,created-by=alice")));
    }

    #[test]
    fn test_prompts_for_missing_values() {
        let harness = Harness::new(
            vec![
                MockCommandResult::ok("gcloud projects list", "only-project\n"),
                MockCommandResult::ok("gcloud compute zones list", "us-central1-a\neurope-west1-b\n"),
                MockCommandResult::ok(
                    "gcloud compute machine-types list --zones europe-west1-b",
                    "n1-standard-2\nn1-standard-4\n",
                ),
                MockCommandResult::ok("gcloud iam service-accounts list", "[]"),
                MockCommandResult::ok("gcloud iam list-testable-permissions", PERMISSION_JSON),
                current_context(),
            ],
            vec![
                MockResponse::Confirm(true),
                MockResponse::Select("europe-west1-b".to_string()),
                MockResponse::Select("n1-standard-2".to_string()),
                MockResponse::Text(String::new()),
                MockResponse::Text("6".to_string()),
            ],
        );
        let flags = ClusterFlags {
            cluster_name: Some("fuzzyotter".to_string()),
            provisioner: Provisioner::Gcloud,
            ..ClusterFlags::default()
        };

        let report = harness.run(&flags).unwrap().unwrap();

        assert_eq!(report.request.project_id, "only-project");
        assert_eq!(report.request.zone, "europe-west1-b");
        assert_eq!(report.request.nodes, NodeBounds { min: 3, max: 6 });
        assert_eq!(report.account_state, ServiceAccountState::Created);
        assert_eq!(harness.input.remaining(), 0);
        assert!(harness.executor.was_called("gcloud auth login --brief"));
        assert!(harness
            .output
            .get_infos()
            .contains(&"Using the only Google Cloud Project only-project to create the cluster".to_string()));
        assert!(!harness
            .input
            .prompts_shown()
            .contains(&"Google Cloud Project:".to_string()));
    }

    #[test]
    fn test_generated_name_is_announced() {
        let mut flags = all_flags();
        flags.cluster_name = None;
        let harness = Harness::new(
            vec![
                MockCommandResult::ok("gcloud iam service-accounts list", "[]"),
                MockCommandResult::ok("gcloud iam list-testable-permissions", PERMISSION_JSON),
                current_context(),
            ],
            vec![MockResponse::Confirm(true)],
        );

        let report = harness.run(&flags).unwrap().unwrap();

        let name = &report.request.name;
        assert!(!name.is_empty());
        assert!(harness.output.get_infos().contains(&format!(
            "No cluster name provided so using a generated one: {}",
            name
        )));
        assert_eq!(report.account.id, format!("jx-{}", name));
    }

    #[test]
    fn test_zone_listing_failure_aborts_before_identity() {
        let mut flags = all_flags();
        flags.zone = None;
        let harness = Harness::new(
            vec![MockCommandResult::failed("gcloud compute zones list", 1, "quota")],
            vec![MockResponse::Confirm(true)],
        );

        let err = harness.run(&flags).unwrap_err();

        assert!(matches!(wizard_error(&err), Some(WizardError::ProviderQuery { .. })));
        assert!(!harness.executor.was_called("gcloud iam"));
    }

    #[test]
    fn test_missing_permission_stops_the_run() {
        let harness = Harness::new(
            vec![
                MockCommandResult::ok("gcloud iam service-accounts list", "[]"),
                MockCommandResult::ok("gcloud iam list-testable-permissions", "[]"),
            ],
            vec![MockResponse::Confirm(true)],
        );

        let err = harness.run(&all_flags()).unwrap_err();

        assert!(matches!(
            wizard_error(&err),
            Some(WizardError::InsufficientPermission { .. })
        ));
        assert!(!harness.executor.was_called("gcloud iam service-accounts create"));
        assert!(!harness.executor.was_called("gcloud container clusters create"));
    }

    #[test]
    fn test_inverted_node_bounds_rejected() {
        let mut flags = all_flags();
        flags.min_num_nodes = Some("9".to_string());
        flags.max_num_nodes = Some("3".to_string());
        let harness = Harness::new(Vec::new(), vec![MockResponse::Confirm(true)]);

        let err = harness.run(&flags).unwrap_err();

        assert!(matches!(wizard_error(&err), Some(WizardError::InvalidInput(_))));
        assert!(!harness.executor.was_called("gcloud iam"));
    }

    #[test]
    fn test_missing_tools_reported() {
        let harness = Harness::new(
            vec![MockCommandResult::failed("terraform version", 127, "")],
            vec![MockResponse::Confirm(true)],
        );
        let mut flags = all_flags();
        flags.provisioner = Provisioner::Terraform;

        let err = harness.run(&flags).unwrap_err();

        assert_eq!(
            wizard_error(&err),
            Some(&WizardError::MissingDependency(vec!["terraform".to_string()]))
        );
        assert!(!harness.executor.was_called("gcloud config"));
    }

    #[test]
    fn test_terraform_provisioner_end_to_end() {
        let harness = Harness::new(
            vec![existing_account(), current_context()],
            vec![MockResponse::Confirm(true), MockResponse::Confirm(true)],
        );
        let mut flags = all_flags();
        flags.provisioner = Provisioner::Terraform;

        let report = harness.run(&flags).unwrap().unwrap();

        assert_eq!(report.outcome, HandoffOutcome::Provisioned);
        assert!(harness.executor.was_called("terraform apply"));
        assert!(!harness.executor.was_called("gcloud container clusters create"));
    }
}
