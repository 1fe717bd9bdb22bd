use super::CloudProvider;
use crate::traits::CommandExecutor;
use crate::traits::command::command_line;
use crate::wizard::{ClusterRequest, WizardError};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Arc;

/// Google Cloud provider backed by the gcloud CLI
///
/// Listing calls ask gcloud for machine readable output (`value(...)` or
/// `json`) and parse that, instead of matching human readable messages.
pub struct GcloudProvider {
    command: Arc<dyn CommandExecutor>,
    binary: String,
    working_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ServiceAccountEntry {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct PermissionEntry {
    #[serde(default)]
    name: String,
}

impl GcloudProvider {
    pub fn new(command: Arc<dyn CommandExecutor>) -> Self {
        Self {
            command,
            binary: "gcloud".to_string(),
            working_dir: PathBuf::from("."),
        }
    }

    /// Run a read-only query and return its stdout
    fn query(&self, what: &str, args: &[&str]) -> Result<String> {
        let output = self
            .command
            .execute(&self.binary, args, &self.working_dir)
            .map_err(|e| WizardError::ProviderQuery {
                query: what.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(WizardError::ProviderQuery {
                query: what.to_string(),
                message: failure_message(&output),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a command whose only result is its exit status
    fn run(&self, args: &[&str]) -> Result<()> {
        let line = command_line(&self.binary, args);
        let output = self
            .command
            .execute(&self.binary, args, &self.working_dir)
            .with_context(|| format!("Failed to execute '{}'", line))?;

        if !output.status.success() {
            return Err(WizardError::ExternalCommand {
                command: line,
                message: failure_message(&output),
                exit_code: output.status.code(),
            }
            .into());
        }

        Ok(())
    }

    fn run_owned(&self, args: &[String]) -> Result<()> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&args)
    }
}

impl CloudProvider for GcloudProvider {
    fn binary(&self) -> &str {
        &self.binary
    }

    fn check_installed(&self) -> Result<bool> {
        match self.command.execute(&self.binary, &["--version"], &self.working_dir) {
            Ok(output) => Ok(output.status.success()),
            Err(_) => Ok(false), // Command not found or failed to execute
        }
    }

    fn login(&self) -> Result<()> {
        let args = ["auth", "login", "--brief"];
        let code = self
            .command
            .execute_interactive(&self.binary, &args, &self.working_dir)
            .context("Failed to run gcloud auth login")?;

        if code != 0 {
            return Err(WizardError::ExternalCommand {
                command: command_line(&self.binary, &args),
                message: String::new(),
                exit_code: Some(code),
            }
            .into());
        }

        Ok(())
    }

    fn set_project(&self, project_id: &str) -> Result<()> {
        self.run(&["config", "set", "project", project_id])
    }

    fn list_projects(&self) -> Result<Vec<String>> {
        let out = self.query("projects", &["projects", "list", "--format=value(projectId)"])?;
        Ok(parse_value_list(&out))
    }

    fn list_zones(&self) -> Result<Vec<String>> {
        let out = self.query("zones", &["compute", "zones", "list", "--format=value(name)"])?;
        Ok(parse_value_list(&out))
    }

    fn list_machine_types(&self, zone: &str) -> Result<Vec<String>> {
        let out = self.query(
            "machine types",
            &["compute", "machine-types", "list", "--zones", zone, "--format=value(name)"],
        )?;
        Ok(parse_value_list(&out))
    }

    fn count_service_accounts(&self, project_id: &str, email: &str) -> Result<usize> {
        let filter = format!("email:{}", email);
        let out = self.query(
            "service accounts",
            &[
                "iam",
                "service-accounts",
                "list",
                "--project",
                project_id,
                "--filter",
                &filter,
                "--format=json",
            ],
        )?;

        count_matching_accounts(&out, email).map_err(|e| {
            WizardError::ProviderQuery {
                query: "service accounts".to_string(),
                message: format!("unexpected output: {}", e),
            }
            .into()
        })
    }

    fn has_permission(&self, project_id: &str, permission: &str) -> Result<bool> {
        let resource = format!("//cloudresourcemanager.googleapis.com/projects/{}", project_id);
        let out = self.query(
            "testable permissions",
            &[
                "iam",
                "list-testable-permissions",
                &resource,
                "--filter",
                permission,
                "--format=json",
            ],
        )?;

        permission_listed(&out, permission).map_err(|e| {
            WizardError::ProviderQuery {
                query: "testable permissions".to_string(),
                message: format!("unexpected output: {}", e),
            }
            .into()
        })
    }

    fn create_service_account(&self, project_id: &str, account_id: &str) -> Result<()> {
        self.run(&[
            "iam",
            "service-accounts",
            "create",
            account_id,
            "--project",
            project_id,
            "--display-name",
            account_id,
        ])
    }

    fn bind_role(&self, project_id: &str, email: &str, role: &str) -> Result<()> {
        let member = format!("serviceAccount:{}", email);
        self.run(&[
            "projects",
            "add-iam-policy-binding",
            project_id,
            "--member",
            &member,
            "--role",
            role,
        ])
    }

    fn create_service_account_key(&self, email: &str, key_path: &Path) -> Result<()> {
        let key_path = key_path.to_string_lossy();
        self.run(&[
            "iam",
            "service-accounts",
            "keys",
            "create",
            &key_path,
            "--iam-account",
            email,
        ])
    }

    fn create_cluster(&self, request: &ClusterRequest) -> Result<()> {
        self.run_owned(&cluster_create_args(request))
    }

    fn get_credentials(&self, request: &ClusterRequest) -> Result<()> {
        self.run(&[
            "container",
            "clusters",
            "get-credentials",
            &request.name,
            "--zone",
            &request.zone,
            "--project",
            &request.project_id,
        ])
    }
}

/// Arguments of `gcloud container clusters create` for a request
pub fn cluster_create_args(request: &ClusterRequest) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "container".into(),
        "clusters".into(),
        "create".into(),
        request.name.clone(),
        "--zone".into(),
        request.zone.clone(),
        "--project".into(),
        request.project_id.clone(),
        "--machine-type".into(),
        request.machine_type.clone(),
        "--num-nodes".into(),
        request.nodes.min.to_string(),
        "--enable-autoscaling".into(),
        "--min-nodes".into(),
        request.nodes.min.to_string(),
        "--max-nodes".into(),
        request.nodes.max.to_string(),
    ];

    let optional = [
        ("--disk-size", &request.disk_size),
        ("--image-type", &request.image_type),
        ("--cluster-version", &request.kubernetes_version),
        ("--cluster-ipv4-cidr", &request.cluster_ipv4_cidr),
    ];
    for (flag, value) in optional {
        if let Some(value) = value {
            args.push(flag.to_string());
            args.push(value.clone());
        }
    }

    if request.auto_upgrade {
        args.push("--enable-autoupgrade".into());
    }

    if let Some(labels) = request.labels.to_argument() {
        args.push(labels);
    }

    args
}

/// Parse `--format=value(...)` output into its first column
pub fn parse_value_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Count service accounts in `--format=json` output whose email matches exactly
pub fn count_matching_accounts(stdout: &str, email: &str) -> Result<usize, serde_json::Error> {
    if stdout.trim().is_empty() {
        return Ok(0);
    }

    let accounts: Vec<ServiceAccountEntry> = serde_json::from_str(stdout)?;
    Ok(accounts
        .iter()
        .filter(|a| a.email.eq_ignore_ascii_case(email))
        .count())
}

/// Whether `--format=json` permission output lists the permission
pub fn permission_listed(stdout: &str, permission: &str) -> Result<bool, serde_json::Error> {
    if stdout.trim().is_empty() {
        return Ok(false);
    }

    let permissions: Vec<PermissionEntry> = serde_json::from_str(stdout)?;
    Ok(permissions.iter().any(|p| p.name == permission))
}

fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }

    match output.status.code() {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}
