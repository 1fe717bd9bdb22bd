//! Per-cluster Terraform workspace
//!
//! ```text
//! <clusters_dir>/<name>/
//!     jx-<name>.key.json
//!     <name>.tfstate
//!     <name>.tfplan
//!     terraform/
//!         main.tf
//!         variables.tf
//!         outputs.tf
//!         terraform.tfvars
//! ```

use crate::traits::FileSystem;
use crate::wizard::ClusterRequest;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use serde_json::json;
use std::path::{Path, PathBuf};

const MAIN_TF: &str = include_str!("templates/main.tf");
const VARIABLES_TF: &str = include_str!("templates/variables.tf");
const OUTPUTS_TF: &str = include_str!("templates/outputs.tf");
const TFVARS_TEMPLATE: &str = include_str!("templates/terraform.tfvars.hbs");

/// Paths making up one cluster's workspace
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterWorkspace {
    root: PathBuf,
    name: String,
    account_id: String,
}

impl ClusterWorkspace {
    pub fn new(clusters_dir: &Path, cluster_name: &str, account_id: &str) -> Self {
        Self {
            root: clusters_dir.join(cluster_name),
            name: cluster_name.to_string(),
            account_id: account_id.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn terraform_dir(&self) -> PathBuf {
        self.root.join("terraform")
    }

    pub fn key_path(&self) -> PathBuf {
        self.root.join(format!("{}.key.json", self.account_id))
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(format!("{}.tfstate", self.name))
    }

    pub fn plan_path(&self) -> PathBuf {
        self.root.join(format!("{}.tfplan", self.name))
    }
}

/// Renders the Terraform configuration for a cluster request
pub struct WorkspaceRenderer {
    handlebars: Handlebars<'static>,
}

impl WorkspaceRenderer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(escape_hcl_string);
        handlebars
            .register_template_string("tfvars", TFVARS_TEMPLATE)
            .context("Failed to register terraform.tfvars template")?;

        Ok(Self { handlebars })
    }

    /// Render terraform.tfvars
    pub fn render_tfvars(
        &self,
        request: &ClusterRequest,
        service_account: &str,
        key_path: &Path,
        generated_at: DateTime<Utc>,
    ) -> Result<String> {
        let labels: Vec<_> = request.labels.iter().collect();
        let data = json!({
            "generated_at": generated_at.to_rfc3339(),
            "project": request.project_id,
            "zone": request.zone,
            "name": request.name,
            "credentials": key_path.display().to_string(),
            "service_account": service_account,
            "machine_type": request.machine_type,
            "min_nodes": request.nodes.min,
            "max_nodes": request.nodes.max,
            "auto_upgrade": request.auto_upgrade,
            "disk_size": request.disk_size,
            "image_type": request.image_type,
            "kubernetes_version": request.kubernetes_version,
            "cluster_ipv4_cidr": request.cluster_ipv4_cidr,
            "labels": labels,
        });

        self.handlebars
            .render("tfvars", &data)
            .context("Failed to render terraform.tfvars")
    }

    /// Write every workspace file, returning the paths written
    pub fn write(
        &self,
        fs: &dyn FileSystem,
        workspace: &ClusterWorkspace,
        request: &ClusterRequest,
        service_account: &str,
    ) -> Result<Vec<PathBuf>> {
        let dir = workspace.terraform_dir();
        fs.create_dir_all(&dir)?;

        let tfvars = self.render_tfvars(request, service_account, &workspace.key_path(), Utc::now())?;
        let files = [
            ("main.tf", MAIN_TF.to_string()),
            ("variables.tf", VARIABLES_TF.to_string()),
            ("outputs.tf", OUTPUTS_TF.to_string()),
            ("terraform.tfvars", tfvars),
        ];

        let mut written = Vec::new();
        for (file_name, contents) in files {
            let path = dir.join(file_name);
            fs.write(&path, &contents)?;
            written.push(path);
        }

        Ok(written)
    }
}

/// Escape special characters in HCL strings
fn escape_hcl_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace("${", "$${")
}
