use crate::traits::FileSystem;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory under the home directory holding kubewiz config and cluster workspaces
pub const KUBEWIZ_HOME: &str = ".kubewiz";

/// Name of the optional defaults file inside [`KUBEWIZ_HOME`]
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Roles bound to a newly created cluster service account, in binding order
pub const REQUIRED_SERVICE_ACCOUNT_ROLES: &[&str] = &[
    "roles/compute.instanceAdmin.v1",
    "roles/iam.serviceAccountActor",
    "roles/container.clusterAdmin",
];

/// Permission the caller needs before we try to create and bind a service account
pub const GRANT_PERMISSION: &str = "resourcemanager.projects.setIamPolicy";

/// Immutable defaults injected into the wizard at construction
///
/// Every field can be overridden from a YAML file; unset fields keep the
/// built-in value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardDefaults {
    /// Machine type preselected in the machine type prompt
    pub machine_type: String,

    /// Default answer for the minimum node count prompt
    pub min_nodes: u32,

    /// Default answer for the maximum node count prompt
    pub max_nodes: u32,

    /// Namespace the kubectl context is pointed at after provisioning
    pub namespace: String,

    /// Prefix of the per-cluster service account id
    pub service_account_prefix: String,

    /// Roles bound to a freshly created service account
    pub required_roles: Vec<String>,

    /// Permission checked before creating a service account
    pub grant_permission: String,

    /// Where per-cluster workspaces live (defaults to ~/.kubewiz/clusters)
    pub clusters_dir: Option<PathBuf>,
}

impl Default for WizardDefaults {
    fn default() -> Self {
        Self {
            machine_type: "n1-standard-2".to_string(),
            min_nodes: 3,
            max_nodes: 5,
            namespace: "jx".to_string(),
            service_account_prefix: "jx-".to_string(),
            required_roles: REQUIRED_SERVICE_ACCOUNT_ROLES
                .iter()
                .map(|r| r.to_string())
                .collect(),
            grant_permission: GRANT_PERMISSION.to_string(),
            clusters_dir: None,
        }
    }
}

impl WizardDefaults {
    /// Load defaults from an explicit file, or from ~/.kubewiz/config.yaml when present
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file just means built-in defaults.
    pub fn load(fs: &dyn FileSystem, explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !fs.exists(path) {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Self::from_file(fs, path)
            }
            None => match default_config_path() {
                Some(path) if fs.exists(&path) => Self::from_file(fs, &path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse defaults from a YAML file
    pub fn from_file(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = fs.read_to_string(path)?;
        let defaults: WizardDefaults = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if defaults.min_nodes == 0 || defaults.min_nodes > defaults.max_nodes {
            anyhow::bail!(
                "Invalid node defaults in {}: min_nodes ({}) must be positive and not exceed max_nodes ({})",
                path.display(),
                defaults.min_nodes,
                defaults.max_nodes
            );
        }

        Ok(defaults)
    }

    /// Directory holding one workspace per cluster
    pub fn clusters_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.clusters_dir {
            return Ok(dir.clone());
        }

        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home_dir.join(KUBEWIZ_HOME).join("clusters"))
    }
}

/// ~/.kubewiz/config.yaml, when a home directory is known
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(KUBEWIZ_HOME).join(CONFIG_FILE_NAME))
}
