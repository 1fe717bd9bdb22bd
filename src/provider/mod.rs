pub mod gcloud;
pub mod kubectl;

pub use gcloud::GcloudProvider;
pub use kubectl::Kubectl;

use crate::wizard::ClusterRequest;
use anyhow::Result;
use std::path::Path;

/// Cloud provider operations the wizard relies on
///
/// Listing calls fail with `WizardError::ProviderQuery`; mutating calls fail
/// with `WizardError::ExternalCommand`.
pub trait CloudProvider {
    /// Binary backing this provider, for requirement checks and messages
    fn binary(&self) -> &str;

    /// Check if the provider CLI is installed and available
    fn check_installed(&self) -> Result<bool>;

    /// Authenticate the current user (interactive)
    fn login(&self) -> Result<()>;

    /// Make a project the active one for later calls
    fn set_project(&self, project_id: &str) -> Result<()>;

    /// Ids of all projects visible to the caller
    fn list_projects(&self) -> Result<Vec<String>>;

    /// Compute zones clusters can be created in
    fn list_zones(&self) -> Result<Vec<String>>;

    /// Machine types offered in a zone
    fn list_machine_types(&self, zone: &str) -> Result<Vec<String>>;

    /// Number of service accounts with exactly this email
    fn count_service_accounts(&self, project_id: &str, email: &str) -> Result<usize>;

    /// Whether the caller holds a permission on the project
    fn has_permission(&self, project_id: &str, permission: &str) -> Result<bool>;

    fn create_service_account(&self, project_id: &str, account_id: &str) -> Result<()>;

    /// Bind a project level role to a service account
    fn bind_role(&self, project_id: &str, email: &str, role: &str) -> Result<()>;

    /// Download a new JSON key for a service account
    fn create_service_account_key(&self, email: &str, key_path: &Path) -> Result<()>;

    fn create_cluster(&self, request: &ClusterRequest) -> Result<()>;

    /// Write cluster credentials into the local kubeconfig
    fn get_credentials(&self, request: &ClusterRequest) -> Result<()>;
}
