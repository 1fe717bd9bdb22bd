use super::config::WizardDefaults;
use super::error::WizardError;
use crate::provider::CloudProvider;
use crate::traits::Output;
use anyhow::Result;

/// The service account a cluster's nodes and Terraform run as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccount {
    pub id: String,
    pub email: String,
}

impl ServiceAccount {
    /// `<prefix><cluster-name>` in the given project
    pub fn for_cluster(prefix: &str, cluster_name: &str, project_id: &str) -> Self {
        let id = format!("{}{}", prefix, cluster_name);
        let email = format!("{}@{}.iam.gserviceaccount.com", id, project_id);
        Self { id, email }
    }
}

/// Whether the account had to be created on this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAccountState {
    Existing,
    Created,
}

/// Makes sure the cluster service account exists and carries the required roles
pub struct IdentityBootstrap<'a> {
    provider: &'a dyn CloudProvider,
    output: &'a dyn Output,
    defaults: &'a WizardDefaults,
}

impl<'a> IdentityBootstrap<'a> {
    pub fn new(
        provider: &'a dyn CloudProvider,
        output: &'a dyn Output,
        defaults: &'a WizardDefaults,
    ) -> Self {
        Self {
            provider,
            output,
            defaults,
        }
    }

    /// Look the account up and create it when missing
    ///
    /// Creation needs the grant permission; roles are bound one at a time and
    /// the first failure aborts. Roles bound before a failure stay bound.
    pub fn ensure(
        &self,
        cluster_name: &str,
        project_id: &str,
    ) -> Result<(ServiceAccount, ServiceAccountState)> {
        let account = ServiceAccount::for_cluster(
            &self.defaults.service_account_prefix,
            cluster_name,
            project_id,
        );
        self.output
            .info(&format!("Checking for service account {}", account.id));

        if self.provider.count_service_accounts(project_id, &account.email)? > 0 {
            self.output.info("Service Account exists");
            return Ok((account, ServiceAccountState::Existing));
        }

        self.output.info(&format!(
            "Unable to find service account {}, checking if we have enough permission to create",
            account.id
        ));

        let permission = &self.defaults.grant_permission;
        if !self.provider.has_permission(project_id, permission)? {
            return Err(WizardError::InsufficientPermission {
                permission: permission.clone(),
            }
            .into());
        }

        self.output
            .info(&format!("Creating service account {}", account.id));
        self.provider
            .create_service_account(project_id, &account.id)?;

        for role in &self.defaults.required_roles {
            self.output.info(&format!("Assigning role {}", role));
            self.provider.bind_role(project_id, &account.email, role)?;
        }

        self.output
            .success(&format!("Service account {} created", account.email));

        Ok((account, ServiceAccountState::Created))
    }
}
