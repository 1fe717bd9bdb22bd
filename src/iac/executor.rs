use anyhow::Result;
use std::path::Path;

/// Trait for Infrastructure as Code executors (Terraform, OpenTofu)
pub trait IacExecutor {
    /// Check if the IaC executor is installed and available
    /// Typically runs a version command to verify
    fn check_installed(&self) -> Result<bool>;

    /// Initialize providers and modules in the working directory
    fn init(&self, working_dir: &Path) -> Result<()>;

    /// Write a plan for the configuration in `working_dir` to `plan_out`
    /// Runs interactively so the user sees the proposed changes
    fn plan(&self, working_dir: &Path, state: &Path, plan_out: &Path) -> Result<()>;

    /// Apply a previously written plan
    fn apply(&self, working_dir: &Path, state: &Path, plan: &Path) -> Result<()>;

    /// Get the name of this executor (e.g., "terraform", "tofu")
    fn get_name(&self) -> &str;
}
