use super::executor::IacExecutor;
use crate::traits::CommandExecutor;
use crate::traits::command::command_line;
use crate::wizard::WizardError;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Binary used when none is configured
pub const DEFAULT_BINARY: &str = "terraform";

/// Terraform (or OpenTofu, which takes the same arguments) executor
pub struct TerraformExecutor {
    command: Arc<dyn CommandExecutor>,
    binary: String,
}

impl TerraformExecutor {
    pub fn new(command: Arc<dyn CommandExecutor>, binary: Option<&str>) -> Self {
        let binary = binary
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BINARY)
            .to_string();

        Self { command, binary }
    }

    fn run_interactive(&self, args: &[&str], working_dir: &Path) -> Result<()> {
        let line = command_line(&self.binary, args);
        let code = self
            .command
            .execute_interactive(&self.binary, args, working_dir)
            .with_context(|| format!("Failed to execute '{}'", line))?;

        if code != 0 {
            return Err(WizardError::ExternalCommand {
                command: line,
                message: String::new(),
                exit_code: Some(code),
            }
            .into());
        }

        Ok(())
    }
}

impl IacExecutor for TerraformExecutor {
    fn check_installed(&self) -> Result<bool> {
        let result = self
            .command
            .execute(&self.binary, &["version"], Path::new("."));

        match result {
            Ok(output) => Ok(output.status.success()),
            Err(_) => Ok(false), // Command not found or failed to execute
        }
    }

    fn init(&self, working_dir: &Path) -> Result<()> {
        self.run_interactive(&["init", "-input=false"], working_dir)
    }

    fn plan(&self, working_dir: &Path, state: &Path, plan_out: &Path) -> Result<()> {
        let state_arg = format!("-state={}", state.display());
        let out_arg = format!("-out={}", plan_out.display());
        self.run_interactive(&["plan", "-input=false", &state_arg, &out_arg], working_dir)
    }

    fn apply(&self, working_dir: &Path, state: &Path, plan: &Path) -> Result<()> {
        let state_arg = format!("-state={}", state.display());
        let plan_arg = plan.display().to_string();
        self.run_interactive(&["apply", "-input=false", &state_arg, &plan_arg], working_dir)
    }

    fn get_name(&self) -> &str {
        &self.binary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockCommandExecutor, MockCommandResult};
    use crate::wizard::error::wizard_error;
    use std::path::PathBuf;

    #[test]
    fn test_default_binary() {
        let executor = TerraformExecutor::new(Arc::new(MockCommandExecutor::new()), None);
        assert_eq!(executor.get_name(), "terraform");

        let executor = TerraformExecutor::new(Arc::new(MockCommandExecutor::new()), Some(""));
        assert_eq!(executor.get_name(), "terraform");

        let executor = TerraformExecutor::new(Arc::new(MockCommandExecutor::new()), Some("tofu"));
        assert_eq!(executor.get_name(), "tofu");
    }

    #[test]
    fn test_plan_and_apply_arguments() {
        let mock = Arc::new(MockCommandExecutor::new());
        let executor = TerraformExecutor::new(mock.clone(), None);
        let dir = PathBuf::from("/w/terraform");
        let state = PathBuf::from("/w/demo.tfstate");
        let plan = PathBuf::from("/w/demo.tfplan");

        executor.init(&dir).unwrap();
        executor.plan(&dir, &state, &plan).unwrap();
        executor.apply(&dir, &state, &plan).unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                "terraform init -input=false",
                "terraform plan -input=false -state=/w/demo.tfstate -out=/w/demo.tfplan",
                "terraform apply -input=false -state=/w/demo.tfstate /w/demo.tfplan",
            ]
        );
    }

    #[test]
    fn test_failed_apply_is_external_command_error() {
        let mock = Arc::new(MockCommandExecutor::with_outputs(vec![MockCommandResult::failed(
            "terraform apply",
            1,
            "",
        )]));
        let executor = TerraformExecutor::new(mock, None);

        let err = executor
            .apply(Path::new("."), Path::new("s.tfstate"), Path::new("p.tfplan"))
            .unwrap_err();

        assert!(matches!(
            wizard_error(&err),
            Some(WizardError::ExternalCommand { exit_code: Some(1), .. })
        ));
    }

    #[test]
    fn test_check_installed() {
        let mock = Arc::new(MockCommandExecutor::with_outputs(vec![MockCommandResult::failed(
            "tofu version",
            127,
            "not found",
        )]));
        let executor = TerraformExecutor::new(mock, Some("tofu"));
        assert!(!executor.check_installed().unwrap());
    }
}
