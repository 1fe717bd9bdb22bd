use crate::traits::CommandExecutor;
use crate::traits::command::command_line;
use crate::wizard::WizardError;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Thin wrapper over kubectl for pointing the current context at a namespace
pub struct Kubectl {
    command: Arc<dyn CommandExecutor>,
    working_dir: PathBuf,
}

impl Kubectl {
    pub fn new(command: Arc<dyn CommandExecutor>) -> Self {
        Self {
            command,
            working_dir: PathBuf::from("."),
        }
    }

    pub fn check_installed(&self) -> Result<bool> {
        match self
            .command
            .execute("kubectl", &["version", "--client"], &self.working_dir)
        {
            Ok(output) => Ok(output.status.success()),
            Err(_) => Ok(false),
        }
    }

    /// Name of the current kubeconfig context
    pub fn current_context(&self) -> Result<String> {
        let args = ["config", "current-context"];
        let output = self
            .command
            .execute("kubectl", &args, &self.working_dir)
            .context("Failed to execute kubectl")?;

        let context = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() || context.is_empty() {
            return Err(WizardError::ExternalCommand {
                command: command_line("kubectl", &args),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                exit_code: output.status.code(),
            }
            .into());
        }

        Ok(context)
    }

    /// Make `namespace` the default namespace of `context`
    pub fn set_namespace(&self, context: &str, namespace: &str) -> Result<()> {
        let args = ["config", "set-context", context, "--namespace", namespace];
        let output = self
            .command
            .execute("kubectl", &args, &self.working_dir)
            .context("Failed to execute kubectl")?;

        if !output.status.success() {
            return Err(WizardError::ExternalCommand {
                command: command_line("kubectl", &args),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                exit_code: output.status.code(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockCommandExecutor, MockCommandResult};

    #[test]
    fn test_current_context_trimmed() {
        let executor = Arc::new(MockCommandExecutor::with_outputs(vec![MockCommandResult::ok(
            "kubectl config current-context",
            "gke_demo_us-central1-a_fuzzyotter\n",
        )]));
        let kubectl = Kubectl::new(executor);

        assert_eq!(
            kubectl.current_context().unwrap(),
            "gke_demo_us-central1-a_fuzzyotter"
        );
    }

    #[test]
    fn test_empty_current_context_is_error() {
        let kubectl = Kubectl::new(Arc::new(MockCommandExecutor::new()));
        assert!(kubectl.current_context().is_err());
    }

    #[test]
    fn test_set_namespace_command() {
        let executor = Arc::new(MockCommandExecutor::new());
        let kubectl = Kubectl::new(executor.clone());

        kubectl.set_namespace("ctx", "jx").unwrap();
        assert_eq!(executor.calls(), vec!["kubectl config set-context ctx --namespace jx"]);
    }
}
