use std::fmt;

/// Failures that abort a wizard run
#[derive(Debug, Clone, PartialEq)]
pub enum WizardError {
    /// A provider listing call failed or returned output we could not read
    ProviderQuery { query: String, message: String },

    /// The caller may not grant IAM roles, so the service account cannot be set up
    InsufficientPermission { permission: String },

    /// No project could be resolved to create the cluster in
    NoProject(String),

    /// The requested path exists in the wizard but is not built
    NotImplemented(String),

    /// A provisioning command exited unsuccessfully
    ExternalCommand {
        command: String,
        message: String,
        exit_code: Option<i32>,
    },

    /// A flag or an answer failed validation
    InvalidInput(String),

    /// Required tools are missing from PATH
    MissingDependency(Vec<String>),
}

impl fmt::Display for WizardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardError::ProviderQuery { query, message } => {
                write!(f, "Failed to query {}: {}", query, message)
            }
            WizardError::InsufficientPermission { permission } => {
                write!(
                    f,
                    "User does not have the required role '{}' to configure a service account",
                    permission
                )
            }
            WizardError::NoProject(msg) => {
                write!(f, "No Google Cloud project to create the cluster in: {}", msg)
            }
            WizardError::NotImplemented(msg) => {
                write!(f, "Not implemented: {}", msg)
            }
            WizardError::ExternalCommand {
                command,
                message,
                exit_code,
            } => {
                write!(f, "Command '{}' failed", command)?;

                if let Some(code) = exit_code {
                    write!(f, " (exit code {})", code)?;
                }

                if message.is_empty() {
                    Ok(())
                } else {
                    write!(f, ": {}", message)
                }
            }
            WizardError::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
            WizardError::MissingDependency(tools) => {
                write!(
                    f,
                    "Required tools not installed or not available in PATH: {}",
                    tools.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for WizardError {}

/// Find the wizard error behind an `anyhow::Error`, if there is one
pub fn wizard_error(err: &anyhow::Error) -> Option<&WizardError> {
    err.downcast_ref::<WizardError>()
}
