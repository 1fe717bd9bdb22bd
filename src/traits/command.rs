use anyhow::Result;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Trait for executing system commands, allowing for mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments and capture its output
    fn execute(&self, command: &str, args: &[&str], working_dir: &Path) -> Result<Output>;

    /// Execute a command interactively (inherits stdin/stdout/stderr)
    fn execute_interactive(&self, command: &str, args: &[&str], working_dir: &Path) -> Result<i32>;
}

/// Real command executor using std::process::Command
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, command: &str, args: &[&str], working_dir: &Path) -> Result<Output> {
        let output = Command::new(command)
            .args(args)
            .current_dir(working_dir)
            .output()?;

        Ok(output)
    }

    fn execute_interactive(&self, command: &str, args: &[&str], working_dir: &Path) -> Result<i32> {
        let mut child = Command::new(command)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        let status = child.wait()?;
        Ok(status.code().unwrap_or(-1))
    }
}

/// Render a command and its arguments as a single line, as a user would type it
pub fn command_line(command: &str, args: &[&str]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}

/// Mock command executor for testing
///
/// Results are matched against the full command line by prefix, so
/// `"gcloud projects list"` answers `gcloud projects list --format=value(projectId)`.
/// A matched result is consumed; unmatched commands succeed with empty output.
/// Every invocation is recorded so tests can assert what was (not) run.
#[cfg(test)]
pub struct MockCommandExecutor {
    outputs: std::sync::Mutex<Vec<MockCommandResult>>,
    calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
#[derive(Clone, Debug)]
pub struct MockCommandResult {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[cfg(test)]
impl MockCommandResult {
    pub fn ok(command: &str, stdout: &str) -> Self {
        Self {
            command: command.to_string(),
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn failed(command: &str, exit_code: i32, stderr: &str) -> Self {
        Self {
            command: command.to_string(),
            exit_code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

#[cfg(test)]
impl MockCommandExecutor {
    pub fn new() -> Self {
        Self {
            outputs: std::sync::Mutex::new(Vec::new()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_outputs(outputs: Vec<MockCommandResult>) -> Self {
        Self {
            outputs: std::sync::Mutex::new(outputs),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn add_output(&self, output: MockCommandResult) {
        let mut outputs = self.outputs.lock().unwrap();
        outputs.push(output);
    }

    /// All command lines executed so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether any executed command line starts with the given prefix
    pub fn was_called(&self, prefix: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .any(|call| call.starts_with(prefix))
    }

    fn take(&self, command: &str, args: &[&str]) -> Option<MockCommandResult> {
        let line = command_line(command, args);
        self.calls.lock().unwrap().push(line.clone());

        let mut outputs = self.outputs.lock().unwrap();
        outputs
            .iter()
            .position(|r| line.starts_with(&r.command))
            .map(|index| outputs.remove(index))
    }
}

#[cfg(test)]
impl Default for MockCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, command: &str, args: &[&str], _working_dir: &Path) -> Result<Output> {
        if let Some(mock_result) = self.take(command, args) {
            return Ok(Output {
                status: create_exit_status(mock_result.exit_code),
                stdout: mock_result.stdout.into_bytes(),
                stderr: mock_result.stderr.into_bytes(),
            });
        }

        // Default: successful empty output
        Ok(Output {
            status: create_exit_status(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }

    fn execute_interactive(&self, command: &str, args: &[&str], _working_dir: &Path) -> Result<i32> {
        if let Some(mock_result) = self.take(command, args) {
            return Ok(mock_result.exit_code);
        }

        // Default: success
        Ok(0)
    }
}

#[cfg(test)]
fn create_exit_status(code: i32) -> std::process::ExitStatus {
    // ExitStatus can't be constructed directly; on unix the raw value is a wait status
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_mock_executor_matches_by_prefix() {
        let executor = MockCommandExecutor::with_outputs(vec![MockCommandResult::ok(
            "gcloud projects list",
            "my-project",
        )]);

        let output = executor
            .execute(
                "gcloud",
                &["projects", "list", "--format=value(projectId)"],
                &PathBuf::from("."),
            )
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "my-project");
    }

    #[test]
    fn test_mock_executor_default_success() {
        let executor = MockCommandExecutor::new();
        let output = executor.execute("unknown", &[], &PathBuf::from(".")).unwrap();
        assert!(output.status.success());
    }

    #[test]
    fn test_mock_executor_reports_exit_code() {
        let executor = MockCommandExecutor::with_outputs(vec![MockCommandResult::failed(
            "gcloud",
            2,
            "boom",
        )]);

        let output = executor.execute("gcloud", &["info"], &PathBuf::from(".")).unwrap();
        assert!(!output.status.success());
        #[cfg(unix)]
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_mock_executor_interactive() {
        let executor = MockCommandExecutor::with_outputs(vec![MockCommandResult::failed(
            "terraform apply",
            42,
            "",
        )]);

        let code = executor
            .execute_interactive("terraform", &["apply", "plan.tfplan"], &PathBuf::from("."))
            .unwrap();
        assert_eq!(code, 42);
    }

    #[test]
    fn test_mock_executor_records_calls() {
        let executor = MockCommandExecutor::new();
        executor.execute("gcloud", &["config", "set", "project", "p1"], &PathBuf::from(".")).unwrap();
        executor.execute_interactive("gcloud", &["auth", "login", "--brief"], &PathBuf::from(".")).unwrap();

        assert_eq!(
            executor.calls(),
            vec![
                "gcloud config set project p1".to_string(),
                "gcloud auth login --brief".to_string(),
            ]
        );
        assert!(executor.was_called("gcloud auth login"));
        assert!(!executor.was_called("gcloud iam"));
    }

    #[test]
    fn test_command_line_formatting() {
        assert_eq!(command_line("kubectl", &[]), "kubectl");
        assert_eq!(command_line("kubectl", &["config", "current-context"]), "kubectl config current-context");
    }
}
