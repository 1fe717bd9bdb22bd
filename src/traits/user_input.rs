use anyhow::Result;
#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::Mutex;

/// Options shown per page in select prompts
const PAGE_SIZE: usize = 10;

/// Response type for mock user input
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockResponse {
    Select(String),
    Text(String),
    Confirm(bool),
}

/// Trait for user input operations to enable testing with mocks
pub trait UserInput: Send + Sync {
    /// Display a selection prompt with options, optionally preselecting a default
    fn select(
        &self,
        prompt: &str,
        options: Vec<String>,
        default: Option<&str>,
        help: Option<&str>,
    ) -> Result<String>;

    /// Display a text input prompt
    fn text(&self, prompt: &str, default: Option<&str>, help: Option<&str>) -> Result<String>;

    /// Display a confirmation prompt (yes/no)
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Real user input implementation using inquire crate
pub struct InquireUserInput;

impl UserInput for InquireUserInput {
    fn select(
        &self,
        prompt: &str,
        options: Vec<String>,
        default: Option<&str>,
        help: Option<&str>,
    ) -> Result<String> {
        use inquire::Select;
        let cursor = default
            .and_then(|d| options.iter().position(|o| o == d))
            .unwrap_or(0);
        let mut select = Select::new(prompt, options)
            .with_page_size(PAGE_SIZE)
            .with_starting_cursor(cursor);
        if let Some(help_message) = help {
            select = select.with_help_message(help_message);
        }
        let answer = select.prompt()?;
        Ok(answer)
    }

    fn text(&self, prompt: &str, default: Option<&str>, help: Option<&str>) -> Result<String> {
        use inquire::Text;
        let mut text_prompt = Text::new(prompt);
        if let Some(default_val) = default {
            text_prompt = text_prompt.with_default(default_val);
        }
        if let Some(help_message) = help {
            text_prompt = text_prompt.with_help_message(help_message);
        }
        let answer = text_prompt.prompt()?;
        Ok(answer)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        use inquire::Confirm;
        let answer = Confirm::new(prompt)
            .with_default(default)
            .prompt()?;
        Ok(answer)
    }
}

/// Mock user input implementation for testing
///
/// Answers come from a queue; every prompt message is recorded.
#[cfg(test)]
pub struct MockUserInput {
    responses: Mutex<VecDeque<MockResponse>>,
    prompts: Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockUserInput {
    /// Create new mock with no pre-configured responses
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    /// Create mock with pre-configured responses
    pub fn with_responses(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompt messages shown so far, in order
    pub fn prompts_shown(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of queued responses nobody asked for
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    /// Get the next response from the queue
    fn next_response(&self, prompt: &str) -> Result<MockResponse> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("No more mock responses available for '{}'", prompt))
    }
}

#[cfg(test)]
impl Default for MockUserInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl UserInput for MockUserInput {
    fn select(
        &self,
        prompt: &str,
        options: Vec<String>,
        _default: Option<&str>,
        _help: Option<&str>,
    ) -> Result<String> {
        match self.next_response(prompt)? {
            MockResponse::Select(answer) => {
                // Verify the answer is in the options
                if options.contains(&answer) {
                    Ok(answer)
                } else {
                    anyhow::bail!(
                        "Mock response '{}' is not in the provided options: {:?}",
                        answer,
                        options
                    )
                }
            }
            _ => anyhow::bail!("Expected Select response but got a different type"),
        }
    }

    fn text(&self, prompt: &str, _default: Option<&str>, _help: Option<&str>) -> Result<String> {
        match self.next_response(prompt)? {
            MockResponse::Text(answer) => Ok(answer),
            _ => anyhow::bail!("Expected Text response but got a different type"),
        }
    }

    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        match self.next_response(prompt)? {
            MockResponse::Confirm(answer) => Ok(answer),
            _ => anyhow::bail!("Expected Confirm response but got a different type"),
        }
    }
}
