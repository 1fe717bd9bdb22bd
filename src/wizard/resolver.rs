//! Parameter resolution
//!
//! Deciding where a value comes from is kept apart from asking for it:
//! [`resolve_field`] turns "flag value + how we would prompt" into a
//! [`Resolution`], and [`ParameterResolver`] renders the prompts through
//! [`UserInput`].

use super::error::WizardError;
use crate::traits::UserInput;
use anyhow::{Context, Result};

/// What kind of prompt a field needs
#[derive(Debug, Clone, PartialEq)]
pub enum PromptKind {
    /// Free text input
    Text,
    /// Single choice out of an ordered option list
    Select(Vec<String>),
}

/// Everything needed to ask for one field
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    pub message: String,
    pub kind: PromptKind,
    pub default: Option<String>,
    pub help: Option<String>,
}

impl PromptSpec {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: PromptKind::Text,
            default: None,
            help: None,
        }
    }

    pub fn select(message: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            message: message.into(),
            kind: PromptKind::Select(options),
            default: None,
            help: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// The default actually offered to the user
    ///
    /// A select default that is not among the options is dropped.
    pub fn effective_default(&self) -> Option<&str> {
        let default = self.default.as_deref()?;
        match &self.kind {
            PromptKind::Text => Some(default),
            PromptKind::Select(options) => options.iter().any(|o| o == default).then_some(default),
        }
    }
}

/// Outcome of deciding how a field gets its value
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The flag supplied the value; no prompt is shown
    Resolved(String),
    /// The user has to be asked
    Prompt(PromptSpec),
}

/// Decide how a field is resolved
///
/// `prompt` is only evaluated when no flag value is present, so option
/// lists fetched from the provider are never fetched for flagged fields.
pub fn resolve_field<F>(flag: Option<&str>, prompt: F) -> Result<Resolution>
where
    F: FnOnce() -> Result<PromptSpec>,
{
    match flag.filter(|v| !v.is_empty()) {
        Some(value) => Ok(Resolution::Resolved(value.to_string())),
        None => Ok(Resolution::Prompt(prompt()?)),
    }
}

/// An empty answer keeps the default
pub fn answer_or_default(answer: String, default: Option<&str>) -> String {
    if answer.trim().is_empty() {
        default.unwrap_or_default().to_string()
    } else {
        answer.trim().to_string()
    }
}

/// Renders prompts for unresolved fields
pub struct ParameterResolver<'a> {
    input: &'a dyn UserInput,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(input: &'a dyn UserInput) -> Self {
        Self { input }
    }

    /// Resolve a required field from its flag or by prompting
    pub fn resolve<F>(&self, field: &str, flag: Option<&str>, prompt: F) -> Result<String>
    where
        F: FnOnce() -> Result<PromptSpec>,
    {
        let value = match resolve_field(flag, prompt)? {
            Resolution::Resolved(value) => value,
            Resolution::Prompt(spec) => self.ask(&spec)?,
        };

        if value.is_empty() {
            return Err(WizardError::InvalidInput(format!("{} must not be empty", field)).into());
        }

        Ok(value)
    }

    /// Show one prompt and return the answer
    pub fn ask(&self, spec: &PromptSpec) -> Result<String> {
        let default = spec.effective_default();
        let help = spec.help.as_deref();

        match &spec.kind {
            PromptKind::Text => {
                let answer = self
                    .input
                    .text(&spec.message, default, help)
                    .with_context(|| format!("Failed to read '{}'", spec.message))?;
                Ok(answer_or_default(answer, default))
            }
            PromptKind::Select(options) => {
                if options.is_empty() {
                    return Err(WizardError::ProviderQuery {
                        query: spec.message.trim_end_matches(':').to_string(),
                        message: "no options available".to_string(),
                    }
                    .into());
                }

                self.input
                    .select(&spec.message, options.clone(), default, help)
                    .with_context(|| format!("Failed to read '{}'", spec.message))
            }
        }
    }

    /// Ask a yes/no question
    pub fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        self.input
            .confirm(message, default)
            .with_context(|| format!("Failed to read '{}'", message))
    }
}
