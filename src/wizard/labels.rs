//! Cluster labels
//!
//! Labels come from the `--labels` flag as `key=value` pairs separated by
//! commas. Everything is lower-cased, keys are validated, and a synthetic
//! `created-by=<user>` entry is appended after the user's own labels.

use super::error::WizardError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Key of the label recording who ran the wizard
pub const CREATED_BY_LABEL: &str = "created-by";

lazy_static! {
    static ref LABEL_KEY: Regex = Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])?$").unwrap();
    static ref DISALLOWED_LABEL_CHARACTERS: Regex = Regex::new(r"[^a-z0-9-]").unwrap();
}

/// A single `key=value` label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub key: String,
    pub value: String,
}

/// Ordered set of labels, user-supplied entries first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelSet {
    entries: Vec<Label>,
}

impl LabelSet {
    /// Parse a comma separated `key=value` list
    ///
    /// Input is lower-cased before validation, so `Foo=Bar` becomes `foo=bar`.
    pub fn parse(raw: &str) -> Result<Self, WizardError> {
        let mut entries: Vec<Label> = Vec::new();

        for pair in raw.to_lowercase().split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }

            let (key, value) = pair.split_once('=').ok_or_else(|| {
                WizardError::InvalidInput(format!("label '{}' is not of the form key=value", pair))
            })?;
            let key = key.trim();

            if !is_valid_label_key(key) {
                return Err(WizardError::InvalidInput(format!(
                    "label name '{}' must begin with a lowercase character ([a-z]), end with a lowercase alphanumeric ([a-z0-9]) and contain only lowercase alphanumerics and dashes",
                    key
                )));
            }

            if entries.iter().any(|l| l.key == key) {
                return Err(WizardError::InvalidInput(format!("label '{}' given more than once", key)));
            }

            entries.push(Label {
                key: key.to_string(),
                value: value.trim().to_string(),
            });
        }

        Ok(Self { entries })
    }

    /// Append `created-by=<sanitized user>` unless the user already set it
    pub fn with_created_by(mut self, username: Option<&str>) -> Self {
        let Some(username) = username.map(sanitize_label).filter(|u| !u.is_empty()) else {
            return self;
        };

        if !self.contains(CREATED_BY_LABEL) {
            self.entries.push(Label {
                key: CREATED_BY_LABEL.to_string(),
                value: username,
            });
        }

        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|l| l.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|l| l.key == key)
            .map(|l| l.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.entries.iter()
    }

    /// `k1=v1,k2=v2`
    pub fn joined(&self) -> String {
        self.entries
            .iter()
            .map(|l| format!("{}={}", l.key, l.value))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The single `--labels=...` argument for the cluster create command, if any
    pub fn to_argument(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(format!("--labels={}", self.joined()))
        }
    }
}

/// Check a (lower-cased) label key
pub fn is_valid_label_key(key: &str) -> bool {
    LABEL_KEY.is_match(key)
}

/// Make an arbitrary string usable as a label value
///
/// Lower-cases and replaces every character outside `[a-z0-9-]` with `-`.
pub fn sanitize_label(value: &str) -> String {
    DISALLOWED_LABEL_CHARACTERS
        .replace_all(&value.to_lowercase(), "-")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_lowercased_and_created_by_appended() {
        let labels = LabelSet::parse("Foo=Bar,Baz=Qux")
            .unwrap()
            .with_created_by(Some("alice"));

        assert_eq!(
            labels.to_argument().as_deref(),
            Some("--labels=foo=bar,baz=qux,created-by=alice")
        );
    }

    #[test]
    fn test_only_created_by_when_no_user_labels() {
        let labels = LabelSet::parse("").unwrap().with_created_by(Some("bob"));
        assert_eq!(labels.joined(), "created-by=bob");
    }

    #[test]
    fn test_no_argument_when_empty() {
        let labels = LabelSet::parse("").unwrap().with_created_by(None);
        assert!(labels.is_empty());
        assert_eq!(labels.to_argument(), None);
    }

    #[test]
    fn test_username_is_sanitized() {
        let labels = LabelSet::parse("team=infra")
            .unwrap()
            .with_created_by(Some("CORP\\Jane.Doe"));
        assert_eq!(labels.get(CREATED_BY_LABEL), Some("corp-jane-doe"));
    }

    #[test]
    fn test_user_created_by_wins() {
        let labels = LabelSet::parse("created-by=ci")
            .unwrap()
            .with_created_by(Some("alice"));
        assert_eq!(labels.joined(), "created-by=ci");
    }

    #[test]
    fn test_whitespace_and_empty_segments_ignored() {
        let labels = LabelSet::parse(" env = prod ,, tier=web,").unwrap();
        assert_eq!(labels.joined(), "env=prod,tier=web");
    }

    #[test]
    fn test_empty_value_allowed() {
        let labels = LabelSet::parse("flag=").unwrap();
        assert_eq!(labels.get("flag"), Some(""));
    }

    #[test]
    fn test_invalid_keys_rejected() {
        for raw in ["1abc=x", "-abc=x", "abc-=x", "a_b=x", "=x"] {
            let result = LabelSet::parse(raw);
            assert!(
                matches!(result, Err(WizardError::InvalidInput(_))),
                "expected {} to be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_missing_equals_rejected() {
        assert!(matches!(
            LabelSet::parse("foo"),
            Err(WizardError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        assert!(LabelSet::parse("a=1,A=2").is_err());
    }

    #[test]
    fn test_valid_keys() {
        assert!(is_valid_label_key("a"));
        assert!(is_valid_label_key("created-by"));
        assert!(is_valid_label_key("k8s-app2"));
        assert!(!is_valid_label_key("Upper"));
    }

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("Alice"), "alice");
        assert_eq!(sanitize_label("first.last@example.com"), "first-last-example-com");
        assert_eq!(sanitize_label(""), "");
    }
}
