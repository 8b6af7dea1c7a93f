//! Comparison profiles
//!
//! A profile is the serialisable form of a comparator's configuration:
//! labels, ignore and introspect patterns, paths compared strictly by
//! position, and the member policy. Every field is optional.
//!
//! ```json
//! {
//!   "label1": "car1",
//!   "label2": "car2",
//!   "ignore": [".*priority"],
//!   "introspect": [".*parent"],
//!   "positional": ["history"],
//!   "member_policy": "shared_only"
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::classify::{Classifier, DefaultClassifier};
use crate::engine::{SmartCompare, DEFAULT_LABEL1, DEFAULT_LABEL2};
use crate::errors::{ExError, Result};
use crate::introspect::{MemberPolicy, SequenceIntrospector};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareProfile {
    pub label1: Option<String>,
    pub label2: Option<String>,
    pub ignore: Vec<String>,
    pub introspect: Vec<String>,
    pub positional: Vec<String>,
    pub member_policy: Option<MemberPolicy>,
}

impl CompareProfile {
    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON or unknown keys.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `Serialization` if it does not
    /// hold a valid profile.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExError::from(e)
                .with_op("load_profile")
                .with_path(path.display().to_string())
        })?;
        Self::from_json_str(&text).map_err(|e| {
            e.with_op("load_profile")
                .with_path(path.display().to_string())
        })
    }

    /// Build a comparator configured by this profile
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` for the first pattern that fails to compile.
    pub fn build(&self) -> Result<SmartCompare> {
        let classifier =
            DefaultClassifier::new().with_member_policy(self.member_policy.unwrap_or_default());
        let mut sc = SmartCompare::with_classifier(classifier);
        sc.set_labels(
            self.label1.as_deref().unwrap_or(DEFAULT_LABEL1),
            self.label2.as_deref().unwrap_or(DEFAULT_LABEL2),
        );

        let classifier = sc.classifier_mut();
        classifier.ignore_paths(&self.ignore)?;
        // positional paths are registered first so a broader introspect
        // pattern cannot claim them under first-match
        if !self.positional.is_empty() {
            classifier.introspect_paths_with(
                Arc::new(SequenceIntrospector::positional()),
                &self.positional,
            )?;
        }
        classifier.introspect_paths(&self.introspect)?;

        tracing::debug!(
            ignore = self.ignore.len(),
            introspect = self.introspect.len(),
            positional = self.positional.len(),
            "profile applied"
        );
        Ok(sc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;

    #[test]
    fn test_empty_profile_defaults() {
        let profile = CompareProfile::from_json_str("{}").unwrap();
        assert_eq!(profile, CompareProfile::default());

        let sc = profile.build().unwrap();
        assert_eq!(sc.label1(), "object1");
        assert_eq!(sc.label2(), "object2");
    }

    #[test]
    fn test_full_profile() {
        let profile = CompareProfile::from_json_str(
            r#"{
                "label1": "car1",
                "label2": "car2",
                "ignore": [".*priority"],
                "introspect": [".*parent"],
                "positional": ["history"],
                "member_policy": "identical_class_only"
            }"#,
        )
        .unwrap();
        assert_eq!(profile.member_policy, Some(MemberPolicy::IdenticalClassOnly));

        let sc = profile.build().unwrap();
        assert_eq!(sc.label1(), "car1");
        assert!(format!("{:?}", sc.classifier()).contains("member_identical"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = CompareProfile::from_json_str(r#"{"ignored": []}"#).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
    }

    #[test]
    fn test_bad_pattern_fails_build() {
        let profile = CompareProfile {
            introspect: vec!["[".to_string()],
            ..CompareProfile::default()
        };
        let err = profile.build().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidPattern);
    }
}
