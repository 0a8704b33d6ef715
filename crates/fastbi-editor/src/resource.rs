//! Configuration resource kinds and documents

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// Kind of configuration a project exposes for editing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Free-form workflow variables
    Variables,
    /// dbt connection profiles
    Profiles,
}

impl ResourceKind {
    /// Last path segment of the resource endpoint
    pub fn path_segment(&self) -> &'static str {
        match self {
            ResourceKind::Variables => "variables",
            ResourceKind::Profiles => "profiles",
        }
    }

    /// Field of the save payload that carries the document
    pub fn payload_field(&self) -> &'static str {
        self.path_segment()
    }

    /// Prefix of the branch names minted for saves
    pub fn branch_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Variables => "cicd_workflow_variables",
            ResourceKind::Profiles => "dbt_project_profiles_config",
        }
    }

    /// Human-readable name used in notifications
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Variables => "project variables",
            ResourceKind::Profiles => "project profiles",
        }
    }

    /// Pull the document out of a fetch response body.
    ///
    /// Variables arrive wrapped as `{"variables": {...}}`, profiles arrive as
    /// the bare mapping. A missing or `null` document is empty.
    pub fn extract_content(&self, body: serde_yaml::Value) -> Option<Mapping> {
        let document = match self {
            ResourceKind::Variables => match body {
                serde_yaml::Value::Mapping(mut wrapper) => {
                    wrapper.remove("variables").unwrap_or(serde_yaml::Value::Null)
                }
                serde_yaml::Value::Null => serde_yaml::Value::Null,
                _ => return None,
            },
            ResourceKind::Profiles => body,
        };

        match document {
            serde_yaml::Value::Mapping(mapping) => Some(mapping),
            serde_yaml::Value::Null => Some(Mapping::new()),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "variables" | "vars" | "params" => Ok(ResourceKind::Variables),
            "profiles" | "profile" => Ok(ResourceKind::Profiles),
            other => Err(format!(
                "unknown resource kind '{}', expected 'variables' or 'profiles'",
                other
            )),
        }
    }
}

/// A project's configuration as fetched from the console API
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    /// Project the configuration belongs to
    pub owner_id: String,
    /// Configuration keys and values
    pub content: Mapping,
}

impl ConfigDocument {
    pub fn new(owner_id: impl Into<String>, content: Mapping) -> Self {
        Self {
            owner_id: owner_id.into(),
            content,
        }
    }
}
