//! Candidate path resolution.
//!
//! Each environment maps to an ordered list of path templates. A template
//! contains a `{name}` placeholder that is replaced by the component name.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, Environment};

pub const NAME_PLACEHOLDER: &str = "{name}";

const DEVELOPMENT_TEMPLATES: &[&str] = &[
    "/src/components/{name}.html",
    "./src/components/{name}.html",
    "/assets/components/{name}.html",
];

const PRODUCTION_TEMPLATES: &[&str] = &[
    "/assets/components/{name}.html",
    "/src/components/{name}.html",
    "./src/components/{name}.html",
];

/// Ordered path templates per environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTemplates {
    pub development: Vec<String>,
    pub production: Vec<String>,
}

impl Default for PathTemplates {
    fn default() -> Self {
        Self {
            development: DEVELOPMENT_TEMPLATES.iter().map(|s| s.to_string()).collect(),
            production: PRODUCTION_TEMPLATES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PathTemplates {
    /// Templates for one environment, most likely first.
    pub fn for_environment(&self, environment: Environment) -> &[String] {
        match environment {
            Environment::Development => &self.development,
            Environment::Production => &self.production,
        }
    }

    /// Expand the templates for a component name.
    pub fn candidates(&self, name: &str, environment: Environment) -> PathCandidateList {
        let mut paths: Vec<String> = Vec::new();
        for template in self.for_environment(environment) {
            let path = template.replace(NAME_PLACEHOLDER, name);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        PathCandidateList {
            name: name.to_string(),
            paths,
        }
    }

    /// Every environment needs at least one template, and every template
    /// must mention the component name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for environment in [Environment::Development, Environment::Production] {
            let templates = self.for_environment(environment);
            if templates.is_empty() {
                return Err(ConfigError::InvalidTemplate(format!(
                    "no templates for {}",
                    environment
                )));
            }
            if let Some(bad) = templates.iter().find(|t| !t.contains(NAME_PLACEHOLDER)) {
                return Err(ConfigError::InvalidTemplate(format!(
                    "'{}' has no {} placeholder",
                    bad, NAME_PLACEHOLDER
                )));
            }
        }
        Ok(())
    }
}

/// Ordered candidate locations for one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCandidateList {
    name: String,
    paths: Vec<String>,
}

impl PathCandidateList {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<'a> IntoIterator for &'a PathCandidateList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}
