//! Component descriptors and load order validation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while declaring components.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Component '{0}' is registered twice")]
    DuplicateComponent(String),

    #[error("Component '{0}' depends on itself")]
    SelfDependency(String),

    #[error("Component name must not be empty")]
    EmptyName,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Static metadata about one page component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Unique key, also the fragment file stem
    pub name: String,
    /// Human readable name
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// Components that must precede this one in a load order
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Animations the page layer associates with this component
    #[serde(default)]
    pub animation_names: BTreeSet<String>,
}

impl ComponentDescriptor {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: String::new(),
            dependencies: Vec::new(),
            animation_names: BTreeSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn with_animations<I, T>(mut self, animations: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.animation_names
            .extend(animations.into_iter().map(Into::into));
        self
    }
}

/// A structural problem found in a proposed load order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderViolation {
    /// Name has no registered descriptor
    UnknownComponent(String),
    /// A dependency of `component` is absent from the order
    MissingDependency { component: String, dependency: String },
    /// A dependency of `component` appears after it
    DependencyOrderViolation { component: String, dependency: String },
}

impl fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownComponent(name) => write!(f, "Unknown component: {}", name),
            Self::MissingDependency {
                component,
                dependency,
            } => write!(f, "Missing dependency: {} requires {}", component, dependency),
            Self::DependencyOrderViolation {
                component,
                dependency,
            } => write!(
                f,
                "Dependency order error: {} must be loaded before {}",
                dependency, component
            ),
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    components: Vec<ComponentDescriptor>,
}

/// Registry of known components.
///
/// Pure data: built once, then only read.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    descriptors: BTreeMap<String, ComponentDescriptor>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from descriptors.
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = ComponentDescriptor>,
    {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Parse a `{ "components": [...] }` catalog.
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: CatalogFile = serde_json::from_str(json)?;
        Self::from_descriptors(catalog.components)
    }

    /// Add a descriptor.
    ///
    /// Dependencies naming unregistered components are accepted here and
    /// reported by [`ComponentRegistry::validate_order`].
    pub fn register(&mut self, descriptor: ComponentDescriptor) -> Result<()> {
        if descriptor.name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if descriptor.dependencies.iter().any(|d| *d == descriptor.name) {
            return Err(RegistryError::SelfDependency(descriptor.name));
        }
        if self.descriptors.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateComponent(descriptor.name));
        }
        self.descriptors.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Look up a descriptor by name.
    pub fn get_descriptor(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.descriptors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Names of components that declare `name` as a dependency.
    pub fn get_dependents(&self, name: &str) -> BTreeSet<String> {
        self.descriptors
            .values()
            .filter(|d| d.dependencies.iter().any(|dep| dep == name))
            .map(|d| d.name.clone())
            .collect()
    }

    /// Names of components associated with an animation.
    pub fn components_with_animation(&self, animation: &str) -> BTreeSet<String> {
        self.descriptors
            .values()
            .filter(|d| d.animation_names.contains(animation))
            .map(|d| d.name.clone())
            .collect()
    }

    /// Check a load order against the declared dependencies.
    ///
    /// Returns every violation found, in order position; an empty list
    /// means the order is valid. Unknown components are not checked for
    /// dependencies.
    pub fn validate_order<S: AsRef<str>>(&self, order: &[S]) -> Vec<OrderViolation> {
        let mut first_position: BTreeMap<&str, usize> = BTreeMap::new();
        for (index, name) in order.iter().enumerate() {
            first_position.entry(name.as_ref()).or_insert(index);
        }

        let mut violations = Vec::new();
        for (index, name) in order.iter().enumerate() {
            let name = name.as_ref();
            let Some(descriptor) = self.get_descriptor(name) else {
                violations.push(OrderViolation::UnknownComponent(name.to_string()));
                continue;
            };

            for dependency in &descriptor.dependencies {
                match first_position.get(dependency.as_str()) {
                    None => violations.push(OrderViolation::MissingDependency {
                        component: name.to_string(),
                        dependency: dependency.clone(),
                    }),
                    Some(&position) if position > index => {
                        violations.push(OrderViolation::DependencyOrderViolation {
                            component: name.to_string(),
                            dependency: dependency.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }
        violations
    }
}
