//! Component loading and page assembly.
//!
//! This module provides:
//! - Candidate path resolution per environment (`paths`)
//! - Fragment transports (`source`)
//! - The per-loader fragment cache (`cache`)
//!
//! Candidate paths of one component are tried strictly in order; distinct
//! components are loaded concurrently.

pub mod cache;
pub mod paths;
pub mod source;

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::join_all;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::{ConfigError, LoaderConfig};
use crate::defaults;
use crate::dom::selector::{attribute_selector, class_selector};
use crate::dom::{escape_html, Document, DomError, NodeId, Target};

pub use cache::ComponentCache;
pub use paths::{PathCandidateList, PathTemplates};
pub use source::{FetchError, FileSource, FragmentSource, HttpSource, MemorySource, USER_AGENT};

/// Errors raised while loading a component.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Every candidate path failed
    #[error(
        "Failed to load component: {name} - {}",
        .last_error.as_deref().unwrap_or("All paths failed")
    )]
    PathExhausted {
        name: String,
        attempts: usize,
        last_error: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// Fragment substituted for a component that could not be loaded.
pub fn fallback_fragment(name: &str) -> String {
    format!(
        r#"<div class="component-error">Failed to load {}</div>"#,
        escape_html(name)
    )
}

/// Where a reloaded fragment goes.
enum Placement {
    Inside(NodeId),
    Replace(Vec<NodeId>),
}

/// Mark the root elements of an inserted fragment with their component.
fn tag_component_roots<D>(doc: &mut D, roots: Vec<NodeId>, name: &str)
where
    D: Document + ?Sized,
{
    for root in roots {
        match doc.set_attribute(root, defaults::ORIGINAL_COMPONENT_ATTRIBUTE, name) {
            // Text between fragment roots has no attributes.
            Ok(()) | Err(DomError::NotAnElement(_)) => {}
            Err(e) => log::warn!("Could not tag component {}: {}", name, e),
        }
    }
}

/// Progress of a batch load, emitted as each component settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadProgress {
    pub name: String,
    /// Components settled so far, including this one
    pub loaded: usize,
    pub total: usize,
    /// False when the fallback fragment was used
    pub ok: bool,
}

impl LoadProgress {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.loaded as f64 * 100.0 / self.total as f64
    }
}

/// Loads HTML fragments by component name and composes pages from them.
///
/// Each loader owns its cache; construct one per page session and pass it
/// to whatever needs it.
pub struct ComponentLoader<S> {
    source: S,
    config: LoaderConfig,
    templates: PathTemplates,
    cache: ComponentCache,
}

impl ComponentLoader<HttpSource> {
    /// HTTP loader for `config.base_url`.
    pub fn http(config: LoaderConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let base_url = config
            .base_url
            .clone()
            .ok_or(ConfigError::InvalidValue {
                key: "base_url",
                value: String::new(),
            })?;
        Ok(Self::with_config(HttpSource::new(base_url), config))
    }
}

impl ComponentLoader<FileSource> {
    /// Loader reading fragments below a site directory.
    pub fn from_directory(
        root: impl Into<PathBuf>,
        config: LoaderConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(FileSource::new(root), config))
    }
}

impl<S: FragmentSource> ComponentLoader<S> {
    /// Create a loader with the default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, LoaderConfig::default())
    }

    pub fn with_config(source: S, config: LoaderConfig) -> Self {
        let templates = config.templates();
        Self {
            source,
            config,
            templates,
            cache: ComponentCache::new(),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &ComponentCache {
        &self.cache
    }

    /// Candidate paths for `name` in the configured environment.
    pub fn candidates(&self, name: &str) -> PathCandidateList {
        self.templates.candidates(name, self.config.environment)
    }

    /// Load a component, failing when every candidate path fails.
    pub async fn try_load_component(&self, name: &str) -> Result<String> {
        if let Some(html) = self.cache.get(name).await {
            log::debug!("Component '{}' served from cache", name);
            return Ok(html);
        }

        self.cache
            .get_or_try_load(name, || self.fetch_candidates(name))
            .await
    }

    /// Load a component, substituting [`fallback_fragment`] on failure.
    pub async fn load_component(&self, name: &str) -> String {
        self.load_or_fallback(name).await.0
    }

    async fn load_or_fallback(&self, name: &str) -> (String, bool) {
        match self.try_load_component(name).await {
            Ok(html) => (html, true),
            Err(e) => {
                log::error!("Error loading component {}: {}", name, e);
                (fallback_fragment(name), false)
            }
        }
    }

    /// Load many components concurrently.
    ///
    /// Every name is present in the result, mapped to its HTML or to the
    /// fallback fragment.
    pub async fn load_components<N: AsRef<str>>(&self, names: &[N]) -> BTreeMap<String, String> {
        let loads = names.iter().map(|name| async move {
            let name = name.as_ref();
            (name.to_string(), self.load_component(name).await)
        });
        join_all(loads).await.into_iter().collect()
    }

    /// Like [`ComponentLoader::load_components`], reporting each settled
    /// component on `progress`.
    pub async fn load_components_with_progress<N: AsRef<str>>(
        &self,
        names: &[N],
        progress: &mpsc::UnboundedSender<LoadProgress>,
    ) -> BTreeMap<String, String> {
        let total = names.len();
        let settled = AtomicUsize::new(0);
        let settled = &settled;

        let loads = names.iter().map(|name| async move {
            let name = name.as_ref();
            let (html, ok) = self.load_or_fallback(name).await;
            let loaded = settled.fetch_add(1, Ordering::SeqCst) + 1;
            // A dropped receiver only means nobody is watching.
            let _ = progress.send(LoadProgress {
                name: name.to_string(),
                loaded,
                total,
                ok,
            });
            (name.to_string(), html)
        });
        join_all(loads).await.into_iter().collect()
    }

    /// Load a component and make it the content of `target`.
    pub async fn insert_component<'t, D>(
        &self,
        name: &str,
        target: impl Into<Target<'t>>,
        doc: &mut D,
    ) -> std::result::Result<(), DomError>
    where
        D: Document + ?Sized,
    {
        let target = target.into();
        let html = self.load_component(name).await;

        let node = target.resolve(&*doc).map_err(|e| {
            log::error!("Target element not found for component: {} ({})", name, target);
            e
        })?;
        doc.set_inner_html(node, &html)
    }

    /// Replace every placeholder element with its component.
    ///
    /// Placeholders carry the configured marker attribute whose value is
    /// the component name. The inserted root elements are tagged with
    /// `data-original-component` so [`ComponentLoader::reload_component`]
    /// can find them again. Returns the number of placeholders replaced.
    pub async fn load_all_components<D>(&self, doc: &mut D) -> std::result::Result<usize, DomError>
    where
        D: Document + ?Sized,
    {
        let attribute = &self.config.placeholder_attribute;
        let placeholders: Vec<_> = doc
            .query_selector_all(&format!("[{}]", attribute))?
            .into_iter()
            .filter_map(|node| {
                let name = doc.get_attribute(node, attribute).unwrap_or_default();
                if name.trim().is_empty() {
                    log::warn!("Skipping placeholder {} with empty {}", node, attribute);
                    return None;
                }
                Some((node, name.trim().to_string()))
            })
            .collect();

        let loads = placeholders
            .iter()
            .map(|(_, name)| self.load_component(name));
        let fragments = join_all(loads).await;

        let mut replaced = 0;
        for ((node, name), html) in placeholders.into_iter().zip(fragments) {
            let inserted = match doc.replace_with_html(node, &html) {
                Ok(inserted) => inserted,
                // Nested placeholders disappear with their parent.
                Err(e) => {
                    log::warn!("Could not replace placeholder for {}: {}", name, e);
                    continue;
                }
            };
            replaced += 1;
            tag_component_roots(doc, inserted, &name);
        }
        Ok(replaced)
    }

    /// Compose a page from `order` into the element at `target_selector`.
    ///
    /// Fragments are fetched concurrently, joined in `order` with a
    /// newline, and written in a single mutation. A missing container
    /// leaves the document untouched.
    pub async fn build_page<N, D>(
        &self,
        order: &[N],
        target_selector: &str,
        doc: &mut D,
    ) -> std::result::Result<(), DomError>
    where
        N: AsRef<str>,
        D: Document + ?Sized,
    {
        let container = match Target::Selector(target_selector).resolve(&*doc) {
            Ok(node) => node,
            Err(e) => {
                log::error!("Container element {} not found: {}", target_selector, e);
                return Err(e);
            }
        };

        let components = self.load_components(order).await;
        let html = order
            .iter()
            .map(|name| {
                components
                    .get(name.as_ref())
                    .map(String::as_str)
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join("\n");

        doc.set_inner_html(container, &html)
    }

    /// Fetch a component again, ignoring the cache, and put it back into
    /// the page.
    ///
    /// A remaining `[data-component="name"]` placeholder receives the
    /// fragment as its content. Otherwise the elements a previous load
    /// inserted, found by `[data-original-component="name"]` or else by the
    /// `.name` class, are replaced by the fragment. The cache is left as it
    /// was.
    pub async fn reload_component<D>(
        &self,
        name: &str,
        doc: &mut D,
    ) -> std::result::Result<(), DomError>
    where
        D: Document + ?Sized,
    {
        let placeholder = attribute_selector(&self.config.placeholder_attribute, name);
        let placement = match doc.query_selector(&placeholder)? {
            Some(node) => Some(Placement::Inside(node)),
            None => {
                let tagged = doc.query_selector_all(&attribute_selector(
                    defaults::ORIGINAL_COMPONENT_ATTRIBUTE,
                    name,
                ))?;
                if !tagged.is_empty() {
                    Some(Placement::Replace(tagged))
                } else {
                    match class_selector(name) {
                        Some(class) => doc
                            .query_selector(&class)?
                            .map(|node| Placement::Replace(vec![node])),
                        None => None,
                    }
                }
            }
        };
        let Some(placement) = placement else {
            log::warn!("Component element not found: {}", name);
            return Err(DomError::TargetNotFound(placeholder));
        };

        let html = match self.fetch_candidates(name).await {
            Ok(html) => html,
            Err(e) => {
                log::error!("Error reloading component {}: {}", name, e);
                fallback_fragment(name)
            }
        };

        match placement {
            Placement::Inside(node) => doc.set_inner_html(node, &html)?,
            Placement::Replace(roots) => {
                let mut roots = roots.into_iter();
                if let Some(first) = roots.next() {
                    let inserted = doc.replace_with_html(first, &html)?;
                    // Other roots of the previous fragment go away.
                    for stale in roots {
                        if doc.is_attached(stale) {
                            doc.replace_with_html(stale, "")?;
                        }
                    }
                    tag_component_roots(doc, inserted, name);
                }
            }
        }
        log::info!("Reloaded component: {}", name);
        Ok(())
    }

    async fn fetch_candidates(&self, name: &str) -> Result<String> {
        let candidates = self.candidates(name);
        let timeout = self.config.component_timeout();
        let rounds = self.config.retry_attempts.max(1);

        let mut attempts = 0;
        let mut last_error: Option<FetchError> = None;

        for round in 1..=rounds {
            let mut tried = HashSet::new();
            for path in &candidates {
                if !tried.insert(self.source.location(path)) {
                    log::debug!(
                        "Skipping candidate {} for component '{}': location already tried",
                        path,
                        name
                    );
                    continue;
                }
                attempts += 1;
                let result = match tokio::time::timeout(timeout, self.source.fetch(path)).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout {
                        path: path.clone(),
                        timeout_ms: self.config.component_timeout_ms,
                    }),
                };

                match result {
                    Ok(html) => {
                        if self.config.log_component_loading {
                            log::info!("Loaded component '{}' from {}", name, path);
                        } else {
                            log::debug!("Loaded component '{}' from {}", name, path);
                        }
                        return Ok(html);
                    }
                    Err(e) => {
                        log::debug!("Candidate {} for component '{}' failed: {}", path, name, e);
                        last_error = Some(e);
                    }
                }
            }

            if round < rounds {
                log::warn!(
                    "All paths failed for component '{}' (round {} of {}), retrying...",
                    name,
                    round,
                    rounds
                );
            }
        }

        Err(LoadError::PathExhausted {
            name: name.to_string(),
            attempts,
            last_error: last_error.map(|e| e.to_string()),
        })
    }
}
