//! Page bootstrap.
//!
//! Composes the page with an explicitly provided loader, then runs the
//! registered features against the composed document.

use std::sync::Arc;

use thiserror::Error;

use crate::defaults;
use crate::dom::{escape_html, Document, DomError};
use crate::loader::{ComponentLoader, FragmentSource};
use crate::registry::{main_page_order, ComponentRegistry};

/// Errors raised by a feature initializer.
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Feature '{feature}' failed: {message}")]
    Failed { feature: String, message: String },

    #[error("Document error: {0}")]
    Dom(#[from] DomError),
}

/// Errors raised while bootstrapping a page.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),
}

pub type Result<T> = std::result::Result<T, BootstrapError>;

/// Behaviour wired onto the composed document.
pub trait Feature: Send + Sync {
    fn name(&self) -> &str;

    fn initialize(&self, doc: &mut dyn Document) -> std::result::Result<(), FeatureError>;
}

/// Marks the first navigation link active when none is.
pub struct NavigationFeature {
    pub link_selector: String,
    pub active_class: String,
}

impl Default for NavigationFeature {
    fn default() -> Self {
        Self {
            link_selector: ".nav-link".to_string(),
            active_class: "active".to_string(),
        }
    }
}

impl Feature for NavigationFeature {
    fn name(&self) -> &str {
        "navigation"
    }

    fn initialize(&self, doc: &mut dyn Document) -> std::result::Result<(), FeatureError> {
        let links = doc.query_selector_all(&self.link_selector)?;
        if links.iter().any(|&link| doc.has_class(link, &self.active_class)) {
            return Ok(());
        }
        if let Some(&first) = links.first() {
            doc.add_class(first, &self.active_class)?;
        }
        Ok(())
    }
}

/// Prepares background videos for autoplay.
pub struct VideoFeature {
    pub selector: String,
}

impl Default for VideoFeature {
    fn default() -> Self {
        Self {
            selector: ".video-bg".to_string(),
        }
    }
}

impl Feature for VideoFeature {
    fn name(&self) -> &str {
        "video"
    }

    fn initialize(&self, doc: &mut dyn Document) -> std::result::Result<(), FeatureError> {
        for video in doc.query_selector_all(&self.selector)? {
            // Browsers only autoplay muted inline video.
            for attribute in ["autoplay", "muted", "playsinline"] {
                doc.set_attribute(video, attribute, "")?;
            }
        }
        Ok(())
    }
}

/// Tags elements for the external animation layer.
///
/// Elements matching `selector` get `pending_class`; those also matching
/// `above_fold` get `immediate_class` so they animate without waiting for
/// a scroll trigger.
pub struct RevealFeature {
    pub selector: String,
    pub above_fold: String,
    pub pending_class: String,
    pub immediate_class: String,
}

impl Default for RevealFeature {
    fn default() -> Self {
        Self {
            selector: "section, header, footer".to_string(),
            above_fold: ".notification-bar, .main-header, .hero-section".to_string(),
            pending_class: "reveal-pending".to_string(),
            immediate_class: "reveal-immediate".to_string(),
        }
    }
}

impl Feature for RevealFeature {
    fn name(&self) -> &str {
        "reveal"
    }

    fn initialize(&self, doc: &mut dyn Document) -> std::result::Result<(), FeatureError> {
        for node in doc.query_selector_all(&self.selector)? {
            doc.add_class(node, &self.pending_class)?;
        }
        for node in doc.query_selector_all(&self.above_fold)? {
            doc.add_class(node, &self.immediate_class)?;
        }
        Ok(())
    }
}

/// Markup shown in the container while components load.
pub fn loading_indicator(text: &str) -> String {
    format!(
        r#"<div class="loading-indicator"><div class="spinner"></div><p>{}</p></div>"#,
        escape_html(text)
    )
}

/// Markup shown in place of the page when bootstrapping fails.
pub fn error_state(message: &str) -> String {
    format!(
        concat!(
            r#"<div class="error-state">"#,
            "<h1>Error Loading Page</h1>",
            "<p>There was an issue loading the page components. Please refresh and try again.</p>",
            "<details><summary>Technical Details</summary><pre>{}</pre></details>",
            "</div>"
        ),
        escape_html(message)
    )
}

/// Builds a page and initializes its features.
pub struct PageBootstrap<S> {
    loader: Arc<ComponentLoader<S>>,
    registry: Option<Arc<ComponentRegistry>>,
    features: Vec<Box<dyn Feature>>,
}

impl<S: FragmentSource> PageBootstrap<S> {
    pub fn new(loader: Arc<ComponentLoader<S>>) -> Self {
        Self {
            loader,
            registry: None,
            features: Vec::new(),
        }
    }

    /// Bootstrap with the navigation, video and reveal features.
    pub fn with_default_features(loader: Arc<ComponentLoader<S>>) -> Self {
        Self::new(loader)
            .with_feature(NavigationFeature::default())
            .with_feature(VideoFeature::default())
            .with_feature(RevealFeature::default())
    }

    /// Registry used to report load order problems before building.
    pub fn with_registry(mut self, registry: Arc<ComponentRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_feature(mut self, feature: impl Feature + 'static) -> Self {
        self.register(feature);
        self
    }

    pub fn register(&mut self, feature: impl Feature + 'static) {
        self.features.push(Box::new(feature));
    }

    pub fn loader(&self) -> &Arc<ComponentLoader<S>> {
        &self.loader
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name()).collect()
    }

    /// Compose `order` into `target_selector`, then run the features.
    ///
    /// The container shows [`loading_indicator`] until the page is written
    /// when the loader config enables it. Order violations are logged, not
    /// enforced. If a feature fails the
    /// container content is replaced by [`error_state`].
    pub async fn run<N, D>(&self, order: &[N], target_selector: &str, doc: &mut D) -> Result<()>
    where
        N: AsRef<str>,
        D: Document,
    {
        if let Some(ref registry) = self.registry {
            for violation in registry.validate_order(order) {
                log::warn!("Load order problem: {}", violation);
            }
        }

        let loading = &self.loader.config().loading;
        if loading.show_loading_indicator {
            if let Some(container) = doc.query_selector(target_selector)? {
                doc.set_inner_html(container, &loading_indicator(&loading.loading_text))?;
            }
        }

        self.loader.build_page(order, target_selector, doc).await?;

        if let Err(e) = self.initialize_features(doc) {
            log::error!("Error initializing page: {}", e);
            if let Some(container) = doc.query_selector(target_selector)? {
                doc.set_inner_html(container, &error_state(&e.to_string()))?;
            }
            return Err(e.into());
        }

        log::info!("All components loaded");
        Ok(())
    }

    /// Compose the main site page into `#app`.
    pub async fn run_main_page<D: Document>(&self, doc: &mut D) -> Result<()> {
        let order = main_page_order();
        self.run(order.as_slice(), defaults::PAGE_TARGET, doc).await
    }

    /// Replace placeholder elements, then run the features.
    pub async fn run_placeholders<D: Document>(&self, doc: &mut D) -> Result<usize> {
        let replaced = self.loader.load_all_components(doc).await?;
        self.initialize_features(doc)?;
        log::info!("Replaced {} component placeholders", replaced);
        Ok(replaced)
    }

    fn initialize_features(&self, doc: &mut dyn Document) -> std::result::Result<(), FeatureError> {
        for feature in &self.features {
            log::debug!("Initializing feature '{}'", feature.name());
            feature.initialize(doc)?;
        }
        Ok(())
    }
}
