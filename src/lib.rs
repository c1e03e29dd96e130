//! Component loader - asynchronous HTML fragment loading and page assembly.

mod defaults;
pub mod error;

pub mod bootstrap;
pub mod config;
pub mod dom;
pub mod effects;
pub mod loader;
pub mod registry;

pub use error::{Error, Result};

pub use config::{Environment, LoaderConfig, LoadingSettings};

pub use registry::{
    main_page_order, ComponentDescriptor, ComponentRegistry, OrderViolation, RegistryError,
};

pub use loader::{
    fallback_fragment, ComponentCache, ComponentLoader, FetchError, FileSource, FragmentSource,
    HttpSource, LoadError, LoadProgress, MemorySource, PathCandidateList, PathTemplates,
    USER_AGENT,
};

pub use dom::{escape_html, Document, DomError, HtmlDocument, NodeId, Selector, Target};

pub use bootstrap::{
    error_state, loading_indicator, BootstrapError, Feature, FeatureError, NavigationFeature,
    PageBootstrap, RevealFeature, VideoFeature,
};

pub use effects::{EffectError, EffectPhase, ScrollEffect, ScrollEffects};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
