//! The shipped site catalog.

use super::descriptor::{ComponentDescriptor, ComponentRegistry};

/// (name, display name, description, animations)
const MAIN_PAGE_COMPONENTS: &[(&str, &str, &str, &[&str])] = &[
    (
        "notification-bar",
        "Notification Bar",
        "Top notification bar with delivery information",
        &["fade-in"],
    ),
    (
        "header",
        "Main Header",
        "Navigation header with logo and menu items",
        &["slide-down"],
    ),
    (
        "hero-section",
        "Hero Section",
        "Main hero area with product image and CTA",
        &["fade-in-up", "stagger-text"],
    ),
    (
        "video-section",
        "Video Background Section",
        "Full-screen video with centered content and text overlays",
        &["video-overlay-fade", "text-reveal"],
    ),
    (
        "mission-section",
        "Mission Section",
        "Company mission and values content",
        &["fade-in-up"],
    ),
    (
        "product-section",
        "Product Section",
        "Product showcase with details and benefits",
        &["product-reveal", "fade-in-up"],
    ),
    (
        "testimonial-section",
        "Testimonial Section",
        "Customer testimonials in a scrolling train",
        &["fade-in-up"],
    ),
    (
        "blog-section",
        "Blog Section",
        "Latest blog posts",
        &["fade-in-up"],
    ),
    (
        "empty-section",
        "Empty Section",
        "Placeholder section for future content",
        &["fade-in"],
    ),
    (
        "footer",
        "Footer",
        "Site footer with links and company information",
        &["fade-in-up"],
    ),
];

const MAIN_PAGE_ORDER: &[&str] = &[
    "notification-bar",
    "header",
    "hero-section",
    "video-section",
    "mission-section",
    "product-section",
    "testimonial-section",
    "blog-section",
    "footer",
];

impl ComponentRegistry {
    /// Registry holding every component of the main site.
    pub fn main_page() -> Self {
        let mut registry = Self::new();
        for (name, display_name, description, animations) in MAIN_PAGE_COMPONENTS {
            let descriptor = ComponentDescriptor::new(*name, *display_name)
                .with_description(*description)
                .with_animations(animations.iter().copied());
            // Names in the table are unique and free of dependencies.
            if let Err(e) = registry.register(descriptor) {
                log::error!("Invalid built-in component '{}': {}", name, e);
            }
        }
        registry
    }
}

/// Canonical composition order of the main page.
pub fn main_page_order() -> Vec<String> {
    MAIN_PAGE_ORDER.iter().map(|s| s.to_string()).collect()
}
