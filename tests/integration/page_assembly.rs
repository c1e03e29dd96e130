//! Composing pages into a document.

use std::sync::Arc;
use std::time::Duration;

use component_loader::{
    main_page_order, ComponentLoader, ComponentRegistry, Document, DomError, Environment,
    HtmlDocument, LoaderConfig, NavigationFeature, PageBootstrap,
};
use tokio::sync::mpsc;

use crate::fixture::{Reply, ScriptedSource};

#[tokio::test(start_paused = true)]
async fn test_build_page_keeps_order_not_completion() {
    let source = ScriptedSource::new()
        .delayed("/assets/components/b.html", Duration::from_millis(300), Reply::Html("<p>b</p>"))
        .component("a", "<p>a</p>");
    let loader = ComponentLoader::new(source);
    let mut doc = HtmlDocument::parse(r#"<main id="app"></main>"#);

    loader.build_page(&["b", "a"], "#app", &mut doc).await.unwrap();

    assert_eq!(doc.render(), "<main id=\"app\"><p>b</p>\n<p>a</p></main>");
}

#[tokio::test]
async fn test_build_page_missing_target_loads_nothing() {
    let loader = ComponentLoader::new(ScriptedSource::new().component("a", "<p>a</p>"));
    let mut doc = HtmlDocument::parse(r#"<main id="app"></main>"#);

    let err = loader
        .build_page(&["a"], "#missing-target", &mut doc)
        .await
        .unwrap_err();

    assert_eq!(err, DomError::TargetNotFound("#missing-target".into()));
    assert!(loader.source().attempts().is_empty());
    assert_eq!(doc.render(), r#"<main id="app"></main>"#);
}

#[tokio::test]
async fn test_build_page_with_failed_component() {
    let loader = ComponentLoader::new(ScriptedSource::new().component("header", "<header></header>"));
    let mut doc = HtmlDocument::parse(r#"<div id="app"></div>"#);

    loader
        .build_page(&["header", "footer"], "#app", &mut doc)
        .await
        .unwrap();

    assert_eq!(
        doc.render(),
        concat!(
            r#"<div id="app"><header></header>"#,
            "\n",
            r#"<div class="component-error">Failed to load footer</div></div>"#
        )
    );
}

#[tokio::test]
async fn test_load_all_components_replaces_placeholders() {
    let source = ScriptedSource::new()
        .component("header", r#"<header class="main-header"></header>"#)
        .component("footer", "<footer>bye</footer>");
    let loader = ComponentLoader::new(source);
    let mut doc = HtmlDocument::parse(concat!(
        "<body>",
        r#"<div data-component="header"></div>"#,
        "<main>content</main>",
        r#"<div data-component="footer"></div>"#,
        "</body>",
    ));

    let replaced = loader.load_all_components(&mut doc).await.unwrap();

    assert_eq!(replaced, 2);
    assert_eq!(
        doc.render(),
        concat!(
            "<body>",
            r#"<header class="main-header" data-original-component="header"></header>"#,
            "<main>content</main>",
            r#"<footer data-original-component="footer">bye</footer>"#,
            "</body>"
        )
    );
    assert!(doc.query_selector("[data-component]").unwrap().is_none());
}

#[tokio::test]
async fn test_reload_after_build_page() {
    let loader = ComponentLoader::new(
        ScriptedSource::new().component("hero-section", r#"<section class="hero-section">v1</section>"#),
    );
    let mut doc = HtmlDocument::parse(r#"<div id="app"></div>"#);

    loader
        .build_page(&["hero-section"], "#app", &mut doc)
        .await
        .unwrap();
    loader.reload_component("hero-section", &mut doc).await.unwrap();

    assert_eq!(
        doc.render(),
        r#"<div id="app"><section class="hero-section" data-original-component="hero-section">v1</section></div>"#
    );
    assert_eq!(loader.source().attempts_for("hero-section"), 2);
}

#[tokio::test]
async fn test_reload_after_placeholder_replacement() {
    let loader = ComponentLoader::new(ScriptedSource::new().component("hero-section", "<h1>v1</h1>"));
    let mut doc = HtmlDocument::parse(r#"<body><div data-component="hero-section"></div></body>"#);

    loader.load_all_components(&mut doc).await.unwrap();
    loader.reload_component("hero-section", &mut doc).await.unwrap();

    assert_eq!(
        doc.render(),
        r#"<body><h1 data-original-component="hero-section">v1</h1></body>"#
    );
    assert_eq!(loader.source().attempts_for("hero-section"), 2);
}

#[tokio::test]
async fn test_reload_quoted_component_name() {
    let loader = ComponentLoader::new(ScriptedSource::new());
    let mut doc = HtmlDocument::parse(r#"<div data-component='say "hi"'></div>"#);

    loader.reload_component(r#"say "hi""#, &mut doc).await.unwrap();

    let placeholder = doc.query_selector("[data-component]").unwrap().unwrap();
    assert!(doc
        .inner_html(placeholder)
        .unwrap()
        .starts_with(r#"<div class="component-error">"#));
}

#[tokio::test]
async fn test_load_all_components_without_placeholders() {
    let loader = ComponentLoader::new(ScriptedSource::new());
    let mut doc = HtmlDocument::parse("<body><p>static</p></body>");

    assert_eq!(loader.load_all_components(&mut doc).await.unwrap(), 0);
    assert!(loader.source().attempts().is_empty());
}

#[tokio::test]
async fn test_insert_component_into_node() {
    let loader = ComponentLoader::new(ScriptedSource::new().component("hero-section", "<h1>Hi</h1>"));
    let mut doc = HtmlDocument::parse(r#"<section class="slot">old</section>"#);
    let slot = doc.query_selector(".slot").unwrap().unwrap();

    loader
        .insert_component("hero-section", slot, &mut doc)
        .await
        .unwrap();

    assert_eq!(doc.render(), r#"<section class="slot"><h1>Hi</h1></section>"#);
}

#[tokio::test]
async fn test_progress_reports_every_component() {
    let loader = ComponentLoader::new(ScriptedSource::new().component("a", "a").component("b", "b"));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let loaded = loader
        .load_components_with_progress(&["a", "b", "c"], &tx)
        .await;
    drop(tx);

    assert_eq!(loaded.len(), 3);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert_eq!(events.len(), 3);
    assert_eq!(
        events.iter().map(|e| e.loaded).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(events.iter().all(|e| e.total == 3));
    assert_eq!(events.last().unwrap().percentage(), 100.0);

    let failed: Vec<_> = events.iter().filter(|e| !e.ok).map(|e| e.name.as_str()).collect();
    assert_eq!(failed, vec!["c"]);
}

#[tokio::test]
async fn test_main_page_from_site_directory() {
    let site = tempfile::tempdir().unwrap();
    let components = site.path().join("src").join("components");
    std::fs::create_dir_all(&components).unwrap();
    for name in main_page_order() {
        std::fs::write(
            components.join(format!("{}.html", name)),
            format!(r#"<section id="{}"></section>"#, name),
        )
        .unwrap();
    }

    let config = LoaderConfig::for_environment(Environment::Development);
    let loader = ComponentLoader::from_directory(site.path(), config).unwrap();
    let bootstrap = PageBootstrap::new(Arc::new(loader))
        .with_registry(Arc::new(ComponentRegistry::main_page()))
        .with_feature(NavigationFeature::default());
    let mut doc = HtmlDocument::parse(r#"<div id="app"></div>"#);

    bootstrap.run_main_page(&mut doc).await.unwrap();

    let app = doc.query_selector("#app").unwrap().unwrap();
    let sections = doc.query_selector_all("section").unwrap();
    assert_eq!(sections.len(), main_page_order().len());

    let expected = main_page_order()
        .iter()
        .map(|name| format!(r#"<section id="{}"></section>"#, name))
        .collect::<Vec<_>>()
        .join("\n");
    assert_eq!(doc.inner_html(app).unwrap(), expected);

    // Development serves the first template, so no fallbacks were needed.
    assert_eq!(
        bootstrap.loader().cache().len().await,
        main_page_order().len()
    );
}
