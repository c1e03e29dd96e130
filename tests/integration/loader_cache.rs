//! Cache and batch loading behaviour.

use std::time::Duration;

use component_loader::{fallback_fragment, ComponentLoader, LoadError};

use crate::fixture::{Reply, ScriptedSource};

#[tokio::test]
async fn test_second_load_is_a_cache_hit() {
    let loader = ComponentLoader::new(ScriptedSource::new().component("x", "<p>x</p>"));

    let first = loader.load_component("x").await;
    let second = loader.load_component("x").await;

    assert_eq!(first, "<p>x</p>");
    assert_eq!(second, first);
    assert_eq!(loader.source().attempts().len(), 1);
}

#[tokio::test]
async fn test_missing_component_falls_back() {
    let loader = ComponentLoader::new(ScriptedSource::new());

    let html = loader.load_component("missing").await;

    assert_eq!(html, fallback_fragment("missing"));
    assert!(html.contains("missing"));
    assert_eq!(loader.source().attempts_for("missing"), 3);
}

#[tokio::test]
async fn test_server_errors_advance_to_next_candidate() {
    let source = ScriptedSource::new()
        .reply("/assets/components/hero.html", Reply::Status(500))
        .reply("/src/components/hero.html", Reply::Html("<section>hero</section>"));
    let loader = ComponentLoader::new(source);

    assert_eq!(loader.load_component("hero").await, "<section>hero</section>");
    assert_eq!(
        loader.source().attempts(),
        vec!["/assets/components/hero.html", "/src/components/hero.html"]
    );
}

#[tokio::test]
async fn test_failures_are_retried_on_next_call() {
    let loader = ComponentLoader::new(ScriptedSource::new());

    assert!(loader.try_load_component("gone").await.is_err());
    assert!(loader.try_load_component("gone").await.is_err());

    assert_eq!(loader.source().attempts_for("gone"), 6);
    assert!(loader.cache().is_empty().await);
}

#[tokio::test]
async fn test_try_load_reports_last_error() {
    let source = ScriptedSource::new().reply("./src/components/nav.html", Reply::Status(503));
    let loader = ComponentLoader::new(source);

    let err = loader.try_load_component("nav").await.unwrap_err();

    assert_eq!(
        err,
        LoadError::PathExhausted {
            name: "nav".into(),
            attempts: 3,
            last_error: Some("./src/components/nav.html returned HTTP 503".into()),
        }
    );
}

#[tokio::test]
async fn test_load_components_mixes_content_and_fallback() {
    let loader = ComponentLoader::new(ScriptedSource::new().component("a", "<p>a</p>"));

    let loaded = loader.load_components(&["a", "b"]).await;

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded["a"], "<p>a</p>");
    assert_eq!(loaded["b"], fallback_fragment("b"));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_loads_of_one_name_fetch_once() {
    let source = ScriptedSource::new().delayed(
        "/assets/components/slow.html",
        Duration::from_millis(200),
        Reply::Html("<p>slow</p>"),
    );
    let loader = ComponentLoader::new(source);

    let (a, b, c) = tokio::join!(
        loader.load_component("slow"),
        loader.load_component("slow"),
        loader.load_component("slow"),
    );

    assert_eq!(a, "<p>slow</p>");
    assert_eq!(b, a);
    assert_eq!(c, a);
    assert_eq!(loader.source().attempts_for("slow"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_names_in_batch_fetch_once() {
    let source = ScriptedSource::new().delayed(
        "/assets/components/dup.html",
        Duration::from_millis(50),
        Reply::Html("dup"),
    );
    let loader = ComponentLoader::new(source);

    let loaded = loader.load_components(&["dup", "dup"]).await;

    assert_eq!(loaded.len(), 1);
    assert_eq!(loader.source().attempts_for("dup"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_components_load_concurrently() {
    let source = ScriptedSource::new()
        .delayed("/assets/components/a.html", Duration::from_secs(1), Reply::Html("a"))
        .delayed("/assets/components/b.html", Duration::from_secs(1), Reply::Html("b"))
        .delayed("/assets/components/c.html", Duration::from_secs(1), Reply::Html("c"));
    let loader = ComponentLoader::new(source);

    let started = tokio::time::Instant::now();
    loader.load_components(&["a", "b", "c"]).await;

    assert!(started.elapsed() < Duration::from_secs(2));
}
