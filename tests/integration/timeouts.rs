//! Per-candidate timeouts.

use std::time::Duration;

use component_loader::{fallback_fragment, ComponentLoader, LoadError, LoaderConfig};

use crate::fixture::{Reply, ScriptedSource};

fn config(timeout_ms: u64) -> LoaderConfig {
    LoaderConfig {
        component_timeout_ms: timeout_ms,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_hung_candidate_is_abandoned_for_the_next() {
    let source = ScriptedSource::new()
        .reply("/assets/components/hero.html", Reply::Hang)
        .reply("/src/components/hero.html", Reply::Html("<section>hero</section>"));
    let loader = ComponentLoader::with_config(source, config(100));

    let started = tokio::time::Instant::now();
    let html = loader.load_component("hero").await;

    assert_eq!(html, "<section>hero</section>");
    assert!(started.elapsed() >= Duration::from_millis(100));
    assert_eq!(loader.source().attempts_for("hero"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_all_candidates_hanging_falls_back() {
    let source = ScriptedSource::new()
        .reply("/assets/components/video-section.html", Reply::Hang)
        .reply("/src/components/video-section.html", Reply::Hang)
        .reply("./src/components/video-section.html", Reply::Hang);
    let loader = ComponentLoader::with_config(source, config(100));

    let html = loader.load_component("video-section").await;
    assert_eq!(html, fallback_fragment("video-section"));

    let err = loader.try_load_component("video-section").await.unwrap_err();
    assert_eq!(
        err,
        LoadError::PathExhausted {
            name: "video-section".into(),
            attempts: 3,
            last_error: Some("./src/components/video-section.html timed out after 100ms".into()),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_slow_reply_within_timeout_is_kept() {
    let source = ScriptedSource::new().delayed(
        "/assets/components/footer.html",
        Duration::from_millis(4_000),
        Reply::Html("<footer></footer>"),
    );
    let loader = ComponentLoader::new(source);

    assert_eq!(loader.load_component("footer").await, "<footer></footer>");
    assert_eq!(loader.source().attempts_for("footer"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hung_component_does_not_block_others() {
    let source = ScriptedSource::new()
        .reply("/assets/components/stuck.html", Reply::Hang)
        .reply("/src/components/stuck.html", Reply::Hang)
        .reply("./src/components/stuck.html", Reply::Hang)
        .component("header", "<header></header>");
    let loader = ComponentLoader::with_config(source, config(1_000));

    let started = tokio::time::Instant::now();
    let loaded = loader.load_components(&["stuck", "header"]).await;

    assert_eq!(loaded["header"], "<header></header>");
    assert_eq!(loaded["stuck"], fallback_fragment("stuck"));
    // Candidates of one component run in sequence.
    assert!(started.elapsed() >= Duration::from_secs(3));
    assert!(started.elapsed() < Duration::from_secs(4));
}
