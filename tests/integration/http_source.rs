//! Loading over HTTP from a local server.

use std::sync::{Arc, Mutex};

use component_loader::{
    fallback_fragment, ComponentLoader, FetchError, FragmentSource, HttpSource, LoadError,
    LoaderConfig, USER_AGENT,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

type Log = Arc<Mutex<Vec<String>>>;

/// Serves `/assets/components/header.html`; everything else is a 404.
/// Returns the base URL, the requested paths and the `User-Agent` headers seen.
async fn serve() -> (String, Log, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requested = Arc::new(Mutex::new(Vec::new()));
    let agents = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&requested);
    let agent_log = Arc::clone(&agents);
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let log = Arc::clone(&log);
            let agent_log = Arc::clone(&agent_log);
            tokio::spawn(async move {
                let (reader, mut writer) = stream.into_split();
                let mut lines = BufReader::new(reader).lines();

                let request_line = lines.next_line().await.ok().flatten().unwrap_or_default();
                let path = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();
                while let Ok(Some(line)) = lines.next_line().await {
                    if line.is_empty() {
                        break;
                    }
                    if let Some((key, value)) = line.split_once(':') {
                        if key.eq_ignore_ascii_case("user-agent") {
                            agent_log.lock().unwrap().push(value.trim().to_string());
                        }
                    }
                }
                log.lock().unwrap().push(path.clone());

                let (status, body) = if path == "/assets/components/header.html" {
                    ("200 OK", "<header>served</header>")
                } else {
                    ("404 Not Found", "not found")
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = writer.write_all(response.as_bytes()).await;
                let _ = writer.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), requested, agents)
}

#[tokio::test]
async fn test_http_source_status_handling() {
    let (base_url, _, agents) = serve().await;
    let source = HttpSource::new(base_url);

    let html = source.fetch("/assets/components/header.html").await.unwrap();
    assert_eq!(html, "<header>served</header>");

    let err = source.fetch("/assets/components/nope.html").await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));

    let agents = agents.lock().unwrap().clone();
    assert_eq!(agents.len(), 2);
    assert!(agents.iter().all(|agent| agent == USER_AGENT));
    assert!(USER_AGENT.starts_with("component-loader/"));
}

#[tokio::test]
async fn test_http_loader_walks_candidates() {
    let (base_url, requested, _) = serve().await;
    let config = LoaderConfig {
        base_url: Some(base_url),
        ..Default::default()
    };
    let loader = ComponentLoader::http(config).unwrap();

    assert_eq!(loader.load_component("header").await, "<header>served</header>");
    assert_eq!(loader.load_component("footer").await, fallback_fragment("footer"));

    // "./src/..." maps to the same URL as "/src/..." and is not requested twice.
    assert_eq!(
        requested.lock().unwrap().clone(),
        vec![
            "/assets/components/header.html",
            "/assets/components/footer.html",
            "/src/components/footer.html",
        ]
    );

    let err = loader.try_load_component("footer").await.unwrap_err();
    assert!(matches!(err, LoadError::PathExhausted { attempts: 2, .. }));
}

#[test]
fn test_http_loader_requires_base_url() {
    assert!(ComponentLoader::http(LoaderConfig::default()).is_err());
}
