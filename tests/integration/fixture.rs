use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use component_loader::{FetchError, FragmentSource};

/// What a scripted path answers with.
#[derive(Clone)]
pub(crate) enum Reply {
    Html(&'static str),
    Status(u16),
    Hang,
}

/// In-memory source with per-path delays and attempt counting.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    replies: HashMap<String, (Duration, Reply)>,
    attempts: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(mut self, path: &str, reply: Reply) -> Self {
        self.replies.insert(path.to_string(), (Duration::ZERO, reply));
        self
    }

    pub(crate) fn delayed(mut self, path: &str, delay: Duration, reply: Reply) -> Self {
        self.replies.insert(path.to_string(), (delay, reply));
        self
    }

    /// Production path of a component.
    pub(crate) fn component(self, name: &str, html: &'static str) -> Self {
        self.reply(&format!("/assets/components/{}.html", name), Reply::Html(html))
    }

    pub(crate) fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub(crate) fn attempts_for(&self, name: &str) -> usize {
        let needle = format!("/{}.html", name);
        self.attempts()
            .iter()
            .filter(|path| path.ends_with(&needle))
            .count()
    }
}

impl FragmentSource for ScriptedSource {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.attempts.lock().unwrap().push(path.to_string());

        let Some((delay, reply)) = self.replies.get(path).cloned() else {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: 404,
            });
        };

        match reply {
            Reply::Html(html) => {
                tokio::time::sleep(delay).await;
                Ok(html.to_string())
            }
            Reply::Status(status) => {
                tokio::time::sleep(delay).await;
                Err(FetchError::Status {
                    path: path.to_string(),
                    status,
                })
            }
            Reply::Hang => std::future::pending().await,
        }
    }
}
