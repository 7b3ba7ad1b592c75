//! Test helpers: an in-process backend and recording side-effect hooks.

use crate::auth::{CredentialStore, MemoryStore};
use crate::client::{ApiClient, ClientConfig, Navigator, Notifier};
use std::sync::{Arc, Mutex};

/// Serve `router` on an ephemeral local port, returning its base URL
pub async fn spawn_backend(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Records redirects and notifications instead of performing them
#[derive(Clone, Default)]
pub struct Recorder {
    redirects: Arc<Mutex<Vec<String>>>,
    messages: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn navigator(&self) -> Arc<dyn Navigator> {
        let redirects = self.redirects.clone();
        Arc::new(move |location: &str| redirects.lock().unwrap().push(location.to_string()))
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        let messages = self.messages.clone();
        Arc::new(move |message: &str| messages.lock().unwrap().push(message.to_string()))
    }

    pub fn client(&self, base_url: &str, store: MemoryStore) -> ApiClient {
        self.client_with(base_url, Arc::new(store))
    }

    pub fn client_with(&self, base_url: &str, store: Arc<dyn CredentialStore>) -> ApiClient {
        ApiClient::new(
            ClientConfig::with_base_url(base_url),
            store,
            self.navigator(),
            self.notifier(),
        )
        .unwrap()
    }
}
