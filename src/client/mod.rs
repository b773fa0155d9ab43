use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use photo_search_api_structs::{PhotoRecord, SearchResponse};

use crate::config::{ApiConfig, ConfigUpdate};

pub mod http;

pub use http::HttpApi;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error! status: {status}")]
    Status { status: u16 },
    #[error("Upload failed: {status} {status_text} - {body}")]
    Upload {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("invalid request URL {0}")]
    InvalidUrl(String),
    #[error("invalid value for header {name}")]
    InvalidHeader { name: &'static str },
    #[error("{0}")]
    Transport(String),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn transport(err: surf::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

/// A photo to store under `file_name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    /// Declared media type; empty when unknown.
    pub content_type: String,
    pub data: Vec<u8>,
    pub custom_labels: Option<String>,
}

/// An alternative search transport, e.g. a generated API gateway SDK.
#[async_trait::async_trait]
pub trait BoundClient: Send + Sync {
    async fn search_get(&self, query: &str) -> Result<SearchResponse, Error>;
}

/// Builds a [`BoundClient`] from the live configuration.
pub trait ClientFactory: Send + Sync {
    fn new_client(&self, config: &ApiConfig) -> Arc<dyn BoundClient>;
}

struct ClientState {
    config: ApiConfig,
    bound: Option<Arc<dyn BoundClient>>,
}

/// The one API client of a page.
///
/// Searches go through the bound client when a factory was supplied and fall back to direct HTTP
/// otherwise. Uploads always use direct HTTP.
pub struct ApiClient {
    http: HttpApi,
    factory: Option<Arc<dyn ClientFactory>>,
    state: RwLock<ClientState>,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        ApiClient::build(config, None)
    }

    pub fn with_factory(config: ApiConfig, factory: Arc<dyn ClientFactory>) -> Self {
        ApiClient::build(config, Some(factory))
    }

    fn build(config: ApiConfig, factory: Option<Arc<dyn ClientFactory>>) -> Self {
        let client = ApiClient {
            http: HttpApi::new(),
            factory,
            state: RwLock::new(ClientState {
                config,
                bound: None,
            }),
        };
        client.initialize();
        client
    }

    pub fn initialize(&self) {
        let mut state = self.state.write();
        state.bound = match &self.factory {
            Some(factory) => {
                tracing::debug!(endpoint = %state.config.endpoint, "binding API client");
                Some(factory.new_client(&state.config))
            },
            None => {
                tracing::debug!("no client factory, falling back to direct HTTP calls");
                None
            },
        };
    }

    pub fn update_config(&self, update: ConfigUpdate) {
        self.state.write().config.merge(update);
        self.initialize();
    }

    pub fn config(&self) -> ApiConfig {
        self.state.read().config.clone()
    }

    pub fn is_bound(&self) -> bool {
        self.state.read().bound.is_some()
    }

    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Option<Vec<PhotoRecord>>, Error> {
        let (config, bound) = {
            let state = self.state.read();
            (state.config.clone(), state.bound.clone())
        };

        match bound {
            Some(bound) => Ok(bound.search_get(query).await?.into_photos()),
            None => self.http.search(&config, query).await,
        }
    }

    pub async fn upload(&self, upload: UploadRequest) -> Result<(), Error> {
        let config = self.config();
        self.http.upload(&config, upload).await
    }
}
