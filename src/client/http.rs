use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use surf::http::headers::{HeaderValue, CONTENT_TYPE};
use surf::http::Method;
use surf::{RequestBuilder, Url};

use photo_search_api_structs::{
    PhotoRecord, SearchResponse, API_KEY_HEADER, CUSTOM_LABELS_HEADER,
};

use super::{Error, UploadRequest};
use crate::config::ApiConfig;

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Everything `encodeURIComponent` escapes.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_uri_component(component: &str) -> String {
    utf8_percent_encode(component, URI_COMPONENT).to_string()
}

pub fn search_url(endpoint: &str, query: &str) -> String {
    format!("{}/search?q={}", endpoint, encode_uri_component(query))
}

pub fn photo_url(endpoint: &str, file_name: &str) -> String {
    format!("{}/photos/{}", endpoint, encode_uri_component(file_name))
}

fn parse_url(url: String) -> Result<Url, Error> {
    Url::parse(&url).map_err(|err| Error::InvalidUrl(format!("{}: {}", url, err)))
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, Error> {
    value
        .parse()
        .map_err(|_| Error::InvalidHeader { name })
}

/// Talks to the API directly over HTTP.
#[derive(Clone, Debug)]
pub struct HttpApi {
    client: surf::Client,
}

impl Default for HttpApi {
    fn default() -> Self {
        HttpApi::new()
    }
}

impl HttpApi {
    pub fn new() -> Self {
        HttpApi {
            client: surf::Client::new(),
        }
    }

    #[tracing::instrument(skip(self, config), fields(endpoint = %config.endpoint))]
    pub async fn search(
        &self,
        config: &ApiConfig,
        query: &str,
    ) -> Result<Option<Vec<PhotoRecord>>, Error> {
        let url = parse_url(search_url(&config.endpoint, query))?;
        let request = RequestBuilder::new(Method::Get, url)
            .header(API_KEY_HEADER, header_value(API_KEY_HEADER, &config.api_key)?);

        let mut res = self.client.send(request).await.map_err(Error::transport)?;
        let status = res.status();
        tracing::debug!(status = u16::from(status), "search response received");
        if !status.is_success() {
            return Err(Error::Status {
                status: status.into(),
            });
        }

        let body = res.body_string().await.map_err(Error::transport)?;
        let response: Option<SearchResponse> = serde_json::from_str(&body)?;

        Ok(response.and_then(SearchResponse::into_photos))
    }

    #[tracing::instrument(
        skip(self, config, upload),
        fields(endpoint = %config.endpoint, file_name = %upload.file_name, size = upload.data.len())
    )]
    pub async fn upload(&self, config: &ApiConfig, upload: UploadRequest) -> Result<(), Error> {
        let url = parse_url(photo_url(&config.endpoint, &upload.file_name))?;
        let content_type = if upload.content_type.is_empty() {
            FALLBACK_CONTENT_TYPE
        } else {
            upload.content_type.as_str()
        };

        // The body has to go in first, otherwise it would overwrite the content type.
        let mut request = RequestBuilder::new(Method::Put, url)
            .body(surf::Body::from_bytes(upload.data))
            .header(API_KEY_HEADER, header_value(API_KEY_HEADER, &config.api_key)?)
            .header(CONTENT_TYPE, header_value("Content-Type", content_type)?);
        if let Some(labels) = upload.custom_labels.as_deref() {
            request = request.header(
                CUSTOM_LABELS_HEADER,
                header_value(CUSTOM_LABELS_HEADER, labels)?,
            );
        }

        let mut res = self.client.send(request).await.map_err(Error::transport)?;
        let status = res.status();
        tracing::debug!(status = u16::from(status), "upload response received");
        if !status.is_success() {
            let body = match res.body_string().await {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(error = %err, "couldn't read upload error body");
                    String::new()
                },
            };
            return Err(Error::Upload {
                status: status.into(),
                status_text: status.canonical_reason().to_string(),
                body,
            });
        }

        Ok(())
    }
}
