use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::client::{ApiClient, UploadRequest};
use crate::config::ConfigUpdate;
use crate::notifier::{Notifier, NotifierConfig};
use crate::page::{Page, SelectedFile, SharedPage, SubmitButton, UPLOADING_LABEL};
use crate::render;

pub const UPLOAD_SUCCESS: &str = "Photo uploaded successfully! It will be indexed shortly.";

/// Input problems caught before anything is sent.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a search query")]
    EmptyQuery,
    #[error("Please select a photo to upload")]
    NoFile,
    #[error("Please select an image file")]
    NotAnImage,
    #[error("Custom labels must contain only printable ASCII characters")]
    InvalidLabels,
}

fn valid_header_text(text: &str) -> bool {
    text.bytes().all(|b| b == b'\t' || (b' '..=b'~').contains(&b))
}

/// Binds the search and upload forms of a page to the API.
pub struct App {
    client: ApiClient,
    page: SharedPage,
    notifier: Notifier,
    latest_search: AtomicU64,
}

impl App {
    pub fn new(client: ApiClient) -> Self {
        App::with_notifier_config(client, NotifierConfig::default())
    }

    pub fn with_notifier_config(client: ApiClient, config: NotifierConfig) -> Self {
        let page = Page::shared();
        App {
            client,
            notifier: Notifier::new(page.clone(), config),
            page,
            latest_search: AtomicU64::new(0),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn page(&self) -> SharedPage {
        self.page.clone()
    }

    pub fn snapshot(&self) -> Page {
        self.page.lock().clone()
    }

    pub fn update_config(&self, update: ConfigUpdate) {
        self.client.update_config(update);
    }

    pub fn select_file(&self, file: Option<SelectedFile>) {
        self.page.lock().upload.file = file;
    }

    pub fn set_custom_labels(&self, labels: impl Into<String>) {
        self.page.lock().upload.custom_labels = labels.into();
    }

    #[tracing::instrument(skip(self))]
    pub async fn handle_search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.notifier.show_error(ValidationError::EmptyQuery.to_string());
            return;
        }

        let sequence = self.latest_search.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut page = self.page.lock();
            page.search_query = query.to_string();
            page.results = None;
            page.error = None;
            page.loading = true;
        }

        let result = self.client.search(query).await;

        // Only the most recently issued search may touch the page.
        if sequence != self.latest_search.load(Ordering::SeqCst) {
            tracing::info!(sequence, "discarding response of superseded search");
            return;
        }

        match result {
            Ok(photos) => {
                let view = render::results(photos);
                tracing::info!(results = view.len(), "search finished");
                let mut page = self.page.lock();
                page.loading = false;
                page.results = Some(view);
            },
            Err(err) => {
                tracing::error!(error = %err, "search failed");
                self.page.lock().loading = false;
                self.notifier
                    .show_error(format!("Error searching photos: {}", err));
            },
        }
    }

    fn prepare_upload(&self) -> Result<Option<UploadRequest>, ValidationError> {
        let mut page = self.page.lock();
        if page.upload.submit.disabled {
            return Ok(None);
        }

        let file = page.upload.file.as_ref().ok_or(ValidationError::NoFile)?;
        if !file.is_image() {
            return Err(ValidationError::NotAnImage);
        }

        let labels = page.upload.custom_labels.trim();
        if !valid_header_text(labels) {
            return Err(ValidationError::InvalidLabels);
        }

        let upload = UploadRequest {
            file_name: file.name.clone(),
            content_type: file.media_type.clone(),
            data: file.data.clone(),
            custom_labels: Some(labels.to_string()).filter(|labels| !labels.is_empty()),
        };

        page.upload.submit = SubmitButton {
            disabled: true,
            label: UPLOADING_LABEL.to_string(),
        };

        Ok(Some(upload))
    }

    #[tracing::instrument(skip(self))]
    pub async fn handle_upload(&self) {
        let upload = match self.prepare_upload() {
            Ok(Some(upload)) => upload,
            Ok(None) => {
                tracing::debug!("upload already in progress");
                return;
            },
            Err(err) => {
                self.notifier.show_error(err.to_string());
                return;
            },
        };
        let file_name = upload.file_name.clone();

        match self.client.upload(upload).await {
            Ok(()) => {
                tracing::info!(%file_name, "photo uploaded");
                {
                    let mut page = self.page.lock();
                    page.upload.file = None;
                    page.upload.custom_labels.clear();
                    page.upload.submit = SubmitButton::default();
                }
                self.notifier.show_success(UPLOAD_SUCCESS);
            },
            Err(err) => {
                tracing::error!(%file_name, error = %err, "upload failed");
                self.page.lock().upload.submit = SubmitButton::default();
                self.notifier
                    .show_error(format!("Error uploading photo: {}", err));
            },
        }
    }
}
