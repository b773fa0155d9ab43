use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::render::ResultsView;

pub const UPLOAD_LABEL: &str = "Upload Photo";
pub const UPLOADING_LABEL: &str = "Uploading...";

pub type SharedPage = Arc<Mutex<Page>>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub id: u64,
    pub message: String,
}

/// A file picked in the upload form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    pub name: String,
    /// Media type as declared by the picker; empty if it couldn't tell.
    pub media_type: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        SelectedFile {
            name: name.into(),
            media_type: media_type.into(),
            data,
        }
    }

    /// Reads a file from disk, guessing its media type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} does not point to a file", path.display()),
                )
            })?;
        let media_type = mime_guess::from_path(&path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();

        let data = async_std::task::spawn_blocking(move || std::fs::read(&path)).await?;

        Ok(SelectedFile::new(name, media_type, data))
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmitButton {
    pub disabled: bool,
    pub label: String,
}

impl Default for SubmitButton {
    fn default() -> Self {
        SubmitButton {
            disabled: false,
            label: UPLOAD_LABEL.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UploadForm {
    pub file: Option<SelectedFile>,
    pub custom_labels: String,
    pub submit: SubmitButton,
}

/// Everything the user currently sees.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub search_query: String,
    pub loading: bool,
    pub error: Option<Banner>,
    /// `None` while the results container is blank.
    pub results: Option<ResultsView>,
    /// Newest first.
    pub successes: Vec<Banner>,
    pub upload: UploadForm,
}

impl Page {
    pub fn shared() -> SharedPage {
        Arc::new(Mutex::new(Page::default()))
    }
}
