use uuid::Uuid;

const PASSPORT_DIR: &str = "passports";

/// Resolves stored asset paths into absolute, externally reachable URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLocator {
    base_url: String,
    prefix: String,
}

impl MediaLocator {
    pub fn new(base_url: impl Into<String>, prefix: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let prefix = prefix.into();
        let trimmed = prefix.trim_matches('/');
        let prefix = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };

        Self { base_url, prefix }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url,
            self.prefix,
            path.trim_start_matches('/')
        )
    }
}

impl Default for MediaLocator {
    fn default() -> Self {
        Self::new("http://127.0.0.1:3000", "/media/")
    }
}

/// Accepted passport upload, identified by its (lowercased) file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassportUpload {
    extension: String,
}

impl PassportUpload {
    pub const ALLOWED_EXTENSIONS: [&'static str; 3] = ["jpg", "jpeg", "png"];

    /// Returns `None` when the file name lacks an allowed image extension.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.trim().rsplit_once('.')?;
        let extension = extension.to_ascii_lowercase();
        Self::ALLOWED_EXTENSIONS
            .contains(&extension.as_str())
            .then_some(Self { extension })
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Fresh storage path so uploads never overwrite each other.
    pub fn storage_path(&self) -> String {
        format!("{PASSPORT_DIR}/{}.{}", Uuid::new_v4(), self.extension)
    }
}
