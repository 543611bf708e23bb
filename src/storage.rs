//! Storage for uploaded dish images.
//!
//! Stored paths double as public URLs (`/images/dishes/<name>`); the HTTP
//! layer serves the backing directory under the same prefix.

use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// URL prefix every stored dish image path starts with.
pub const DISH_IMAGE_PREFIX: &str = "/images/dishes";

/// Longest original file name kept inside a generated name.
const MAX_ORIGINAL_NAME_LEN: usize = 150;

#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `bytes` under a fresh unique name derived from `suggested_name` and return its path.
    async fn save(&self, bytes: &[u8], suggested_name: &str) -> io::Result<String>;

    /// Remove the file behind `path`. Removing a missing file succeeds.
    async fn delete(&self, path: &str) -> io::Result<()>;

    async fn exists(&self, path: &str) -> io::Result<bool>;
}

/// Filesystem-backed image store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_prefix(root, DISH_IMAGE_PREFIX)
    }

    pub fn with_prefix(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a stored path back to a file inside the root, refusing anything that escapes it.
    fn resolve(&self, stored: &str) -> io::Result<PathBuf> {
        let name = stored
            .strip_prefix(&self.url_prefix)
            .map(|rest| rest.trim_start_matches('/'))
            .ok_or_else(|| invalid_path(stored))?;

        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) => Ok(self.root.join(file)),
            _ => Err(invalid_path(stored)),
        }
    }
}

#[async_trait::async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, bytes: &[u8], suggested_name: &str) -> io::Result<String> {
        fs::create_dir_all(&self.root).await?;

        let file_name = format!("{}_{}", Uuid::new_v4(), sanitize_file_name(suggested_name));
        // never overwrite an existing file
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.root.join(&file_name))
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        Ok(format!("{}/{}", self.url_prefix, file_name))
    }

    async fn delete(&self, path: &str) -> io::Result<()> {
        let file = self.resolve(path)?;
        match fs::remove_file(&file).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn exists(&self, path: &str) -> io::Result<bool> {
        match self.resolve(path) {
            Ok(file) => fs::try_exists(file).await,
            Err(_) => Ok(false),
        }
    }
}

fn invalid_path(stored: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("path {stored:?} is outside the image store"),
    )
}

/// Keep only the final component of an uploaded file name, restricted to a safe character set.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    let mut name: String = if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    };
    if name.len() > MAX_ORIGINAL_NAME_LEN {
        // keep the extension when truncating
        let keep_from = name.len() - MAX_ORIGINAL_NAME_LEN;
        name = name[keep_from..].to_string();
    }
    name
}
