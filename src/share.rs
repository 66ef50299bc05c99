//! Shared snippet storage.
//!
//! A shared snippet is a plain file named `<token>.<extension>` in the
//! snippet directory. The token travels in the page URL as `?<token>`.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::PlaygroundError;
use crate::Result;

/// Default snippet directory.
pub const DEFAULT_SHARE_DIR: &str = "snippets";

/// Default snippet file extension.
pub const DEFAULT_EXTENSION: &str = "lisp";

/// File-backed snippet store.
#[derive(Debug, Clone)]
pub struct SnippetStore {
    dir: PathBuf,
    extension: String,
}

impl SnippetStore {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, token: &Uuid) -> PathBuf {
        self.dir
            .join(format!("{}.{}", token.hyphenated(), self.extension))
    }

    /// Persist `code` under a fresh token and return the token.
    pub async fn save(&self, code: &str) -> Result<String> {
        let token = Uuid::new_v4();
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(&token), code).await?;
        tracing::info!(token = %token, bytes = code.len(), "Snippet saved");
        Ok(token.to_string())
    }

    /// Read the snippet stored under `token`.
    ///
    /// Tokens that are not UUIDs are rejected before touching the filesystem.
    pub async fn load(&self, token: &str) -> Result<String> {
        let token =
            Uuid::parse_str(token).map_err(|_| PlaygroundError::InvalidToken(token.to_string()))?;
        Ok(tokio::fs::read_to_string(self.path_for(&token)).await?)
    }

    /// Load the snippet referenced by a page URL, if it references one.
    pub async fn load_from_url(&self, url: &str) -> Result<Option<String>> {
        match token_from_url(url)? {
            Some(token) => self.load(token).await.map(Some),
            None => Ok(None),
        }
    }
}

/// Extract the snippet token from a page URL.
///
/// `Ok(None)` when the URL has no query part. More than one `?` is an error.
pub fn token_from_url(url: &str) -> Result<Option<&str>> {
    let url = url.trim();
    let url = url.split_once('#').map_or(url, |(before, _)| before);
    let mut parts = url.split('?');
    let _page = parts.next();
    let token = parts.next();
    if parts.next().is_some() {
        return Err(PlaygroundError::MalformedUrl(url.to_string()));
    }
    Ok(token.filter(|t| !t.is_empty()))
}

/// Link that reopens `token` on the page at `page_url`.
pub fn share_url(page_url: &str, token: &str) -> String {
    let base = page_url
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    format!("{base}?{token}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_token_from_url() {
        assert_eq!(token_from_url("").unwrap(), None);
        assert_eq!(token_from_url("http://host/").unwrap(), None);
        assert_eq!(token_from_url("http://host/?").unwrap(), None);
        assert_eq!(token_from_url("http://host/?abc").unwrap(), Some("abc"));
        assert_eq!(token_from_url("http://host/?abc#top").unwrap(), Some("abc"));
    }

    #[test]
    fn test_token_from_url_rejects_double_separator() {
        let err = token_from_url("http://host/?a?b").unwrap_err();
        assert!(matches!(err, PlaygroundError::MalformedUrl(_)));
    }

    #[test]
    fn test_share_url() {
        assert_eq!(share_url("http://host/", "t"), "http://host/?t");
        assert_eq!(share_url("http://host/?old#x", "t"), "http://host/?t");
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = SnippetStore::new(dir.path().join("nested"), "lisp");

        let code = "(def greeting \"hi\")\n(str greeting \"!\")";
        let token = store.save(code).await.unwrap();

        let path = dir.path().join("nested").join(format!("{token}.lisp"));
        assert!(path.exists());
        assert_eq!(store.load(&token).await.unwrap(), code);
    }

    #[tokio::test]
    async fn test_load_from_url_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = SnippetStore::new(dir.path(), "lisp");
        let token = store.save("(+ 1 2)").await.unwrap();

        let url = share_url("http://localhost:8000/", &token);
        assert_eq!(
            store.load_from_url(&url).await.unwrap().as_deref(),
            Some("(+ 1 2)")
        );
        assert_eq!(store.load_from_url("http://localhost:8000/").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let store = SnippetStore::new(dir.path(), "lisp");

        let err = store.load("../../etc/passwd").await.unwrap_err();
        assert!(matches!(err, PlaygroundError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_load_missing_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = SnippetStore::new(dir.path(), "lisp");

        let err = store.load(&Uuid::new_v4().to_string()).await.unwrap_err();
        assert!(matches!(err, PlaygroundError::Io(_)));
    }
}
