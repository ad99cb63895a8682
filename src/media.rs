//! Uploaded images on local disk, served under `/media/`.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::Result;

pub const MEDIA_URL: &str = "/media/";
const POST_IMAGE_DIR: &str = "posts";

pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a post image and returns its name relative to the media root.
    /// An existing file with the same name is never overwritten.
    pub async fn save_post_image(&self, filename: &str, data: &[u8]) -> Result<String> {
        let dir = self.root.join(POST_IMAGE_DIR);
        fs::create_dir_all(&dir).await?;

        let clean = sanitize_filename(filename);
        let mut candidate = clean.clone();
        let mut file = loop {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(dir.join(&candidate))
                .await
            {
                Ok(file) => break file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    candidate = with_random_suffix(&clean);
                }
                Err(e) => return Err(e.into()),
            }
        };
        let name = format!("{POST_IMAGE_DIR}/{candidate}");
        let written = match file.write_all(data).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            drop(file);
            self.remove(&name).await;
            return Err(e.into());
        }

        tracing::debug!(%name, bytes = data.len(), "stored post image");
        Ok(name)
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub async fn exists(&self, name: &str) -> bool {
        fs::try_exists(self.path_of(name)).await.unwrap_or(false)
    }

    /// Deletes a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, name: &str) {
        match fs::remove_file(self.path_of(name)).await {
            Ok(()) => tracing::debug!(%name, "removed media file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(%name, error = %e, "failed to remove media file"),
        }
    }
}

pub fn url_for(name: &str) -> String {
    format!("{MEDIA_URL}{name}")
}

/// Keeps the last path component and replaces whitespace with `_`.
fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| !c.is_control())
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "upload".to_string(),
        _ => cleaned,
    }
}

fn with_random_suffix(filename: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(7).collect();
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{suffix}.{ext}"),
        _ => format!("{filename}_{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_flattened() {
        assert_eq!(sanitize_filename("small.gif"), "small.gif");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\pics\\my cat.png"), "my_cat.png");
        assert_eq!(sanitize_filename(".."), "upload");
    }

    #[test]
    fn suffix_goes_before_extension() {
        let renamed = with_random_suffix("small.gif");
        assert!(renamed.starts_with("small_"));
        assert!(renamed.ends_with(".gif"));
        assert_eq!(renamed.len(), "small_.gif".len() + 7);
    }

    #[tokio::test]
    async fn colliding_names_get_a_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path());

        let first = storage.save_post_image("small.gif", b"one").await.unwrap();
        let second = storage.save_post_image("small.gif", b"two").await.unwrap();

        assert_eq!(first, "posts/small.gif");
        assert_ne!(first, second);
        assert!(storage.exists(&first).await);
        assert!(storage.exists(&second).await);
        assert_eq!(fs::read(storage.path_of(&first)).await.unwrap(), b"one");
        assert_eq!(url_for(&first), "/media/posts/small.gif");

        storage.remove(&first).await;
        assert!(!storage.exists(&first).await);
        storage.remove(&first).await;
    }
}
