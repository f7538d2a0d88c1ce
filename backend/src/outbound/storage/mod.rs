//! Capability-scoped image storage on the local filesystem.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use rand::RngCore;
use tracing::debug;

use crate::domain::UploadedImage;
use crate::domain::ports::{ImageStore, ImageStoreError};

/// URL prefix under which stored files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Writes uploads into a single directory opened once at startup.
#[derive(Debug, Clone)]
pub struct CapStdImageStore {
    root: PathBuf,
    dir: Arc<Dir>,
}

impl CapStdImageStore {
    /// Create `root` if needed and open it for writing.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        Dir::create_ambient_dir_all(&root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())?;
        Ok(Self {
            root,
            dir: Arc::new(dir),
        })
    }

    /// Directory that backs the store.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }
}

/// 32 lowercase hex characters followed by `extension`.
fn random_file_name(extension: &str) -> String {
    let mut bytes = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{extension}", hex::encode(bytes))
}

#[async_trait]
impl ImageStore for CapStdImageStore {
    async fn store(&self, image: &UploadedImage) -> Result<String, ImageStoreError> {
        let file_name = random_file_name(&image.extension());
        let dir = Arc::clone(&self.dir);
        let bytes = image.bytes().to_vec();
        let target = file_name.clone();
        tokio::task::spawn_blocking(move || dir.write(Path::new(&target), bytes))
            .await
            .map_err(|error| ImageStoreError::io(error.to_string()))?
            .map_err(|error| ImageStoreError::io(error.to_string()))?;
        debug!(file_name = %file_name, size = image.bytes().len(), "stored upload");
        Ok(format!("{UPLOADS_URL_PREFIX}/{file_name}"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn image(name: &str) -> UploadedImage {
        UploadedImage::new(name, "image/png", vec![1, 2, 3], 1024).expect("image")
    }

    #[rstest]
    #[case("photo.PNG", ".png")]
    #[case("photo", "")]
    #[tokio::test]
    async fn stores_under_random_hex_name(#[case] name: &str, #[case] extension: &str) {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = CapStdImageStore::open(temp.path().join("uploads")).expect("open");

        let url = store.store(&image(name)).await.expect("store");

        let stored = url
            .strip_prefix("/uploads/")
            .expect("uploads prefix")
            .to_owned();
        let stem = stored.strip_suffix(extension).expect("extension");
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        let written = Dir::open_ambient_dir(store.root(), ambient_authority())
            .expect("reopen")
            .read(Path::new(&stored))
            .expect("read");
        assert_eq!(written, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn repeated_uploads_get_distinct_names() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = CapStdImageStore::open(temp.path()).expect("open");

        let first = store.store(&image("a.png")).await.expect("first");
        let second = store.store(&image("a.png")).await.expect("second");

        assert_ne!(first, second);
    }
}
