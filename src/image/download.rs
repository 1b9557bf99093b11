//! Fetching a generated image to a local file.

use crate::error::{GenStudioError, Result};
use crate::image::types::GeneratedImageRecord;
use std::path::{Path, PathBuf};

/// Downloads the image behind a record's URL.
#[derive(Debug, Clone, Default)]
pub struct ImageDownloader {
    client: reqwest::Client,
}

impl ImageDownloader {
    /// Creates a downloader with a fresh HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches `record.url` and writes it into `dir`.
    ///
    /// The file is named after the record's creation date; if that name is
    /// taken, the timestamp is appended. Returns the written path.
    pub async fn download(&self, record: &GeneratedImageRecord, dir: &Path) -> Result<PathBuf> {
        let response = self.client.get(&record.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenStudioError::Api {
                status: status.as_u16(),
                message: "Could not access image".into(),
            });
        }
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(dir).await?;
        let path = target_path(record, dir);
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "downloaded image");
        Ok(path)
    }
}

fn target_path(record: &GeneratedImageRecord, dir: &Path) -> PathBuf {
    let path = dir.join(record.download_file_name());
    if !path.exists() {
        return path;
    }
    let name = record.download_file_name();
    let stem = name.trim_end_matches(".png");
    dir.join(format!("{stem}-{}.png", record.timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record_at(url: String) -> GeneratedImageRecord {
        GeneratedImageRecord {
            url,
            prompt: "fox".into(),
            timestamp: 1_714_564_800_000,
        }
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/y.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
            .mount(&server)
            .await;
        let tmp = tempfile::tempdir().unwrap();

        let record = record_at(format!("{}/y.png", server.uri()));
        let written = ImageDownloader::new()
            .download(&record, tmp.path())
            .await
            .unwrap();

        assert_eq!(written, tmp.path().join("dalle-image-2024-05-01.png"));
        assert_eq!(std::fs::read(&written).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_download_does_not_overwrite() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
            .mount(&server)
            .await;
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("dalle-image-2024-05-01.png"), b"old").unwrap();

        let record = record_at(format!("{}/y.png", server.uri()));
        let written = ImageDownloader::new()
            .download(&record, tmp.path())
            .await
            .unwrap();

        assert_eq!(
            written,
            tmp.path().join("dalle-image-2024-05-01-1714564800000.png")
        );
        assert_eq!(
            std::fs::read(tmp.path().join("dalle-image-2024-05-01.png")).unwrap(),
            b"old"
        );
    }

    #[tokio::test]
    async fn test_download_expired_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        let tmp = tempfile::tempdir().unwrap();

        let record = record_at(format!("{}/y.png", server.uri()));
        let err = ImageDownloader::new()
            .download(&record, tmp.path())
            .await
            .unwrap_err();

        assert!(matches!(err, GenStudioError::Api { status: 403, .. }));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
