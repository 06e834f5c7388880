use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use axum::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    /// Public URL for a stored object. The bucket is world-readable; rows
    /// keep the full URL, not the key.
    fn public_url(&self, key: &str) -> String;
    /// Inverse of `public_url`. None when the URL points outside our bucket.
    fn key_for_url(&self, url: &str) -> Option<String>;
}

#[derive(Clone)]
pub struct Storage {
    client: Client,
    endpoint: String,
    bucket: String,
}

impl Storage {
    pub async fn new(
        endpoint: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
        region: &str,
    ) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(Credentials::new(
                access_key, secret_key, None, None, "static",
            ))
            .endpoint_url(endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait]
impl StorageClient for Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("s3 put_object")?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("s3 delete_object")?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/{}/", self.endpoint, self.bucket);
        url.strip_prefix(prefix.as_str()).map(|k| k.to_string())
    }
}

/// In-memory stand-in used by unit tests; records nothing durable.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
    pub objects: std::sync::Mutex<std::collections::HashMap<String, Bytes>>,
}

#[cfg(test)]
#[async_trait]
impl StorageClient for MemoryStorage {
    async fn put_object(&self, key: &str, body: Bytes, _content_type: &str) -> anyhow::Result<()> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), body);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("http://storage.test/media/{}", key)
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix("http://storage.test/media/")
            .map(|k| k.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_storage_url_roundtrip() {
        let storage = MemoryStorage::default();
        storage
            .put_object("listings/u/abc.jpg", Bytes::from_static(b"img"), "image/jpeg")
            .await
            .unwrap();

        let url = storage.public_url("listings/u/abc.jpg");
        assert_eq!(
            storage.key_for_url(&url).as_deref(),
            Some("listings/u/abc.jpg")
        );
        assert_eq!(storage.key_for_url("http://elsewhere/x.jpg"), None);
    }

    #[tokio::test]
    async fn delete_removes_the_stored_object() {
        let storage = MemoryStorage::default();
        storage
            .put_object("listings/u/gone.jpg", Bytes::from_static(b"img"), "image/jpeg")
            .await
            .unwrap();
        assert!(storage.objects.lock().unwrap().contains_key("listings/u/gone.jpg"));

        storage.delete_object("listings/u/gone.jpg").await.unwrap();
        assert!(storage.objects.lock().unwrap().is_empty());
    }
}
