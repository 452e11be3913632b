use std::time::Duration;

use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use async_trait::async_trait;
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;

// MinIO ignores the region but the SDK insists on one.
const REGION: &str = "us-east-1";

/// Object store for uploaded images (profile photos, circle images, event
/// photos). S3-compatible in production, faked in tests.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Write `body` under `key`, overwriting any previous object.
    async fn store(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    /// Delete the object at `key`. A missing key is not an error.
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
    /// A GET URL for `key` that expires after `ttl`.
    async fn presigned_url(&self, key: &str, ttl: Duration) -> anyhow::Result<String>;
}

#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    pub async fn connect(
        endpoint: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
    ) -> anyhow::Result<Self> {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(REGION))
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .load()
            .await;

        // path-style addressing, MinIO does not serve virtual-hosted buckets
        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: bucket.to_owned(),
        })
    }
}

#[async_trait]
impl StorageClient for S3Storage {
    async fn store(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .with_context(|| format!("storing object {key}"))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("deleting object {key}"))?;
        Ok(())
    }

    async fn presigned_url(&self, key: &str, ttl: Duration) -> anyhow::Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(ttl)?)
            .await
            .with_context(|| format!("presigning {key}"))?;
        Ok(presigned.uri().to_string())
    }
}
