use anyhow::Context;
use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::trace;

use super::ObjectStore;

/// An S3-compatible store, either AWS itself or a MinIO deployment.
#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect to a MinIO (or other S3-compatible) endpoint with static credentials.
    pub async fn minio(
        base_url: &str,
        access_id: &str,
        access_key: &str,
        region: &str,
    ) -> Self {
        Self::new(get_min_io_client(base_url, access_id, access_key, region).await)
    }

    /// Connect to AWS using the default environment credential chain.
    pub async fn from_env(region: &str) -> Self {
        let config = aws_config::from_env()
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::new(Client::new(&config))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

pub async fn get_min_io_client(
    base_url: &str,
    access_id: &str,
    access_key: &str,
    region: &str,
) -> Client {
    let credentials = Credentials::new(access_id, access_key, None, None, "minio");

    let config = aws_config::from_env()
        .region(Region::new(region.to_string()))
        .credentials_provider(credentials)
        .endpoint_url(base_url)
        .load()
        .await;

    // MinIO serves buckets as path segments, not subdomains
    let s3_config = aws_sdk_s3::config::Builder::from(&config)
        .force_path_style(true)
        .build();
    Client::from_conf(s3_config)
}

pub async fn is_bucket_accessible(client: &Client, bucket: &str) -> anyhow::Result<bool> {
    match client.head_bucket().bucket(bucket).send().await {
        Ok(_) => Ok(true),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, bucket: &str, key: &str) -> anyhow::Result<Bytes> {
        trace!("bucket:      {}", bucket);
        trace!("object:      {}", key);
        let object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("get_object {bucket}/{key}"))?;

        let body = object
            .body
            .collect()
            .await
            .with_context(|| format!("reading body of {bucket}/{key}"))?;
        Ok(body.into_bytes())
    }

    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> anyhow::Result<()> {
        trace!("bucket:      {}", bucket);
        trace!("object:      {} ({} bytes)", key, body.len());
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .with_context(|| format!("put_object {bucket}/{key}"))?;
        Ok(())
    }
}
