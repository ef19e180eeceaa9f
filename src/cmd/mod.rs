//! Command line arguments for the binaries in `src/app`.

use clap::Args as ClapArgs;
use tracing::{info, warn};

use crate::store::{minio, S3Store};

pub mod ctl;
pub mod mapper;
pub mod reducer;
pub mod splitter;

/// Object store connection settings shared by the stage services.
#[derive(ClapArgs, Debug, Clone)]
pub struct StoreArgs {
    /// Endpoint of an S3-compatible store (e.g. a MinIO server). Without it
    /// the regular AWS environment credential chain is used.
    #[arg(short = 's', long = "os", env = "WORDPIPE_STORE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Login user of the object store
    #[arg(short, long, env = "WORDPIPE_STORE_USER", requires = "endpoint")]
    pub user: Option<String>,

    /// Login password of the object store
    #[arg(short, long, env = "WORDPIPE_STORE_PASSWORD", requires = "endpoint")]
    pub pw: Option<String>,

    #[arg(long, default_value = "us-east-1", env = "WORDPIPE_STORE_REGION")]
    pub region: String,
}

impl StoreArgs {
    pub async fn connect(&self) -> S3Store {
        match &self.endpoint {
            Some(endpoint) => {
                info!("using object store at {endpoint}");
                S3Store::minio(
                    endpoint,
                    self.user.as_deref().unwrap_or_default(),
                    self.pw.as_deref().unwrap_or_default(),
                    &self.region,
                )
                .await
            }
            None => {
                info!("using AWS S3 in {}", self.region);
                S3Store::from_env(&self.region).await
            }
        }
    }
}

/// Log, but don't fail on, a default bucket the store can't reach; the
/// bucket is only touched when a request actually needs it.
pub async fn check_bucket(store: &S3Store, bucket: &str) {
    if let Err(e) = minio::is_bucket_accessible(store.client(), bucket).await {
        warn!("default bucket `{bucket}` is not accessible: {e}");
    }
}
