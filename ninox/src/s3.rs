//! S3 object listing on the AWS SDK.
//!
//! [`S3Lister`] implements [`ObjectLister`] with `ListObjectsV2`. Credentials
//! and region come from the default AWS chain (environment, profile, SSO,
//! instance metadata); the region falls back to `us-east-1`. Set
//! `NINOX_S3_ENDPOINT` (or `--endpoint`) to talk to an S3-compatible store
//! with path-style addressing.
//!
//! The SDK client is built on the first listing call, so commands that fail
//! earlier never touch the credential chain.

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use aws_sdk_s3::Client;
use chrono::{TimeZone, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use ninox_core::contract::{CollaboratorError, ObjectLister, ObjectPage, ObjectRecord};

pub const ENDPOINT_ENV: &str = "NINOX_S3_ENDPOINT";
pub const DEFAULT_REGION: &str = "us-east-1";

pub struct S3Lister {
    endpoint: Option<String>,
    client: OnceCell<Client>,
}

impl S3Lister {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint.map(|e| e.trim_end_matches('/').to_string());
        info!(endpoint = ?endpoint, "Initialized S3Lister");
        Self {
            endpoint,
            client: OnceCell::new(),
        }
    }

    /// Lister over an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self {
            endpoint: None,
            client: OnceCell::from(client),
        }
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| load_client(self.endpoint.clone()))
            .await
    }
}

async fn load_client(endpoint: Option<String>) -> Client {
    let region = RegionProviderChain::default_provider().or_else(DEFAULT_REGION);
    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);
    if let Some(endpoint) = &endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let shared = loader.load().await;

    let mut config = aws_sdk_s3::config::Builder::from(&shared);
    if endpoint.is_some() {
        config = config.force_path_style(true);
    }
    info!(
        region = ?shared.region(),
        endpoint = ?endpoint,
        "Loaded AWS configuration"
    );
    Client::from_conf(config.build())
}

#[async_trait]
impl ObjectLister for S3Lister {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, CollaboratorError> {
        debug!(bucket, prefix, continuation = ?continuation, "Requesting ListObjectsV2 page");
        let output = self
            .client()
            .await
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(continuation)
            .send()
            .await
            .map_err(|e| {
                let context = DisplayErrorContext(&e);
                error!(bucket, prefix, error = %context, "ListObjectsV2 request failed");
                format!("ListObjectsV2 on {bucket} failed: {context}")
            })?;

        let page = page_from_output(&output)?;
        debug!(
            objects = page.objects.len(),
            truncated = page.next_token.is_some(),
            "Received ListObjectsV2 page"
        );
        Ok(page)
    }
}

/// Convert one SDK response page.
pub fn page_from_output(output: &ListObjectsV2Output) -> Result<ObjectPage, CollaboratorError> {
    let mut objects = Vec::new();
    for object in output.contents() {
        let key = object
            .key()
            .ok_or("ListObjectsV2 entry without a key")?
            .to_string();
        let modified = object
            .last_modified()
            .ok_or_else(|| format!("ListObjectsV2 entry {key} without LastModified"))?;
        let last_modified = Utc
            .timestamp_opt(modified.secs(), modified.subsec_nanos())
            .single()
            .ok_or_else(|| format!("LastModified out of range for {key}"))?
            .fixed_offset();
        objects.push(ObjectRecord { key, last_modified });
    }

    let next_token = if output.is_truncated().unwrap_or(false) {
        let token = output
            .next_continuation_token()
            .ok_or("Truncated ListObjectsV2 result without a continuation token")?;
        Some(token.to_string())
    } else {
        None
    };

    Ok(ObjectPage {
        objects,
        next_token,
    })
}
