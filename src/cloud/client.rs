use log::debug;
use rusoto_core::{HttpClient, Region};
use rusoto_credential::ChainProvider;
use rusoto_s3::S3Client;

use crate::config::BackupConfig;
use crate::constants::ENV_S3_REGION;
use crate::error::{BackupError, Result};

/// Resolve the configured region, or a custom one when an endpoint is set.
pub fn resolve_region(region_name: &str, endpoint: Option<&str>) -> Result<Region> {
    match endpoint {
        Some(endpoint) => Ok(Region::Custom {
            name: region_name.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }),
        None => region_name
            .parse::<Region>()
            .map_err(|e| BackupError::InvalidConfig {
                key: ENV_S3_REGION,
                reason: e.to_string(),
            }),
    }
}

/// Create an S3 client for the configured region/endpoint.
///
/// Credentials come from the default chain (environment, profile, instance
/// metadata); this tool manages none of its own.
pub fn create_s3_client(config: &BackupConfig) -> Result<S3Client> {
    let region = resolve_region(&config.region, config.endpoint.as_deref())?;
    debug!("Using S3 region {:?}", region);

    let http_client = HttpClient::new().map_err(|e| BackupError::Upload {
        bucket: config.bucket.clone(),
        key: String::new(),
        message: format!("Failed to create HTTP client: {}", e),
    })?;

    Ok(S3Client::new_with(http_client, ChainProvider::new(), region))
}
