use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use stash_entities::{FileRecord, Identity};
use tracing::debug;
use url::Url;

use crate::{Vault, VaultBinder};

#[derive(Serialize)]
struct UploadRequest {
    name: String,
    content_b64: String,
}

#[derive(Deserialize)]
struct ListResponse {
    files: Vec<String>,
}

/// HTTP transport for the remote service, bound to one identity.
pub struct HttpVault {
    http: reqwest::Client,
    service: Url,
    credential: String,
    trust_anchor: Option<String>,
}

impl HttpVault {
    fn files_endpoint(&self) -> Result<Url> {
        join_endpoint(&self.service, "api/v1/files")
    }
}

impl Vault for HttpVault {
    async fn upload_file(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let request = UploadRequest {
            name: name.to_string(),
            content_b64: general_purpose::STANDARD.encode(bytes),
        };

        let ack = self
            .http
            .post(self.files_endpoint()?)
            .bearer_auth(&self.credential)
            .json(&request)
            .send()
            .await
            .context("Remote service is unreachable")?
            .error_for_status()
            .context("Remote service rejected the upload")?
            .text()
            .await
            .context("Could not read the upload acknowledgment")?;

        Ok(ack)
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let listing: ListResponse = self
            .http
            .get(self.files_endpoint()?)
            .bearer_auth(&self.credential)
            .send()
            .await
            .context("Remote service is unreachable")?
            .error_for_status()
            .context("Remote service rejected the listing request")?
            .json()
            .await
            .context("Could not parse the file listing")?;

        Ok(listing
            .files
            .into_iter()
            .map(FileRecord::from)
            .collect())
    }

    async fn fetch_trust_anchor(&mut self) -> Result<()> {
        let anchor = self
            .http
            .get(join_endpoint(&self.service, "api/v1/root-key")?)
            .send()
            .await
            .context("Local service is unreachable")?
            .error_for_status()
            .context("Local service has no trust anchor")?
            .text()
            .await
            .context("Could not read the trust anchor")?;

        debug!("Fetched trust anchor ({} bytes)", anchor.len());
        self.trust_anchor = Some(anchor);
        Ok(())
    }
}

/// Binds `HttpVault` handles to a fixed service address.
pub struct HttpVaultBinder {
    service: Url,
}

impl HttpVaultBinder {
    pub fn new(service: Url) -> Self {
        Self { service }
    }
}

impl VaultBinder for HttpVaultBinder {
    type Handle = HttpVault;

    fn bind(&self, identity: &Identity) -> Result<Self::Handle> {
        Ok(HttpVault {
            http: reqwest::Client::new(),
            service: self.service.clone(),
            credential: identity.credential.clone(),
            trust_anchor: None,
        })
    }
}

fn join_endpoint(service: &Url, path: &str) -> Result<Url> {
    service
        .join(path)
        .map_err(|e| anyhow!("Invalid service URL {}: {}", service, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_request_encodes_content_as_base64() {
        let request = UploadRequest {
            name: "a.txt".to_string(),
            content_b64: general_purpose::STANDARD.encode(b"abc"),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["name"], "a.txt");
        assert_eq!(value["content_b64"], "YWJj");
    }

    #[test]
    fn endpoints_are_joined_against_the_service_root() {
        let service = Url::parse("http://127.0.0.1:4943").unwrap();
        let endpoint = join_endpoint(&service, "api/v1/files").unwrap();
        assert_eq!(endpoint.as_str(), "http://127.0.0.1:4943/api/v1/files");
    }

    #[test]
    fn listing_parses_into_records_in_service_order() {
        let listing: ListResponse =
            serde_json::from_str(r#"{"files":["b.txt","a.txt"]}"#).unwrap();
        let records: Vec<FileRecord> =
            listing.files.into_iter().map(FileRecord::from).collect();
        assert_eq!(records[0].name, "b.txt");
        assert_eq!(records[1].name, "a.txt");
    }
}
