//! Cloud KMS decryption
//!
//! Encrypted request bodies are base64 ciphertext produced by
//! `gcloud kms encrypt`; Cloud KMS does the decryption.

use super::client::GcpClient;
use crate::error::{Error, Result};
use crate::validate;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct DecryptRequest<'a> {
    ciphertext: &'a str,
}

#[derive(Deserialize)]
struct DecryptResponse {
    #[serde(default)]
    plaintext: String,
}

/// Decrypt base64 `ciphertext` with the crypto key `key_name`
pub async fn decrypt(client: &GcpClient, key_name: &str, ciphertext: &[u8]) -> Result<Vec<u8>> {
    validate::kms_key_name(key_name)?;

    let ciphertext = std::str::from_utf8(ciphertext)
        .map_err(|_| Error::validation("encrypted file is not base64 text"))?
        .trim();
    if STANDARD.decode(ciphertext).is_err() {
        return Err(Error::validation("encrypted file is not valid base64"));
    }

    let url = client.kms_url(&format!("{}:decrypt", key_name));
    let body = serde_json::to_value(DecryptRequest { ciphertext })?;
    let response = client.post(&url, Some(&body)).await?;

    let decoded: DecryptResponse = serde_json::from_slice(&response)?;
    STANDARD
        .decode(decoded.plaintext.as_bytes())
        .map_err(|e| Error::malformed(format!("KMS returned undecodable plaintext: {e}")))
}
