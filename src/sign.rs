//! Huawei Cloud SDK-HMAC-SHA256 request signature

use std::fmt::Write;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::utils::log_sanitizer::truncate_for_log;

type HmacSha256 = Hmac<Sha256>;

/// AK/SK credential pair used to sign every request.
#[derive(Debug, Clone)]
pub(crate) struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// HMAC-SHA256 计算
pub(crate) fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Generate Huawei Cloud SDK signature
/// Reference: <https://support.huaweicloud.com/devg-apisign/api-sign-algorithm-005.html>
pub(crate) fn sign_request(
    credentials: &Credentials,
    method: &str,
    uri: &str,
    query: &str,
    headers: &[(String, String)],
    payload: &str,
    timestamp: &str,
) -> String {
    // 1. URI normalization: make sure it ends with "/"
    let canonical_uri = if uri.ends_with('/') {
        uri.to_string()
    } else {
        format!("{uri}/")
    };

    // 2. Query String sorting (in ascending order by parameter name)
    let canonical_query = if query.is_empty() {
        String::new()
    } else {
        let mut params: Vec<&str> = query.split('&').collect();
        params.sort_unstable();
        params.join("&")
    };

    // 3. Construct the canonical headers
    let mut sorted_headers: Vec<_> = headers.iter().collect();
    sorted_headers.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));

    let canonical_headers: String = sorted_headers
        .iter()
        .fold(String::new(), |mut acc, (k, v)| {
            let _ = writeln!(acc, "{}:{}", k.to_lowercase(), v.trim());
            acc
        });

    let signed_headers: String = sorted_headers
        .iter()
        .map(|(k, _)| k.to_lowercase())
        .collect::<Vec<_>>()
        .join(";");

    // 4. Calculate payload hash
    let hashed_payload = hex::encode(Sha256::digest(payload.as_bytes()));

    // 5. Construct the canonical request
    let canonical_request = format!(
        "{method}\n{canonical_uri}\n{canonical_query}\n{canonical_headers}\n{signed_headers}\n{hashed_payload}"
    );

    log::debug!("CanonicalRequest:\n{}", truncate_for_log(&canonical_request));

    // 6. Construct the string to be signed (3-line format)
    let hashed_canonical_request = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    let string_to_sign = format!("SDK-HMAC-SHA256\n{timestamp}\n{hashed_canonical_request}");

    log::debug!("StringToSign:\n{string_to_sign}");

    // 7. Calculate signature (use SK directly)
    let signature = hex::encode(hmac_sha256(
        credentials.secret_access_key.as_bytes(),
        string_to_sign.as_bytes(),
    ));

    // 8. Construct the Authorization header (format: Access=xxx)
    format!(
        "SDK-HMAC-SHA256 Access={}, SignedHeaders={}, Signature={}",
        credentials.access_key_id, signed_headers, signature
    )
}
