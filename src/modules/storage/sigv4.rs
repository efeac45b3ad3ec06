//! AWS Signature Version 4 for the few S3 calls rust-s3 does not cover
//! (bucket policy).

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::core::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

pub struct SigningKeys<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
}

/// Headers to attach to a signed request
#[derive(Debug)]
pub struct SignedHeaders {
    pub amz_date: String,
    pub content_sha256: String,
    pub authorization: String,
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, AppError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(format!("HMAC key error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// `kSigning = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")`
pub fn signing_key(keys: &SigningKeys<'_>, date_stamp: &str) -> Result<Vec<u8>, AppError> {
    let k_date = hmac_sha256(
        format!("AWS4{}", keys.secret_key).as_bytes(),
        date_stamp.as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, keys.region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, keys.service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

/// Sign a request whose only signed headers are host, payload hash and date
pub fn sign(
    keys: &SigningKeys<'_>,
    method: &str,
    host: &str,
    canonical_uri: &str,
    canonical_query: &str,
    payload: &[u8],
    now: DateTime<Utc>,
) -> Result<SignedHeaders, AppError> {
    let date_stamp = now.format("%Y%m%d").to_string();
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let content_sha256 = sha256_hex(payload);

    let canonical_request = format!(
        "{method}\n{canonical_uri}\n{canonical_query}\nhost:{host}\nx-amz-content-sha256:{content_sha256}\nx-amz-date:{amz_date}\n\n{SIGNED_HEADERS}\n{content_sha256}"
    );

    let scope = format!(
        "{}/{}/{}/aws4_request",
        date_stamp, keys.region, keys.service
    );
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let signature = hex::encode(hmac_sha256(
        &signing_key(keys, &date_stamp)?,
        string_to_sign.as_bytes(),
    )?);

    Ok(SignedHeaders {
        authorization: format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, keys.access_key, scope, SIGNED_HEADERS, signature
        ),
        amz_date,
        content_sha256,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const KEYS: SigningKeys<'static> = SigningKeys {
        access_key: "AKIDEXAMPLE",
        secret_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
        region: "us-east-1",
        service: "iam",
    };

    #[test]
    fn test_signing_key_matches_reference_derivation() {
        let key = signing_key(&KEYS, "20120215").unwrap();
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn test_sign_builds_authorization_header() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let keys = SigningKeys {
            service: "s3",
            ..KEYS
        };
        let signed = sign(&keys, "PUT", "minio:9000", "/natawo", "policy=", b"{}", now).unwrap();

        assert_eq!(signed.amz_date, "20260301T120000Z");
        assert_eq!(signed.content_sha256, sha256_hex(b"{}"));
        assert!(signed.authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20260301/us-east-1/s3/aws4_request, SignedHeaders=host;x-amz-content-sha256;x-amz-date, Signature="
        ));

        let again = sign(&keys, "PUT", "minio:9000", "/natawo", "policy=", b"{}", now).unwrap();
        assert_eq!(signed.authorization, again.authorization);
    }
}
