//! SolisCloud request signing.
//!
//! The server recomputes the HMAC-SHA1 over the method, body digest, content type, date and path,
//! so every piece here must match the received request byte for byte.

use std::fmt::{Debug, Formatter};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http::HeaderValue;
use reqwest::Method;
use sha1::Sha1;

use super::Error;

/// Content type as it appears in the signing string, without the charset.
pub const SIGNED_CONTENT_TYPE: &str = "application/json";

/// Content type as it is sent in the header.
pub const CONTENT_TYPE: &str = "application/json;charset=UTF-8";

#[derive(Clone)]
pub struct Credentials {
    key_id: String,
    key_secret: String,
}

impl Credentials {
    pub fn try_new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Result<Self, Error> {
        let key_id = key_id.into();
        let key_secret = key_secret.into();
        if key_id.is_empty() {
            return Err(Error::Signing("empty key ID".to_owned()));
        }
        if key_secret.is_empty() {
            return Err(Error::Signing("empty key secret".to_owned()));
        }
        if HeaderValue::from_str(&format!("API {key_id}:")).is_err() {
            return Err(Error::Signing(format!("key ID `{key_id}` cannot be sent in a header")));
        }
        Ok(Self { key_id, key_secret })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &self.key_id)
            .field("key_secret", &"…")
            .finish()
    }
}

/// Fully signed request, ready to be sent.
#[must_use]
#[derive(Clone, Debug)]
pub struct SignedRequest {
    pub method: Method,
    pub path: String,
    pub body: Vec<u8>,

    /// `Date` header value, it is part of the signature.
    pub date: String,

    /// Base64-encoded MD5 of the body.
    pub content_md5: String,

    /// Base64-encoded HMAC-SHA1 of the signing string.
    pub signature: String,

    /// `Authorization` header value.
    pub authorization: String,
}

impl SignedRequest {
    pub fn new(
        credentials: &Credentials,
        path: impl Into<String>,
        body: Vec<u8>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, Error> {
        let method = Method::POST;
        let path = path.into();
        let date = format_date(timestamp);
        let content_md5 = content_md5(&body);
        let signature = sign(
            &credentials.key_secret,
            &signing_string(&method, &content_md5, &date, &path),
        )?;
        let authorization = format!("API {}:{signature}", credentials.key_id);
        Ok(Self { method, path, body, date, content_md5, signature, authorization })
    }
}

/// Format the timestamp like `Wed, 5 Jun 2024 12:00:00 GMT`.
///
/// Note the day of month is not zero-padded.
#[must_use]
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%a, %-d %b %Y %H:%M:%S GMT").to_string()
}

#[must_use]
pub fn content_md5(body: &[u8]) -> String {
    STANDARD.encode(md5::compute(body).0)
}

#[must_use]
pub fn signing_string(method: &Method, content_md5: &str, date: &str, path: &str) -> String {
    format!("{method}\n{content_md5}\n{SIGNED_CONTENT_TYPE}\n{date}\n{path}")
}

pub fn sign(key_secret: &str, signing_string: &str) -> Result<String, Error> {
    let mut mac = Hmac::<Sha1>::new_from_slice(key_secret.as_bytes())
        .map_err(|error| Error::Signing(error.to_string()))?;
    mac.update(signing_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const BODY: &[u8] = br#"{"pageNo":1,"pageSize":10}"#;
    const PATH: &str = "/v1/api/userStationList";

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 5, 12, 0, 0).unwrap()
    }

    fn credentials() -> Credentials {
        Credentials::try_new("1300386381676", "secret").unwrap()
    }

    #[test]
    fn test_format_date_does_not_pad_day() {
        assert_eq!(format_date(timestamp()), "Wed, 5 Jun 2024 12:00:00 GMT");
        assert_eq!(
            format_date(Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap()),
            "Tue, 14 Nov 2023 22:13:20 GMT",
        );
    }

    #[test]
    fn test_content_md5_ok() {
        assert_eq!(content_md5(BODY), "kxdxk7rbAsrzSIWgEwhH4w==");
        assert_eq!(content_md5(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }

    #[test]
    fn test_signing_string_layout() {
        assert_eq!(
            signing_string(&Method::POST, "digest", "Wed, 5 Jun 2024 12:00:00 GMT", PATH),
            "POST\ndigest\napplication/json\nWed, 5 Jun 2024 12:00:00 GMT\n/v1/api/userStationList",
        );
    }

    #[test]
    fn test_signed_request_ok() -> Result<(), Error> {
        let request = SignedRequest::new(&credentials(), PATH, BODY.to_vec(), timestamp())?;
        assert_eq!(request.date, "Wed, 5 Jun 2024 12:00:00 GMT");
        assert_eq!(request.content_md5, "kxdxk7rbAsrzSIWgEwhH4w==");
        assert_eq!(request.signature, "WnHmj31s9tRqyJvWn3pZMtNR46Q=");
        assert_eq!(request.authorization, "API 1300386381676:WnHmj31s9tRqyJvWn3pZMtNR46Q=");
        Ok(())
    }

    #[test]
    fn test_signature_is_deterministic() -> Result<(), Error> {
        let first = SignedRequest::new(&credentials(), PATH, BODY.to_vec(), timestamp())?;
        let second = SignedRequest::new(&credentials(), PATH, BODY.to_vec(), timestamp())?;
        assert_eq!(first.signature, second.signature);
        Ok(())
    }

    #[test]
    fn test_signature_depends_on_every_input() -> Result<(), Error> {
        let reference = SignedRequest::new(&credentials(), PATH, BODY.to_vec(), timestamp())?;

        let other_body = br#"{"pageNo":2,"pageSize":10}"#.to_vec();
        let other_secret = Credentials::try_new("1300386381676", "secreT")?;
        let variants = [
            SignedRequest::new(&credentials(), PATH, other_body, timestamp())?,
            SignedRequest::new(&credentials(), "/v1/api/inverterList", BODY.to_vec(), timestamp())?,
            SignedRequest::new(
                &credentials(),
                PATH,
                BODY.to_vec(),
                timestamp() + chrono::TimeDelta::seconds(1),
            )?,
            SignedRequest::new(&other_secret, PATH, BODY.to_vec(), timestamp())?,
        ];
        for variant in variants {
            assert_ne!(variant.signature, reference.signature);
        }
        Ok(())
    }

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(matches!(Credentials::try_new("", "secret"), Err(Error::Signing(_))));
        assert!(matches!(Credentials::try_new("key", ""), Err(Error::Signing(_))));
        assert!(matches!(Credentials::try_new("key\n", "secret"), Err(Error::Signing(_))));
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("1300386381676"));
        assert!(!debug.contains("\"secret\""));
    }
}
