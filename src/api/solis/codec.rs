use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_with::serde_as;

use super::Error;
use crate::prelude::*;

/// JSON encoding and decoding of the API payloads.
///
/// Field names are never derived from a naming convention: every wire field carries an explicit
/// `#[serde(rename = "…")]`.
#[derive(Copy, Clone, Default)]
pub struct Codec {
    /// Log the exchanged payloads at `INFO` instead of `TRACE`.
    pub debug: bool,
}

impl Codec {
    pub fn encode<B: Serialize>(body: &B) -> Result<String, Error> {
        serde_json::to_string(body).map_err(|error| Error::Encode(Arc::new(error)))
    }

    pub fn decode<R: DeserializeOwned>(resource: &str, text: &str) -> Result<R, Error> {
        serde_json::from_str(text)
            .map_err(|error| Error::Decode { resource: resource.to_owned(), source: Arc::new(error) })
    }

    /// Decode the response envelope and extract its `data`.
    pub fn decode_data<R>(resource: &str, text: &str) -> Result<R, Error>
    where
        R: DeserializeOwned + Default,
    {
        Self::decode::<Response<R>>(resource, text)?.into_data()
    }

    /// Make the exchange observable without affecting the control flow.
    pub fn observe(self, resource: &str, request: &str, response: &str) {
        if self.debug {
            info!(resource, request, response, "exchanged");
        } else {
            trace!(resource, request, response, "exchanged");
        }
    }
}

/// Generic API response.
///
/// Absent or `null` data is decoded as the default value, so list endpoints end up with an empty
/// vector rather than an error.
#[serde_as]
#[derive(Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de> + Default"))]
pub struct Response<R> {
    #[serde(rename = "success", default)]
    success: Option<bool>,

    #[serde(rename = "code", default)]
    code: Option<serde_json::Value>,

    #[serde(rename = "msg", default)]
    message: Option<String>,

    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(rename = "data", default)]
    data: R,
}

impl<R> Response<R> {
    /// Only an explicit `"success": false` is a failure.
    pub fn into_data(self) -> Result<R, Error> {
        if self.success == Some(false) {
            let code = match self.code {
                Some(serde_json::Value::String(code)) => code,
                Some(code) => code.to_string(),
                None => "unknown".to_owned(),
            };
            Err(Error::Api { code, message: self.message.unwrap_or_default() })
        } else {
            Ok(self.data)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Request {
        #[serde(rename = "pageNo")]
        page_no: u32,
    }

    #[test]
    fn test_encode_uses_explicit_names() -> Result {
        assert_eq!(Codec::encode(&Request { page_no: 3 })?, r#"{"pageNo":3}"#);
        Ok(())
    }

    #[test]
    fn test_decode_ignores_unknown_fields() -> Result {
        let data: Vec<u32> =
            Codec::decode_data("stationYear", r#"{"success":true,"code":"0","data":[1,2],"extra":{}}"#)?;
        assert_eq!(data, [1, 2]);
        Ok(())
    }

    #[test]
    fn test_decode_null_or_absent_data_as_default() -> Result {
        let data: Vec<u32> = Codec::decode_data("stationYear", r#"{"data":null}"#)?;
        assert!(data.is_empty());
        let data: Vec<u32> = Codec::decode_data("stationYear", "{}")?;
        assert!(data.is_empty());
        Ok(())
    }

    #[test]
    fn test_decode_malformed_json_fails() {
        let error = Codec::decode_data::<Vec<u32>>("stationAll", "<html>").unwrap_err();
        assert!(matches!(&error, Error::Decode { resource, .. } if resource == "stationAll"));
    }

    #[test]
    fn test_decode_shape_mismatch_fails() {
        let error = Codec::decode_data::<Vec<u32>>("stationAll", r#"{"data":{"page":1}}"#).unwrap_err();
        assert!(matches!(error, Error::Decode { .. }));
    }

    #[test]
    fn test_explicit_failure_envelope() {
        let text = json!({"success": false, "code": "B0115", "msg": "station not found"}).to_string();
        let error = Codec::decode_data::<Vec<u32>>("stationAll", &text).unwrap_err();
        assert_eq!(error.to_string(), r#"SolisCloud error B0115 ("station not found")"#);
    }
}
