//! Persisted representation of the product collection.
//!
//! The canonical collection is stored as a single JSON array under
//! [`STORAGE_KEY`]. Every element has the shape of [`Product`]:
//!
//! ```json
//! [{"codigo":1,"nombre":"Widget","descripcion":"","cantidad":5,
//!   "creacion":"2024-05-01T10:00:00.000Z"}]
//! ```
//!
//! Timestamps are encoded explicitly (see [`iso8601`]) so the stored text
//! never depends on a default `Display` implementation.

use crate::{error::Result, Error, Product, Timestamp};
use chrono::{DateTime, SecondsFormat, Utc};

/// Key of the record holding the collection in the host's key-value store.
pub const STORAGE_KEY: &str = "product-management-app-data";

/// Version of the stored layout and timestamp encoding.
pub const STORAGE_FORMAT_VERSION: u32 = 1;

/// Encode a timestamp as RFC 3339 UTC with millisecond precision.
pub fn encode_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decode an RFC 3339 timestamp, normalizing any offset to UTC.
pub fn decode_timestamp(value: &str) -> Result<Timestamp> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Serde adapter for `creacion` fields.
pub mod iso8601 {
    use crate::Timestamp;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &Timestamp, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::encode_timestamp(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::decode_timestamp(&raw).map_err(de::Error::custom)
    }
}

/// Serialize the collection into the stored JSON array.
pub fn to_json(products: &[Product]) -> Result<String> {
    serde_json::to_string(products).map_err(|e| Error::InvalidPayload(e.to_string()))
}

/// Parse the stored JSON array.
///
/// Any element that does not match the product shape, including an
/// unparseable `creacion`, fails the whole payload.
pub fn from_json(json: &str) -> Result<Vec<Product>> {
    let products: Vec<Product> = serde_json::from_str(json)?;
    Ok(products)
}
