use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// A notification as posted by an internal caller.
///
/// Both fields default to empty when absent or `null`, and unknown fields
/// are ignored, so older and newer callers keep working against the same
/// endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Message {
    #[serde(alias = "Text", alias = "TEXT", deserialize_with = "null_as_empty")]
    pub text: String,
    /// Base64 encoded image. Accepted on the wire but not forwarded.
    #[serde(alias = "Image", alias = "IMAGE", deserialize_with = "null_as_empty")]
    pub image: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Message {
    /// Decodes the first JSON value in `body`; anything after it is ignored.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::Deserializer::from_slice(body)
            .into_iter::<Self>()
            .next()
            .unwrap_or_else(|| Err(serde_json::Error::custom("empty message body")))
    }
}
