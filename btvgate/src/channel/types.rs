use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical string form of a channel identifier.
///
/// Numbers and numeric strings normalize to the same key, so `23`, `"23"`,
/// `" 23 "` and `"023"` are all `"23"`. Anything non-numeric is kept as-is
/// after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelKey(String);

impl ChannelKey {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(canonical_id(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form, when the key came from a number or a numeric string.
    pub fn as_number(&self) -> Option<u64> {
        if is_numeric(&self.0) {
            self.0.parse().ok()
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ChannelKey {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&String> for ChannelKey {
    fn from(raw: &String) -> Self {
        Self::new(raw)
    }
}

impl From<&ChannelKey> for ChannelKey {
    fn from(key: &ChannelKey) -> Self {
        key.clone()
    }
}

macro_rules! channel_key_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ChannelKey {
                fn from(id: $ty) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

channel_key_from_int!(u16, u32, u64, i32, i64);

impl Serialize for ChannelKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ChannelKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer).map(|raw| ChannelKey::new(raw.into_string()))
    }
}

/// Ids on the wire may be JSON numbers or strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Normalize any record id to its canonical string form.
pub fn canonical_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_numeric(trimmed)
        && let Ok(n) = trimmed.parse::<u64>()
    {
        return n.to_string();
    }
    trimmed.to_string()
}

/// Deserialize a number-or-string id into its canonical string.
pub fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(|raw| canonical_id(&raw.into_string()))
}

/// Deserialize a list of number-or-string ids into canonical strings.
pub fn de_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Vec::<RawId>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|id| canonical_id(&id.into_string()))
        .collect())
}

/// Deserialize an optional number-or-string id, keeping its text as sent
/// apart from surrounding whitespace.
pub fn de_opt_raw_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.map(|id| id.into_string().trim().to_string()))
}

/// A channel row from the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelKey,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// A program (on-demand video) row from the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub channel_id: Option<ChannelKey>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// A news ticker item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
