use std::sync::LazyLock;

use regex::Regex;

/// Object shown in place of a channel's stream while it is locked or down.
pub const STANDBY_OBJECT: &str = "standby_blacktruthtv.mp4";

static REPEATED_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("/{2,}").expect("valid slash pattern"));

/// Base URL of the hosted project, without trailing slashes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageRoot(String);

impl StorageRoot {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Normalize an object key: backslashes become slashes, one leading `./` or
/// `/` is dropped, and runs of slashes collapse to one.
pub fn normalize_object_key(key: &str) -> String {
    let forward = key.replace('\\', "/");
    let stripped = forward
        .strip_prefix("./")
        .or_else(|| forward.strip_prefix('/'))
        .unwrap_or(&forward);
    REPEATED_SLASHES.replace_all(stripped, "/").into_owned()
}

/// Object key split into its `/`-separated path segments, normalized.
pub fn object_key_segments(key: &str) -> Vec<String> {
    normalize_object_key(key)
        .split('/')
        .map(str::to_string)
        .collect()
}

/// Public URL of an object in the hosted object store. Bucket and key
/// segments are percent-encoded, so `?` or `#` in a key stay in the path.
pub fn public_object_url(root: &StorageRoot, bucket: &str, key: &str) -> String {
    let mut url = format!(
        "{}/storage/v1/object/public/{}",
        root.as_str(),
        urlencoding::encode(bucket)
    );
    for segment in object_key_segments(key) {
        url.push('/');
        url.push_str(&urlencoding::encode(&segment));
    }
    url
}

/// Each channel's media lives in its own bucket.
pub fn channel_bucket(channel_id: u64) -> String {
    format!("channel{channel_id}")
}

/// Standby video URL for a channel.
///
/// Pure: no I/O and no validation of the root, so an empty root still yields
/// a well-formed (but unreachable) URL.
pub fn standby_url_for(root: &StorageRoot, channel_id: u64) -> String {
    public_object_url(root, &channel_bucket(channel_id), STANDBY_OBJECT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standby_url_example() {
        let root = StorageRoot::new("https://example.supabase.co");
        assert_eq!(
            standby_url_for(&root, 21),
            "https://example.supabase.co/storage/v1/object/public/channel21/standby_blacktruthtv.mp4"
        );
    }

    #[test]
    fn test_standby_url_is_deterministic() {
        let root = StorageRoot::new("https://example.supabase.co/");
        for id in [0u64, 1, 21, 23, 29, 1000] {
            let first = standby_url_for(&root, id);
            let second = standby_url_for(&root, id);
            assert_eq!(first, second);
            assert!(first.ends_with("/standby_blacktruthtv.mp4"));
            assert_eq!(first.matches(&format!("/channel{id}/")).count(), 1);
        }
    }

    #[test]
    fn test_root_trailing_slashes_stripped() {
        let root = StorageRoot::new("https://example.supabase.co///");
        assert_eq!(root.as_str(), "https://example.supabase.co");
        assert!(!standby_url_for(&root, 3).contains(".co//"));
    }

    #[test]
    fn test_empty_root_still_builds_url() {
        let root = StorageRoot::new("");
        assert!(root.is_empty());
        assert_eq!(
            standby_url_for(&root, 7),
            "/storage/v1/object/public/channel7/standby_blacktruthtv.mp4"
        );
    }

    #[test]
    fn test_normalize_object_key() {
        assert_eq!(normalize_object_key("./a/b.mp4"), "a/b.mp4");
        assert_eq!(normalize_object_key("/a/b.mp4"), "a/b.mp4");
        assert_eq!(normalize_object_key("a\\b\\c.mp4"), "a/b/c.mp4");
        assert_eq!(normalize_object_key("a//b///c.mp4"), "a/b/c.mp4");
        assert_eq!(normalize_object_key("plain.mp4"), "plain.mp4");
    }

    #[test]
    fn test_public_object_url_encodes_segments() {
        let root = StorageRoot::new("https://example.supabase.co");
        assert_eq!(
            public_object_url(&root, "channel21", "./clips//ep?1#x.mp4"),
            "https://example.supabase.co/storage/v1/object/public/channel21/clips/ep%3F1%23x.mp4"
        );
        assert_eq!(
            public_object_url(&root, "channel 9", "a b/c.mp4"),
            "https://example.supabase.co/storage/v1/object/public/channel%209/a%20b/c.mp4"
        );
    }
}
