//! Response shapes of the remote sources.

use serde::{Deserialize, Deserializer, Serialize};

/// One entry of the GitHub tags listing (`GET /repos/{owner}/{repo}/tags`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubTag {
    pub name: String,
    pub zipball_url: String,
    #[serde(default)]
    pub tarball_url: Option<String>,
    #[serde(default)]
    pub commit: Option<GitHubTagCommit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubTagCommit {
    pub sha: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Release document served by a custom update endpoint.
///
/// Every field is optional on the wire; an absent or empty `new_version`
/// means the endpoint has no release to offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomReleasePayload {
    #[serde(default, deserialize_with = "string_or_number")]
    pub new_version: Option<String>,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub plugin: Option<String>,
}

/// Hand-maintained endpoints often write `"new_version": 1.2`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_github_tags() {
        let body = r#"[
            {"name": "v1.0.0", "zipball_url": "https://api.github.com/repos/a/b/zipball/v1.0.0",
             "tarball_url": "https://api.github.com/repos/a/b/tarball/v1.0.0",
             "commit": {"sha": "abc", "url": "https://api.github.com/repos/a/b/commits/abc"},
             "node_id": "REF_1"}
        ]"#;
        let tags: Vec<GitHubTag> = serde_json::from_str(body).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "v1.0.0");
        assert_eq!(tags[0].commit.as_ref().unwrap().sha, "abc");
    }

    #[test]
    fn test_custom_payload_accepts_numeric_version() {
        let payload: CustomReleasePayload =
            serde_json::from_str(r#"{"new_version": 1.5, "package": "https://x/y.zip"}"#).unwrap();
        assert_eq!(payload.new_version.as_deref(), Some("1.5"));
        assert!(payload.slug.is_none());
    }

    #[test]
    fn test_custom_payload_empty_object() {
        let payload: CustomReleasePayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload, CustomReleasePayload::default());
    }
}
