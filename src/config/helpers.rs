use serde::{Deserialize, Deserializer, Serializer, de};
use std::time::Duration;
use url::Url;

/// Custom deserializer for Duration from milliseconds
pub fn deserialize_duration_from_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}

/// Custom deserializer for Duration from seconds
pub fn deserialize_duration_from_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}

/// Custom serializer for Duration to milliseconds
pub fn serialize_duration_to_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Custom serializer for Duration to seconds
pub fn serialize_duration_to_seconds<S>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_secs())
}

/// Deserializes the backend base URL, forcing a trailing slash so that
/// `Url::join` keeps any path prefix (e.g. `https://host/console/`).
pub fn deserialize_base_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let with_slash = if raw.ends_with('/') { raw } else { format!("{raw}/") };
    Url::parse(&with_slash).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct TestTtl {
        #[serde(
            deserialize_with = "deserialize_duration_from_ms",
            serialize_with = "serialize_duration_to_ms"
        )]
        ttl: Duration,
    }

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct TestWindow {
        #[serde(
            deserialize_with = "deserialize_duration_from_seconds",
            serialize_with = "serialize_duration_to_seconds"
        )]
        window: Duration,
    }

    #[derive(Debug, Deserialize)]
    struct TestBase {
        #[serde(deserialize_with = "deserialize_base_url")]
        base: Url,
    }

    #[test]
    fn test_duration_from_ms() {
        let actual: TestTtl = serde_json::from_str(r#"{"ttl": 5000}"#).unwrap();
        assert_eq!(actual.ttl, Duration::from_millis(5000));
        assert_eq!(serde_json::to_string(&actual).unwrap(), r#"{"ttl":5000}"#);
    }

    #[test]
    fn test_duration_from_seconds() {
        let actual: TestWindow = serde_json::from_str(r#"{"window": 60}"#).unwrap();
        assert_eq!(actual.window, Duration::from_secs(60));
        assert_eq!(serde_json::to_string(&actual).unwrap(), r#"{"window":60}"#);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let actual: TestBase =
            serde_json::from_str(r#"{"base": "http://localhost:5000/console"}"#).unwrap();
        assert_eq!(actual.base.as_str(), "http://localhost:5000/console/");
        assert_eq!(
            actual.base.join("api/session").unwrap().as_str(),
            "http://localhost:5000/console/api/session"
        );
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        let result: Result<TestBase, _> = serde_json::from_str(r#"{"base": "not a url"}"#);
        assert!(result.is_err());
    }
}
