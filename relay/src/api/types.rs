//! Wire types for the remote command API

use serde::{Deserialize, Deserializer, Serialize};

/// One queued unit of work targeted at a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntry {
    /// Acknowledgment token
    pub id: i64,

    /// Display name; informational only
    #[serde(default)]
    pub username: String,

    /// Only run while the target player is connected
    #[serde(default)]
    pub must_be_online: bool,

    /// Platform player identifier; some API versions send it as a number
    #[serde(deserialize_with = "string_or_number")]
    pub steam_id: String,

    /// Raw commands, executed verbatim and in order
    #[serde(default)]
    pub commands: Vec<String>,
}

/// Response envelope of the queue endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct QueueEnvelope {
    #[serde(default)]
    pub status: i64,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<CommandEntry>,
}

/// Error body the API returns on rejected requests
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Unsigned(u64),
    Signed(i64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Unsigned(n) => n.to_string(),
        StringOrNumber::Signed(n) => n.to_string(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<CommandEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<CommandEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a queue response body, keeping server order
pub fn parse_queue(body: &str) -> Result<Vec<CommandEntry>, serde_json::Error> {
    let envelope: QueueEnvelope = serde_json::from_str(body)?;
    Ok(envelope.data)
}

/// Extract `message` from an error body, if it is JSON and has one
pub fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

/// Serialize ack ids as the JSON array text sent in the `ids` form field
pub fn encode_ids(ids: &[i64]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_queue_preserves_order() {
        let body = r#"{
            "status": 200,
            "data": [
                {"id": 7, "username": "alice", "must_be_online": true, "steam_id": "76561111", "commands": ["say a", "say b"]},
                {"id": 3, "username": "bob", "must_be_online": false, "steam_id": "76562222", "commands": []}
            ]
        }"#;

        let entries = parse_queue(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 7);
        assert!(entries[0].must_be_online);
        assert_eq!(entries[0].commands, vec!["say a", "say b"]);
        assert_eq!(entries[1].id, 3);
        assert_eq!(entries[1].steam_id, "76562222");
    }

    #[test]
    fn test_parse_queue_numeric_steam_id() {
        let body = r#"{"status":200,"data":[
            {"id":1,"username":"alice","must_be_online":false,"steam_id":76561198000000000,"commands":["say hi"]},
            {"id":2,"username":"bob","must_be_online":false,"steam_id":"76561198000000001","commands":[]}
        ]}"#;

        let entries = parse_queue(body).unwrap();
        assert_eq!(entries[0].steam_id, "76561198000000000");
        assert_eq!(entries[1].steam_id, "76561198000000001");
    }

    #[test]
    fn test_parse_queue_rejects_non_scalar_steam_id() {
        assert!(parse_queue(r#"{"data":[{"id":1,"steam_id":{"v":1},"commands":[]}]}"#).is_err());
    }

    #[test]
    fn test_parse_queue_null_data() {
        assert!(parse_queue(r#"{"status": 200, "data": null}"#).unwrap().is_empty());
        assert!(parse_queue(r#"{"status": 200}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_queue_malformed() {
        assert!(parse_queue("<html>502 Bad Gateway</html>").is_err());
        assert!(parse_queue(r#"{"data": [{"id": "x"}]}"#).is_err());
    }

    #[test]
    fn test_parse_error_message() {
        assert_eq!(
            parse_error_message(r#"{"message": "Invalid token"}"#).as_deref(),
            Some("Invalid token")
        );
        assert_eq!(parse_error_message(r#"{"message": ""}"#), None);
        assert_eq!(parse_error_message(r#"{"error": "nope"}"#), None);
        assert_eq!(parse_error_message("Internal Server Error"), None);
    }

    #[test]
    fn test_encode_ids() {
        assert_eq!(encode_ids(&[1, 2, 42]), "[1,2,42]");
        assert_eq!(encode_ids(&[]), "[]");
    }
}
