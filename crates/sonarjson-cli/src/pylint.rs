//! Pylint JSON output reader
//!
//! Accepts both `--output-format=json` (a bare array, `message-id` keys) and
//! `--output-format=json2` (`{"messages": [...]}`, `messageId` keys).

use serde::Deserialize;
use sonarjson_core::RawIssue;

/// One message as Pylint writes it
#[derive(Debug, Clone, Deserialize)]
pub struct PylintMessage {
    #[serde(rename = "message-id", alias = "messageId")]
    pub message_id: String,

    #[serde(default)]
    pub message: Option<String>,

    pub path: String,

    pub line: u32,

    pub column: u32,

    #[serde(default, rename = "endLine")]
    pub end_line: Option<u32>,

    #[serde(default, rename = "endColumn")]
    pub end_column: Option<u32>,
}

impl From<PylintMessage> for RawIssue {
    fn from(msg: PylintMessage) -> Self {
        RawIssue::new(
            msg.message_id,
            msg.message.unwrap_or_default(),
            msg.path,
            msg.line,
            msg.column,
        )
        .with_end(msg.end_line, msg.end_column)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PylintOutput {
    Json(Vec<PylintMessage>),
    Json2 { messages: Vec<PylintMessage> },
}

/// Parse Pylint's JSON output into issues, in the order Pylint emitted them
pub fn parse_messages(json: &str) -> Result<Vec<RawIssue>, serde_json::Error> {
    // Pylint writes nothing at all when there is nothing to report in some modes.
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }

    let messages = match serde_json::from_str(json)? {
        PylintOutput::Json(messages) => messages,
        PylintOutput::Json2 { messages } => messages,
    };
    Ok(messages.into_iter().map(RawIssue::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_json_format() {
        let json = r#"[
            {
                "type": "convention",
                "module": "pkg.mod",
                "obj": "",
                "line": 1,
                "column": 0,
                "endLine": null,
                "endColumn": null,
                "path": "pkg/mod.py",
                "symbol": "missing-module-docstring",
                "message": "Missing module docstring",
                "message-id": "C0114"
            },
            {
                "type": "warning",
                "module": "pkg.mod",
                "obj": "",
                "line": 3,
                "column": 0,
                "endLine": 3,
                "endColumn": 9,
                "path": "pkg/mod.py",
                "symbol": "unused-import",
                "message": "Unused import os",
                "message-id": "W0611"
            }
        ]"#;

        let issues = parse_messages(json).unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0], RawIssue::new("C0114", "Missing module docstring", "pkg/mod.py", 1, 0));
        assert_eq!(issues[1].msg_id, "W0611");
        assert_eq!(issues[1].end_line, Some(3));
        assert_eq!(issues[1].end_column, Some(9));
    }

    #[test]
    fn parse_json2_format() {
        let json = r#"{
            "messages": [
                {
                    "type": "error",
                    "symbol": "function-redefined",
                    "message": "function already defined line 1",
                    "messageId": "E0102",
                    "confidence": "UNDEFINED",
                    "module": "a",
                    "obj": "f",
                    "line": 4,
                    "column": 0,
                    "endLine": 4,
                    "endColumn": 5,
                    "path": "a.py",
                    "absolutePath": "/src/a.py"
                }
            ],
            "statistics": {"messageTypeCount": {"error": 1}}
        }"#;

        let issues = parse_messages(json).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].msg_id, "E0102");
        assert_eq!(issues[0].line, 4);
    }

    #[test]
    fn missing_message_becomes_empty() {
        let json = r#"[{"message-id": "C0114", "path": "a.py", "line": 1, "column": 0}]"#;
        let issues = parse_messages(json).unwrap();
        assert_eq!(issues[0].message, "");
    }

    #[test]
    fn empty_input() {
        assert!(parse_messages("").unwrap().is_empty());
        assert!(parse_messages("[]").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_messages("not json").is_err());
    }
}
