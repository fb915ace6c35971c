use super::{Implementation, RequestId};
use crate::tools::Tool;
use serde::{Deserialize, Serialize};

/// One line sent back to the host in answer to a request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutgoingMessage {
    pub jsonrpc: String,
    /// `null` only when the request could not be parsed far enough to learn its id.
    pub id: Option<RequestId>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(serde_json::Value),
    Error(RpcError),
}

impl OutgoingMessage {
    pub fn result(id: Option<RequestId>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: super::JSONRPC_VERSION.to_string(),
            id,
            outcome: Outcome::Result(result),
        }
    }

    pub fn error(id: Option<RequestId>, error: RpcError) -> Self {
        Self {
            jsonrpc: super::JSONRPC_VERSION.to_string(),
            id,
            outcome: Outcome::Error(error),
        }
    }

    /// Decodes a successful result, turning a protocol error into an `eyre` error.
    pub fn into_result<T: serde::de::DeserializeOwned>(self) -> eyre::Result<T> {
        match self.outcome {
            Outcome::Result(value) => Ok(serde_json::from_value(value)?),
            Outcome::Error(e) => eyre::bail!("request failed with code {}: {}", e.code, e.message),
        }
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::new(Self::PARSE_ERROR, format!("Parse error: {detail}"))
    }

    pub fn invalid_request(detail: impl std::fmt::Display) -> Self {
        Self::new(Self::INVALID_REQUEST, format!("Invalid request: {detail}"))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            Self::METHOD_NOT_FOUND,
            format!("Method not found: {method}"),
        )
    }

    pub fn invalid_params(detail: impl std::fmt::Display) -> Self {
        Self::new(Self::INVALID_PARAMS, format!("Invalid params: {detail}"))
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self::new(Self::INTERNAL_ERROR, format!("Internal error: {detail}"))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// We never emit `notifications/tools/list_changed`; the catalogue is fixed at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListToolsResult {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
#[non_exhaustive]
pub enum Content {
    Text { text: String },
}

/// The answer to a `tools/call` request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    /// Wraps a tool's JSON result as compact text.
    ///
    /// Objects carrying an `error` key are flagged with `isError` so the host can tell them
    /// apart without parsing the text.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let is_error = value.get("error").is_some().then_some(true);
        Self {
            content: vec![Content::Text {
                text: value.to_string(),
            }],
            is_error,
        }
    }

    /// Concatenated text of every text block.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                Content::Text { text } => text.as_str(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use serde_json::json;

    #[test]
    fn test_result_and_error_shapes() {
        let ok = OutgoingMessage::result(Some(RequestId::Number(1)), json!({}));
        assert_snapshot!(serde_json::to_string(&ok).unwrap(), @r#"{"jsonrpc":"2.0","id":1,"result":{}}"#);

        let err = OutgoingMessage::error(None, RpcError::parse_error("expected value"));
        assert_snapshot!(
            serde_json::to_string(&err).unwrap(),
            @r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700,"message":"Parse error: expected value"}}"#
        );
    }

    #[test]
    fn test_call_tool_result_flags_errors() {
        let ok = CallToolResult::from_value(&json!({"total": 0, "folders": []}));
        assert_eq!(ok.is_error, None);
        assert_eq!(ok.text(), r#"{"total":0,"folders":[]}"#);

        let err = CallToolResult::from_value(&json!({"error": "Unknown tool: nope"}));
        assert_eq!(err.is_error, Some(true));
        assert_snapshot!(
            serde_json::to_string(&err).unwrap(),
            @r#"{"content":[{"type":"text","text":"{\"error\":\"Unknown tool: nope\"}"}],"isError":true}"#
        );
    }

    #[test]
    fn test_into_result() {
        let ok = OutgoingMessage::result(Some(RequestId::Number(1)), json!({"tools": []}));
        let list: ListToolsResult = ok.into_result().unwrap();
        assert!(list.tools.is_empty());

        let err = OutgoingMessage::error(
            Some(RequestId::Number(2)),
            RpcError::method_not_found("nope"),
        );
        let e = err.into_result::<ListToolsResult>().unwrap_err();
        assert_snapshot!(e, @"request failed with code -32601: Method not found: nope");
    }
}
