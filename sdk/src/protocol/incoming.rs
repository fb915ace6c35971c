use super::RpcError;
use serde::{Deserialize, Serialize};

/// Identifier the host attaches to a request; echoed verbatim in the response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

/// One line received from the host.
///
/// Messages without an `id` are notifications and never get a response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IncomingMessage {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// The requests this SDK knows how to answer.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum HostRequest {
    Initialize(InitializeParams),
    Ping,
    ListTools,
    CallTool(CallToolParams),
}

impl IncomingMessage {
    pub fn request(method: &str, id: RequestId, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: super::JSONRPC_VERSION.to_string(),
            id: Some(id),
            method: method.to_string(),
            params,
        }
    }

    pub fn notification(method: &str, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: super::JSONRPC_VERSION.to_string(),
            id: None,
            method: method.to_string(),
            params,
        }
    }

    /// Decodes the method and its parameters.
    pub fn into_request(self) -> Result<HostRequest, RpcError> {
        if self.jsonrpc != super::JSONRPC_VERSION {
            return Err(RpcError::invalid_request(format!(
                "unsupported jsonrpc version {:?}",
                self.jsonrpc
            )));
        }

        match self.method.as_str() {
            "initialize" => {
                let params = match self.params {
                    Some(params) => serde_json::from_value(params)
                        .map_err(|e| RpcError::invalid_params(e.to_string()))?,
                    None => InitializeParams::default(),
                };
                Ok(HostRequest::Initialize(params))
            }
            "ping" => Ok(HostRequest::Ping),
            "tools/list" => Ok(HostRequest::ListTools),
            "tools/call" => {
                let Some(params) = self.params else {
                    return Err(RpcError::invalid_params("tools/call requires params"));
                };
                let params = serde_json::from_value(params)
                    .map_err(|e| RpcError::invalid_params(e.to_string()))?;
                Ok(HostRequest::CallTool(params))
            }
            other => Err(RpcError::method_not_found(other)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol revision the host would like to speak.
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub client_info: Option<super::Implementation>,
    #[serde(default)]
    pub capabilities: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallToolParams {
    pub name: String,
    /// Flat mapping of argument name to value. Absent and `null` both mean "no arguments".
    #[serde(default)]
    pub arguments: Option<serde_json::Map<String, serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_tool_deserialization() {
        let json = r#"
        {
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": {
                "name": "get_video",
                "arguments": {"video_id": "123"}
            }
        }"#;

        let parsed: IncomingMessage = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, Some(RequestId::Number(7)));

        let HostRequest::CallTool(call) = parsed.into_request().unwrap() else {
            panic!("Expected tools/call request");
        };
        assert_eq!(call.name, "get_video");
        assert_eq!(call.arguments.unwrap()["video_id"], "123");
    }

    #[test]
    fn test_string_ids_and_missing_params() {
        let json = r#"{"jsonrpc": "2.0", "id": "abc", "method": "initialize"}"#;
        let parsed: IncomingMessage = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, Some(RequestId::String("abc".into())));
        assert!(matches!(
            parsed.into_request(),
            Ok(HostRequest::Initialize(InitializeParams {
                protocol_version: None,
                ..
            }))
        ));
    }

    #[test]
    fn test_notification_has_no_id() {
        let json = r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#;
        let parsed: IncomingMessage = serde_json::from_str(json).unwrap();
        assert!(parsed.id.is_none());
    }

    #[test]
    fn test_request_errors() {
        let unknown = IncomingMessage::request("resources/list", RequestId::Number(1), None);
        let err = unknown.into_request().unwrap_err();
        assert_eq!(err.code, RpcError::METHOD_NOT_FOUND);

        let no_params = IncomingMessage::request("tools/call", RequestId::Number(2), None);
        let err = no_params.into_request().unwrap_err();
        assert_eq!(err.code, RpcError::INVALID_PARAMS);

        let no_name = IncomingMessage::request(
            "tools/call",
            RequestId::Number(3),
            Some(serde_json::json!({"arguments": {}})),
        );
        let err = no_name.into_request().unwrap_err();
        assert_eq!(err.code, RpcError::INVALID_PARAMS);

        let mut old = IncomingMessage::request("ping", RequestId::Number(4), None);
        old.jsonrpc = "1.0".to_string();
        let err = old.into_request().unwrap_err();
        assert_eq!(err.code, RpcError::INVALID_REQUEST);
    }
}
