//! The request/response loop between a host and a [`ToolHandler`].

use crate::protocol::{
    CallToolResult, HostRequest, Implementation, IncomingMessage, InitializeResult,
    LATEST_PROTOCOL_VERSION, ListToolsResult, OutgoingMessage, RpcError, ServerCapabilities,
};
use crate::tools::Tool;
use eyre::Context;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufWriter};

/// The callable surface of a server.
pub trait ToolHandler {
    /// Every tool this handler answers to, in the order the host should list them.
    fn tools(&self) -> Vec<Tool>;

    /// Runs the named tool.
    ///
    /// Always produces a JSON result. Failures, including unknown names, are expected to be
    /// reported as error-shaped objects rather than by aborting, so one bad call never takes the
    /// connection down.
    fn call(
        &self,
        name: &str,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> impl Future<Output = serde_json::Value> + Send;
}

#[derive(Debug, Clone)]
pub struct Server {
    info: Implementation,
    instructions: Option<String>,
}

impl Server {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: Implementation {
                name: name.into(),
                version: version.into(),
            },
            instructions: None,
        }
    }

    /// Free-form usage hints returned from `initialize`.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Serves the host on this process' stdin and stdout until stdin closes.
    ///
    /// Nothing else may write to stdout while this runs.
    pub async fn serve_stdio<H: ToolHandler>(&self, handler: &H) -> eyre::Result<()> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        self.serve(stdin, tokio::io::stdout(), handler).await
    }

    /// Reads requests from `reader` and writes responses to `writer` until `reader` hits EOF.
    ///
    /// Requests are answered strictly one at a time, in arrival order.
    pub async fn serve<R, W, H>(&self, mut reader: R, writer: W, handler: &H) -> eyre::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        H: ToolHandler,
    {
        let mut writer = BufWriter::new(writer);

        // Set up re-use buffers
        let mut line = Vec::new();
        let mut out_buf = Vec::new();

        loop {
            line.clear();
            let n = reader
                .read_until(b'\n', &mut line)
                .await
                .context("read incoming message from host")?;
            if n == 0 {
                tracing::info!("host closed its end of the connection, exiting");
                break;
            }

            let response = match std::str::from_utf8(&line) {
                Ok(message) => {
                    let message = message.trim();
                    if message.is_empty() {
                        continue;
                    }
                    tracing::trace!(json = message, "recv");
                    self.respond(message, handler).await
                }
                Err(e) => {
                    tracing::warn!(error = %e, "host sent a line that is not UTF-8");
                    Some(OutgoingMessage::error(None, RpcError::parse_error(e)))
                }
            };
            let Some(response) = response else {
                continue;
            };

            serde_json::to_writer(&mut out_buf, &response).context("serialize response")?;
            tracing::trace!(json = %String::from_utf8_lossy(&out_buf), "send");
            out_buf.push(b'\n');
            writer
                .write_all(&out_buf)
                .await
                .context("send response to host")?;
            writer.flush().await.context("flush response")?;
            out_buf.clear();
        }

        Ok(())
    }

    /// Produces the response to one raw line, or `None` if the line was a notification.
    pub async fn respond<H: ToolHandler>(&self, line: &str, handler: &H) -> Option<OutgoingMessage> {
        let message: IncomingMessage = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "host sent unparseable message");
                return Some(OutgoingMessage::error(None, RpcError::parse_error(e)));
            }
        };

        let Some(id) = message.id.clone() else {
            tracing::debug!(method = %message.method, "notification");
            return None;
        };

        let method = message.method.clone();
        let request = match message.into_request() {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(%method, error = %e.message, "rejecting request");
                return Some(OutgoingMessage::error(Some(id), e));
            }
        };

        let result = match request {
            HostRequest::Initialize(params) => {
                if let Some(client) = &params.client_info {
                    tracing::info!(client = %client.name, version = %client.version, "host connected");
                }
                serde_json::to_value(InitializeResult {
                    protocol_version: params
                        .protocol_version
                        .unwrap_or_else(|| LATEST_PROTOCOL_VERSION.to_string()),
                    capabilities: ServerCapabilities::default(),
                    server_info: self.info.clone(),
                    instructions: self.instructions.clone(),
                })
            }
            HostRequest::Ping => Ok(serde_json::json!({})),
            HostRequest::ListTools => serde_json::to_value(ListToolsResult {
                tools: handler.tools(),
            }),
            HostRequest::CallTool(params) => {
                tracing::debug!(tool = %params.name, "tool called");
                let value = handler
                    .call(&params.name, params.arguments.unwrap_or_default())
                    .await;
                serde_json::to_value(CallToolResult::from_value(&value))
            }
        };

        Some(match result {
            Ok(result) => OutgoingMessage::result(Some(id), result),
            Err(e) => OutgoingMessage::error(Some(id), RpcError::internal(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Outcome, RequestId};
    use crate::tools::{InputSchema, Property};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Echo;

    impl ToolHandler for Echo {
        fn tools(&self) -> Vec<Tool> {
            vec![
                Tool::builder()
                    .name("echo")
                    .description("Returns its arguments")
                    .input_schema(InputSchema::empty().optional("text", Property::string("Text")))
                    .build()
                    .unwrap(),
            ]
        }

        async fn call(
            &self,
            name: &str,
            arguments: serde_json::Map<String, serde_json::Value>,
        ) -> serde_json::Value {
            match name {
                "echo" => serde_json::Value::Object(arguments),
                other => json!({ "error": format!("Unknown tool: {other}") }),
            }
        }
    }

    async fn run(input: &[u8]) -> Vec<serde_json::Value> {
        let mut output = Vec::new();
        Server::new("test", "0.0.0")
            .serve(input, &mut output, &Echo)
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_full_session() {
        let input = [
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","clientInfo":{"name":"host","version":"1"}}}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"echo","arguments":{"text":"hi"}}}"#,
            "",
            r#"{"jsonrpc":"2.0","id":4,"method":"ping"}"#,
        ]
        .join("\n");

        let responses = run(input.as_bytes()).await;
        assert_eq!(responses.len(), 4, "notifications and blank lines get no answer");

        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "test");
        assert_eq!(responses[1]["result"]["tools"][0]["name"], "echo");
        assert_eq!(
            responses[2]["result"],
            json!({"content": [{"type": "text", "text": r#"{"text":"hi"}"#}]})
        );
        assert_eq!(responses[3], json!({"jsonrpc": "2.0", "id": 4, "result": {}}));
    }

    #[tokio::test]
    async fn test_errors_do_not_end_the_session() {
        let input = [
            "this is not json",
            r#"{"jsonrpc":"2.0","id":"a","method":"resources/list"}"#,
            r#"{"jsonrpc":"2.0","id":"b","method":"tools/call","params":{"name":"nope"}}"#,
            r#"{"jsonrpc":"2.0","id":"c","method":"ping"}"#,
        ]
        .join("\n");

        let responses = run(input.as_bytes()).await;
        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["id"], serde_json::Value::Null);
        assert_eq!(responses[0]["error"]["code"], RpcError::PARSE_ERROR);
        assert_eq!(responses[1]["error"]["code"], RpcError::METHOD_NOT_FOUND);
        assert_eq!(responses[2]["result"]["isError"], true);
        assert_eq!(responses[3]["id"], "c");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_a_parse_error() {
        let mut input = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"\xff\xfe\"}\n".to_vec();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#);

        let responses = run(&input).await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], serde_json::Value::Null);
        assert_eq!(responses[0]["error"]["code"], RpcError::PARSE_ERROR);
        assert_eq!(responses[1], json!({"jsonrpc": "2.0", "id": 2, "result": {}}));
    }

    #[tokio::test]
    async fn test_respond_defaults_protocol_version() {
        let response = Server::new("test", "0.0.0")
            .with_instructions("be nice")
            .respond(r#"{"jsonrpc":"2.0","id":9,"method":"initialize"}"#, &Echo)
            .await
            .unwrap();
        assert_eq!(response.id, Some(RequestId::Number(9)));
        let Outcome::Result(result) = response.outcome else {
            panic!("expected result, got {:?}", response.outcome);
        };
        assert_eq!(result["protocolVersion"], LATEST_PROTOCOL_VERSION);
        assert_eq!(result["instructions"], "be nice");
        assert_eq!(result["capabilities"], json!({"tools": {}}));
    }
}
