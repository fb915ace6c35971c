//! Mock host for testing tool servers.
//!
//! The mock host talks to a [`Server`] over an in-memory pipe using the real wire format, so
//! tests exercise exactly what a host would see: framing, ids, error objects and the compact
//! text payload of each tool result.

use crate::protocol::{
    CallToolResult, IncomingMessage, InitializeResult, ListToolsResult, OutgoingMessage,
    RequestId,
};
use crate::server::{Server, ToolHandler};
use crate::tools::Tool;
use eyre::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;

/// A host connected to a running [`Server`].
#[derive(Debug)]
pub struct MockHost {
    writer: WriteHalf<DuplexStream>,
    reader: BufReader<ReadHalf<DuplexStream>>,
    next_id: i64,
    server: JoinHandle<Result<()>>,
}

impl MockHost {
    /// Spawns `server` with `handler` and connects to it.
    pub fn start<H>(server: Server, handler: H) -> Self
    where
        H: ToolHandler + Send + Sync + 'static,
    {
        let (host_side, server_side) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server_side);
        let server = tokio::spawn(async move {
            server
                .serve(BufReader::new(server_read), server_write, &handler)
                .await
        });

        let (read, writer) = tokio::io::split(host_side);
        Self {
            writer,
            reader: BufReader::new(read),
            next_id: 1,
            server,
        }
    }

    /// Sends one line verbatim.
    pub async fn send_raw(&mut self, line: &str) -> Result<()> {
        tracing::trace!(json = line, "mock host -> server");
        self.writer
            .write_all(line.as_bytes())
            .await
            .context("write message to server")?;
        self.writer
            .write_all(b"\n")
            .await
            .context("write newline to server")?;
        self.writer.flush().await.context("flush to server")
    }

    /// Waits for the next response line.
    pub async fn recv(&mut self) -> Result<OutgoingMessage> {
        let mut line = String::new();
        let n = self
            .reader
            .read_line(&mut line)
            .await
            .context("read from server")?;
        if n == 0 {
            eyre::bail!("server closed the connection");
        }
        tracing::trace!(json = line.trim(), "server -> mock host");
        serde_json::from_str(&line).context("parse response from server")
    }

    /// Sends a request with a fresh id and waits for its response.
    pub async fn request(
        &mut self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<OutgoingMessage> {
        let id = RequestId::Number(self.next_id);
        self.next_id += 1;

        let json = serde_json::to_string(&IncomingMessage::request(method, id.clone(), params))
            .context("serialize request")?;
        self.send_raw(&json).await?;

        let response = self.recv().await?;
        if response.id.as_ref() != Some(&id) {
            eyre::bail!("response id {:?} does not match request id {id:?}", response.id);
        }
        Ok(response)
    }

    /// Sends a notification; nothing comes back.
    pub async fn notify(&mut self, method: &str, params: Option<serde_json::Value>) -> Result<()> {
        let json = serde_json::to_string(&IncomingMessage::notification(method, params))
            .context("serialize notification")?;
        self.send_raw(&json).await
    }

    /// Performs the `initialize` handshake, including the trailing notification.
    pub async fn initialize(&mut self) -> Result<InitializeResult> {
        let response = self
            .request(
                "initialize",
                Some(serde_json::json!({
                    "protocolVersion": crate::protocol::LATEST_PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {"name": "mock-host", "version": "0.0.0"},
                })),
            )
            .await?;
        let result = response.into_result().context("initialize")?;
        self.notify("notifications/initialized", None).await?;
        Ok(result)
    }

    pub async fn list_tools(&mut self) -> Result<Vec<Tool>> {
        let response = self.request("tools/list", None).await?;
        let result: ListToolsResult = response.into_result().context("tools/list")?;
        Ok(result.tools)
    }

    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult> {
        let response = self
            .request(
                "tools/call",
                Some(serde_json::json!({"name": name, "arguments": arguments})),
            )
            .await?;
        response
            .into_result()
            .with_context(|| format!("tools/call {name}"))
    }

    /// Calls a tool and decodes the JSON carried in its text content.
    pub async fn call_tool_json(
        &mut self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let result = self.call_tool(name, arguments).await?;
        serde_json::from_str(&result.text()).context("parse tool result text as JSON")
    }

    /// Closes the host side and waits for the server loop to finish.
    pub async fn shutdown(self) -> Result<()> {
        let Self { writer, server, .. } = self;
        drop(writer);
        server.await.context("join server task")?
    }
}
