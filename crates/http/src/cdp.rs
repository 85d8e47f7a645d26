//! Single-shot Chrome DevTools Protocol evaluation over WebSocket

use std::time::Duration;

use clip_core::{Error, Result};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

const EVALUATE_ID: u64 = 1;

/// Evaluate `expression` in the target behind `ws_url` and return its value
///
/// The connection attempt is raced against `connect_timeout`; the reply must
/// arrive within `eval_timeout`, which also bounds promises that never settle.
pub async fn evaluate(
    ws_url: &str,
    expression: &str,
    connect_timeout: Duration,
    eval_timeout: Duration,
) -> Result<Value> {
    // Some Chrome builds only listen on IPv4
    let ws_url = ws_url.replacen("localhost", "127.0.0.1", 1);
    tracing::debug!(url = %ws_url, "Connecting to DevTools target");

    let connected = tokio::select! {
        result = connect_async(ws_url.as_str()) => result
            .map_err(|e| Error::Transport(format!("Failed to connect to {ws_url}: {e}")))?,
        () = tokio::time::sleep(connect_timeout) => {
            return Err(Error::Transport(format!(
                "Timed out connecting to {ws_url} after {}ms",
                connect_timeout.as_millis()
            )));
        }
    };
    let (mut socket, _) = connected;

    let command = json!({
        "id": EVALUATE_ID,
        "method": "Runtime.evaluate",
        "params": {
            "expression": expression,
            "returnByValue": true,
            "awaitPromise": true,
        },
    });
    socket
        .send(Message::Text(command.to_string()))
        .await
        .map_err(|e| Error::Transport(format!("Failed to send command: {e}")))?;

    let outcome = match tokio::time::timeout(eval_timeout, read_reply(&mut socket)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::debug!(timeout_ms = eval_timeout.as_millis(), "No evaluation reply");
            return Err(Error::Transport("JavaScript execution timed out".into()));
        }
    };

    if let Err(e) = socket.close(None).await {
        tracing::debug!(error = %e, "Failed to close DevTools connection");
    }
    outcome
}

/// Read messages until the reply to the evaluate command arrives
async fn read_reply<S>(socket: &mut S) -> Result<Value>
where
    S: futures::Stream<Item = std::result::Result<Message, WsError>> + Unpin,
{
    while let Some(message) = socket.next().await {
        match message {
            Ok(Message::Text(text)) => {
                let response: Value = serde_json::from_str(&text)?;
                // Events carry no id; skip them
                if response.get("id").and_then(Value::as_u64) == Some(EVALUATE_ID) {
                    return evaluation_result(response);
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::Transport(format!("WebSocket read error: {e}"))),
        }
    }

    Err(Error::Transport(
        "DevTools connection closed before a response".into(),
    ))
}

/// Extract the value from a `Runtime.evaluate` response
fn evaluation_result(response: Value) -> Result<Value> {
    if let Some(error) = response.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(Error::Remote {
            status: 0,
            message: format!("DevTools error: {message}"),
        });
    }

    let result = response.get("result").cloned().unwrap_or(Value::Null);
    if let Some(details) = result.get("exceptionDetails") {
        let message = details
            .pointer("/exception/description")
            .or_else(|| details.get("text"))
            .and_then(Value::as_str)
            .unwrap_or("exception");
        return Err(Error::Remote {
            status: 0,
            message: format!("Evaluation failed: {message}"),
        });
    }

    Ok(result
        .pointer("/result/value")
        .cloned()
        .unwrap_or(Value::Null))
}
