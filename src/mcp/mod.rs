//! Model Context Protocol server on stdio: newline delimited JSON-RPC 2.0,
//! one request per line, one response per line. Only the tools capability
//! is offered.

mod tools;

use crate::error::PlannerError;
use crate::service::Planner;
use anyhow::Result;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use thiserror::Error;

const JSONRPC_VERSION: &str = "2.0";
const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

const INSTRUCTIONS: &str = "Weekly planner. Items live on a day or in the backlog. \
Refer to items by id or exact title; when a title is ambiguous use the id from list_todos.";

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    InvalidParams(String),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RpcError {
    fn code(&self) -> i64 {
        match self {
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
            Self::Planner(PlannerError::Store(_)) | Self::Encode(_) => INTERNAL_ERROR,
            Self::Planner(_) | Self::UnknownTool(_) | Self::InvalidParams(_) => INVALID_PARAMS,
        }
    }

    fn data(&self) -> Option<Value> {
        match self {
            Self::Planner(err) => Some(json!({ "kind": err.kind() })),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Request {
    /// Absent on notifications
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Answer requests from `input` until it closes. `clock` is consulted before
/// every message so a long running session rolls over at midnight.
pub fn serve(
    planner: &mut Planner,
    input: impl BufRead,
    mut output: impl Write,
    clock: impl Fn() -> NaiveDate,
) -> Result<()> {
    tracing::info!("tool server listening on stdio");

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        advance_day(planner, clock());

        if let Some(response) = handle_message(planner, &line) {
            serde_json::to_writer(&mut output, &response)?;
            output.write_all(b"\n")?;
            output.flush()?;
        }
    }

    tracing::info!("stdin closed, tool server stopping");
    Ok(())
}

fn advance_day(planner: &mut Planner, today: NaiveDate) {
    if today <= planner.today() {
        return;
    }
    planner.set_today(today);
    match planner.auto_rollover() {
        Ok(moved) if moved > 0 => tracing::info!(moved, %today, "rolled over"),
        Ok(_) => {}
        Err(err) => tracing::warn!(error = %err, "rollover failed"),
    }
}

/// Handle one line of input. Notifications get no response.
pub fn handle_message(planner: &mut Planner, line: &str) -> Option<Value> {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(error = %err, "unparseable message");
            return Some(error_response(
                Value::Null,
                PARSE_ERROR,
                &format!("parse error: {err}"),
                None,
            ));
        }
    };

    let Some(id) = request.id else {
        tracing::debug!(method = %request.method, "notification");
        return None;
    };

    let response = match dispatch(planner, &request.method, request.params) {
        Ok(result) => json!({ "jsonrpc": JSONRPC_VERSION, "id": id, "result": result }),
        Err(err) => {
            tracing::debug!(method = %request.method, error = %err, "request failed");
            error_response(id, err.code(), &err.to_string(), err.data())
        }
    };
    Some(response)
}

fn dispatch(planner: &mut Planner, method: &str, params: Value) -> Result<Value, RpcError> {
    match method {
        "initialize" => {
            let version = params
                .get("protocolVersion")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_PROTOCOL_VERSION);
            Ok(json!({
                "protocolVersion": version,
                "capabilities": { "tools": {} },
                "serverInfo": { "name": "weekboard", "version": env!("CARGO_PKG_VERSION") },
                "instructions": INSTRUCTIONS,
            }))
        }
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": tools::descriptions() })),
        "tools/call" => {
            let call: CallParams = serde_json::from_value(params)
                .map_err(|err| RpcError::InvalidParams(format!("invalid call: {err}")))?;
            tracing::debug!(tool = %call.name, "tool call");

            let value = tools::call(planner, &call.name, call.arguments)?;
            let text = serde_json::to_string_pretty(&value)?;
            Ok(json!({
                "content": [{ "type": "text", "text": text }],
                "structuredContent": value,
            }))
        }
        other => Err(RpcError::MethodNotFound(other.to_string())),
    }
}

fn error_response(id: Value, code: i64, message: &str, data: Option<Value>) -> Value {
    let mut error = json!({ "code": code, "message": message });
    if let Some(data) = data {
        error["data"] = data;
    }
    json!({ "jsonrpc": JSONRPC_VERSION, "id": id, "error": error })
}
