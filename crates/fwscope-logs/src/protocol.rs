use serde::{Deserialize, Serialize};

use fwscope_types::{FirewallLog, LogFilters};

use crate::engine::process_logs;

/// Message sent to the log worker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerRequest {
    /// Merge `logs` into `current_logs`, filter, sort newest first, and limit
    #[serde(rename = "processlogs", rename_all = "camelCase")]
    ProcessLogs {
        logs: Vec<FirewallLog>,
        #[serde(default)]
        current_logs: Vec<FirewallLog>,
        #[serde(default)]
        filters: LogFilters,
        limit: usize,
    },
}

/// Message sent back by the log worker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerResponse {
    #[serde(rename = "processedlogs")]
    ProcessedLogs { logs: Vec<FirewallLog> },
}

impl WorkerRequest {
    pub fn process_logs(
        logs: Vec<FirewallLog>,
        current_logs: Vec<FirewallLog>,
        filters: LogFilters,
        limit: usize,
    ) -> Self {
        Self::ProcessLogs {
            logs,
            current_logs,
            filters,
            limit,
        }
    }

    /// Run the request to completion
    pub fn handle(self) -> WorkerResponse {
        match self {
            Self::ProcessLogs {
                logs,
                current_logs,
                filters,
                limit,
            } => WorkerResponse::ProcessedLogs {
                logs: process_logs(logs, current_logs, &filters, limit),
            },
        }
    }
}

impl WorkerResponse {
    /// Take the processed batch out of the response
    pub fn into_logs(self) -> Vec<FirewallLog> {
        match self {
            Self::ProcessedLogs { logs } => logs,
        }
    }
}

/// Handle one raw JSON message
///
/// Anything that isn't a well-formed `processlogs` request is dropped and
/// yields no reply.
pub fn dispatch(message: &str) -> Option<String> {
    let request: WorkerRequest = match serde_json::from_str(message) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!("ignoring worker message: {}", e);
            return None;
        }
    };

    serde_json::to_string(&request.handle()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn request() -> Value {
        json!({
            "type": "processlogs",
            "logs": [
                { "action": "block", "interface": "wan", "label": "in", "__timestamp__": "2024-01-02T00:00:00Z" }
            ],
            "currentLogs": [
                { "action": "pass", "interface": "lan", "label": "out", "__timestamp__": "2024-01-01T00:00:00Z" }
            ],
            "filters": { "action": "", "interface": "", "direction": "" },
            "limit": 10
        })
    }

    #[test]
    fn test_dispatch_processes_request() {
        let reply = dispatch(&request().to_string()).unwrap();
        let reply: Value = serde_json::from_str(&reply).unwrap();

        assert_eq!(reply["type"], "processedlogs");
        let logs = reply["logs"].as_array().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0]["__timestamp__"], "2024-01-02T00:00:00Z");
        assert_eq!(logs[1]["action"], "pass");
    }

    #[test]
    fn test_dispatch_applies_filters_and_limit() {
        let mut message = request();
        message["filters"]["action"] = json!("pass");
        let reply: Value = serde_json::from_str(&dispatch(&message.to_string()).unwrap()).unwrap();
        assert_eq!(reply["logs"].as_array().unwrap().len(), 1);
        assert_eq!(reply["logs"][0]["__timestamp__"], "2024-01-01T00:00:00Z");

        let mut message = request();
        message["limit"] = json!(1);
        let reply: Value = serde_json::from_str(&dispatch(&message.to_string()).unwrap()).unwrap();
        assert_eq!(reply["logs"].as_array().unwrap().len(), 1);
        assert_eq!(reply["logs"][0]["__timestamp__"], "2024-01-02T00:00:00Z");
    }

    #[test]
    fn test_dispatch_ignores_unknown_messages() {
        assert!(dispatch(r#"{"type":"ping"}"#).is_none());
        assert!(dispatch("not json").is_none());
        assert!(dispatch(r#"{"logs":[]}"#).is_none());
    }

    #[test]
    fn test_request_wire_shape() {
        let request: WorkerRequest = serde_json::from_value(request()).unwrap();
        let WorkerRequest::ProcessLogs {
            logs,
            current_logs,
            limit,
            ..
        } = &request;
        assert_eq!(logs.len(), 1);
        assert_eq!(current_logs.len(), 1);
        assert_eq!(*limit, 10);

        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["type"], "processlogs");
        assert!(encoded.get("currentLogs").is_some());
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let request = WorkerRequest::process_logs(
            vec![serde_json::from_value(json!({ "rid": "abc123", "ttl": 64 })).unwrap()],
            Vec::new(),
            LogFilters::default(),
            5,
        );
        let logs = request.handle().into_logs();
        assert_eq!(
            serde_json::to_value(&logs[0]).unwrap(),
            json!({ "rid": "abc123", "ttl": 64 })
        );
    }

    #[test]
    fn test_records_come_back_byte_for_byte() {
        let record = r#"{"action":null,"digest":"abc","label":{"text":"allow-in"},"srcport":443}"#;
        let message = format!(r#"{{"type":"processlogs","logs":[{}],"limit":5}}"#, record);

        let reply = dispatch(&message).unwrap();
        assert_eq!(reply, format!(r#"{{"type":"processedlogs","logs":[{}]}}"#, record));
    }

    #[test]
    fn test_record_with_both_digest_keys_is_processed() {
        let message = json!({
            "type": "processlogs",
            "logs": [{ "digest": "a", "__digest__": "b", "action": "pass" }],
            "limit": 5
        });

        let reply: Value = serde_json::from_str(&dispatch(&message.to_string()).unwrap()).unwrap();
        assert_eq!(
            reply["logs"],
            json!([{ "digest": "a", "__digest__": "b", "action": "pass" }])
        );
    }
}
