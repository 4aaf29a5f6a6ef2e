use parking_lot::Mutex;
use serde_json::Value;

pub const DEFAULT_CALLBACK_FUNCTION: &str = "window.NativeBridge.handleCallback";

/// Delivers a serialized response to the web content. Always called on the
/// main context.
pub trait ResponseSink: Send + Sync {
    fn deliver(&self, callback_id: &str, payload: &str);
}

/// Builds `function("id", payload);`. The id is emitted as a JSON string
/// literal so it cannot terminate the script early.
pub fn callback_script(function: &str, callback_id: &str, payload: &str) -> String {
    let id = Value::String(callback_id.to_string());
    format!("{function}({id}, {payload});")
}

/// Sink that hands a callback script to a script evaluator.
pub struct ScriptResponseSink<F> {
    function: String,
    evaluate: F,
}

impl<F> ScriptResponseSink<F>
where
    F: Fn(String) + Send + Sync,
{
    pub fn new(evaluate: F) -> Self {
        Self::with_function(DEFAULT_CALLBACK_FUNCTION, evaluate)
    }

    pub fn with_function(function: impl Into<String>, evaluate: F) -> Self {
        Self {
            function: function.into(),
            evaluate,
        }
    }
}

impl<F> ResponseSink for ScriptResponseSink<F>
where
    F: Fn(String) + Send + Sync,
{
    fn deliver(&self, callback_id: &str, payload: &str) {
        (self.evaluate)(callback_script(&self.function, callback_id, payload));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delivered {
    pub callback_id: String,
    pub payload: Value,
}

/// Keeps every delivered response for inspection.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Delivered>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<Delivered> {
        self.delivered.lock().clone()
    }

    pub fn take(&self) -> Vec<Delivered> {
        std::mem::take(&mut *self.delivered.lock())
    }

    pub fn response_for(&self, callback_id: &str) -> Option<Value> {
        self.delivered
            .lock()
            .iter()
            .find(|delivered| delivered.callback_id == callback_id)
            .map(|delivered| delivered.payload.clone())
    }
}

impl ResponseSink for RecordingSink {
    fn deliver(&self, callback_id: &str, payload: &str) {
        let payload = match serde_json::from_str(payload) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, callback_id, "recorded payload is not JSON");
                Value::String(payload.to_string())
            }
        };
        self.delivered.lock().push(Delivered {
            callback_id: callback_id.to_string(),
            payload,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn script_quotes_callback_id() {
        assert_eq!(
            callback_script(DEFAULT_CALLBACK_FUNCTION, "cb1", r#"{"exists":true}"#),
            r#"window.NativeBridge.handleCallback("cb1", {"exists":true});"#
        );
        assert_eq!(
            callback_script("cb", r#"x"); alert("y"#, "{}"),
            r#"cb("x\"); alert(\"y", {});"#
        );
    }

    #[test]
    fn script_sink_uses_configured_function() {
        let scripts = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&scripts);
        let sink = ScriptResponseSink::with_function("bridge.reply", move |script: String| {
            captured.lock().push(script)
        });
        sink.deliver("cb9", r#"{"authorized":true,"message":"Calendar access granted"}"#);
        assert_eq!(
            *scripts.lock(),
            vec![
                r#"bridge.reply("cb9", {"authorized":true,"message":"Calendar access granted"});"#
                    .to_string()
            ]
        );
    }

    #[test]
    fn recording_sink_parses_payloads() {
        let sink = RecordingSink::new();
        sink.deliver("cb2", r#"{"success":true,"error":""}"#);
        assert_eq!(
            sink.response_for("cb2"),
            Some(serde_json::json!({"success": true, "error": ""}))
        );
        assert_eq!(sink.take().len(), 1);
        assert!(sink.delivered().is_empty());
    }
}
