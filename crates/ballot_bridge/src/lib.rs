//! Message bridge between the web content and the native capabilities.
//!
//! Inbound messages are JSON objects carrying an `action` and an optional
//! `callbackId`. Responses are serialized, handed to the main context and
//! delivered as a call to the page's callback registry.

pub mod dispatcher;
pub mod main_context;
pub mod request;
pub mod response;
pub mod sink;

pub use crate::dispatcher::{BridgeDispatcher, Responder};
pub use crate::main_context::{InlineContext, Job, MainContext, MainQueue};
pub use crate::request::{Action, BridgeRequest, Envelope};
pub use crate::sink::{
    callback_script, RecordingSink, ResponseSink, ScriptResponseSink, DEFAULT_CALLBACK_FUNCTION,
};
