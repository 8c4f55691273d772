use gloo::net::http::Request;
use serde::Serialize;
use wasm_bindgen_futures::spawn_local;

#[derive(Debug, Serialize)]
struct LogRequest {
    level: String,
    message: String,
    component: Option<String>,
}

/// Structured frontend logging, shipped to the backend log endpoint so modal
/// flow diagnostics end up next to the server logs.
pub struct Logger;

impl Logger {
    pub fn debug_with_component(component: &str, message: &str) {
        Self::log("debug", message, Some(component.to_string()));
    }

    pub fn info_with_component(component: &str, message: &str) {
        Self::log("info", message, Some(component.to_string()));
    }

    pub fn warn_with_component(component: &str, message: &str) {
        Self::log("warn", message, Some(component.to_string()));
    }

    pub fn error_with_component(component: &str, message: &str) {
        Self::log("error", message, Some(component.to_string()));
    }

    fn log(level: &str, message: &str, component: Option<String>) {
        let request = LogRequest {
            level: level.to_string(),
            message: message.to_string(),
            component,
        };

        // Fire-and-forget; a lost log line must never affect the UI.
        spawn_local(async move {
            if let Ok(request) = Request::post("http://localhost:3000/api/logs").json(&request) {
                let _ = request.send().await;
            }
        });
    }
}
