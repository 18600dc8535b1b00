//! Console logging
//!
//! In the browser every line goes to the devtools console, tagged with the
//! component that emitted it (`[Engine] ...`). Native builds route the same
//! lines through `tracing` so headless hosts can install a subscriber.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

pub fn info(tag: &str, message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&JsValue::from_str(&format!("[{}] {}", tag, message)));

    #[cfg(not(target_arch = "wasm32"))]
    tracing::info!(target: "flagcore", "[{}] {}", tag, message);
}

pub fn debug(tag: &str, message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::debug_1(&JsValue::from_str(&format!("[{}] {}", tag, message)));

    #[cfg(not(target_arch = "wasm32"))]
    tracing::debug!(target: "flagcore", "[{}] {}", tag, message);
}

pub fn warn(tag: &str, message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(&format!("[{}] {}", tag, message)));

    #[cfg(not(target_arch = "wasm32"))]
    tracing::warn!(target: "flagcore", "[{}] {}", tag, message);
}

pub fn error(tag: &str, message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&JsValue::from_str(&format!("[{}] {}", tag, message)));

    #[cfg(not(target_arch = "wasm32"))]
    tracing::error!(target: "flagcore", "[{}] {}", tag, message);
}
