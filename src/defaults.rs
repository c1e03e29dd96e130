//! Default values for loader configuration.

pub const PLACEHOLDER_ATTRIBUTE: &str = "data-component";
pub const ORIGINAL_COMPONENT_ATTRIBUTE: &str = "data-original-component";
pub const COMPONENT_TIMEOUT_MS: u64 = 5000;
pub const RETRY_ATTEMPTS: u32 = 1;
pub const LOG_COMPONENT_LOADING: bool = true;
pub const SHOW_LOADING_INDICATOR: bool = true;
pub const LOADING_TEXT: &str = "Loading components...";
pub const PAGE_TARGET: &str = "#app";

pub fn placeholder_attribute() -> String { PLACEHOLDER_ATTRIBUTE.to_string() }
pub fn component_timeout_ms() -> u64 { COMPONENT_TIMEOUT_MS }
pub fn retry_attempts() -> u32 { RETRY_ATTEMPTS }
pub fn log_component_loading() -> bool { LOG_COMPONENT_LOADING }
pub fn show_loading_indicator() -> bool { SHOW_LOADING_INDICATOR }
pub fn loading_text() -> String { LOADING_TEXT.to_string() }
