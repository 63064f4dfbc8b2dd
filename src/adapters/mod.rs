// Adapters layer: concrete implementations for external systems (http, terminal).

pub mod http;

#[cfg(feature = "cli")]
pub mod tui;
