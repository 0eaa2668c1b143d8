//! E2E scenarios.

mod control_api;
#[cfg(unix)]
mod detection_flow;
#[cfg(unix)]
mod stop_escalation;
