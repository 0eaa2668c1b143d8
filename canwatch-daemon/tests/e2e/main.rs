//! E2E integration tests for canwatch-daemon.
//!
//! Requests go through the real axum router with `tower::ServiceExt::oneshot`,
//! and detection spawns real `sh` scripts that append to a temp alert log.
//!
//! # Test Structure
//!
//! - `helpers/` -- Shared test utilities (test daemon, detector scripts, assertions)
//! - `scenarios/` -- Test files organized by scenario
//!
//! # Running
//!
//! ```bash
//! cargo test -p canwatch-daemon --test e2e
//! ```

mod scenarios;
