//! Integration tests for Trustroute
//!
//! These tests drive the routing models through the deterministic
//! orchestrator and check end-to-end behavior: attack drop rates, QoS
//! differentiation, path validity and learning.

#[path = "integration/support.rs"]
mod support;

#[path = "integration/attacks.rs"]
mod attacks;
#[path = "integration/learning.rs"]
mod learning;
#[path = "integration/qos.rs"]
mod qos;
#[path = "integration/routing.rs"]
mod routing;
#[path = "integration/scenarios.rs"]
mod scenarios;
