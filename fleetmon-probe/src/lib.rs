// SPDX-License-Identifier: MIT

//! Live transaction-rate telemetry: fan out one HTTP fetch per node of a
//! topology, absorb individual failures, and reduce the samples into
//! anomaly signals.

pub mod anomaly;
mod prober;

pub use anomaly::evaluate;
pub use prober::{TelemetryProber, PROBE_TIMEOUT};
