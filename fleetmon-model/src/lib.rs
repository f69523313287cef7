// SPDX-License-Identifier: MIT

pub mod error;
pub mod telemetry;
pub mod topology;

pub use error::DirectoryError;
pub use telemetry::{Anomaly, TelemetrySample};
pub use topology::{CapacityInfo, Instance, NodeRecord, Topology};
