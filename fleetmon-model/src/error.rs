// SPDX-License-Identifier: MIT

use thiserror::Error;

/// The only failure that crosses the core boundary. Everything else
/// (missing attributes, dead nodes, stale cache files) degrades in place.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory service could not be reached, or rejected our
    /// credentials. The requested listing/topology is unavailable for
    /// this invocation; no stale guess is fabricated.
    #[error("directory service unavailable: {0}")]
    Unavailable(String),
}
