//! Record types for persisted signals

use serde::{Deserialize, Serialize};

/// Sample sequence stored under a variable name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSignal {
    /// Name the samples are addressed by
    pub name: String,
    /// Real time-domain samples
    pub samples: Vec<f64>,
}

impl NamedSignal {
    /// Create a new named signal
    pub fn new(name: impl Into<String>, samples: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }
}
