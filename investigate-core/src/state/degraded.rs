//! The engine's self-declared stuck state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::DegradedModeType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedModeData {
    pub mode_type: DegradedModeType,
    pub entered_at: DateTime<Utc>,
    pub reason: String,
    pub user_acknowledged: bool,
}
