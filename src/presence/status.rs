//! Module `status`
//!
//! Defines the presence values a user can report.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Connectivity state of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Online,
    Offline,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Online => write!(f, "online"),
            UserStatus::Offline => write!(f, "offline"),
        }
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(UserStatus::Online),
            "offline" => Ok(UserStatus::Offline),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}
