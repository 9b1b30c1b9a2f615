//! Per-user interface mode record.

use crate::model::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of one interface record.
pub type InterfaceId = Uuid;

/// Presentation mode a user has chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceMode {
    /// Distractions off; pokes are refused.
    #[default]
    Focus,
    /// Friends may poke this user.
    Leisure,
}

impl InterfaceMode {
    /// Display name used at the outer boundary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Focus => "Focus",
            Self::Leisure => "Leisure",
        }
    }

    pub(crate) fn to_db(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Leisure => "leisure",
        }
    }

    pub(crate) fn from_db(value: &str) -> Option<Self> {
        match value {
            "focus" => Some(Self::Focus),
            "leisure" => Some(Self::Leisure),
            _ => None,
        }
    }
}

impl Display for InterfaceMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected mode name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModeError(pub String);

impl Display for UnknownModeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` is not a valid interface mode", self.0)
    }
}

impl Error for UnknownModeError {}

impl FromStr for InterfaceMode {
    type Err = UnknownModeError;

    /// Accepts exactly the boundary names `Focus` and `Leisure`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Focus" => Ok(Self::Focus),
            "Leisure" => Ok(Self::Leisure),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}

/// Stored interface record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub id: InterfaceId,
    pub user: UserId,
    pub mode: InterfaceMode,
}
