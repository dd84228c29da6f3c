//! Lock requests (spec.md §3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockMode {
    Read,
    Write,
}

impl LockMode {
    pub fn as_wire_str(self) -> &'static str {
        match self {
            LockMode::Read => "readLock",
            LockMode::Write => "writeLock",
        }
    }

    pub fn from_wire_str(s: &str) -> Option<Self> {
        match s {
            "readLock" => Some(LockMode::Read),
            "writeLock" => Some(LockMode::Write),
            _ => None,
        }
    }
}

/// A build's request against a resource, named rather than resolved.
///
/// `value` empty means ANY for Custom resources (system picks); Quoted
/// resources always carry an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub resource_name: String,
    pub mode: LockMode,
    pub value: String,
}

impl Lock {
    pub fn new(resource_name: impl Into<String>, mode: LockMode, value: impl Into<String>) -> Self {
        Self { resource_name: resource_name.into(), mode, value: value.into() }
    }

    pub fn is_any(&self) -> bool {
        self.value.is_empty()
    }
}
