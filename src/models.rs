// Data models for the to-do list

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// 1-based position in the list at creation time
    pub id: u32,
    pub name: String,
    pub completed: bool,
}

impl Task {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            completed: false,
        }
    }

    pub fn status(&self) -> TaskStatus {
        if self.completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {} [{}]", self.id, self.name, self.status())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Completed,
    Pending,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Completed => "Completed",
            TaskStatus::Pending => "Pending",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Completed" => Ok(TaskStatus::Completed),
            "Pending" => Ok(TaskStatus::Pending),
            other => Err(eyre::eyre!("Unknown task status: {:?}", other)),
        }
    }
}
