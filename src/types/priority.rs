use std::fmt;

use clap::ValueEnum;
use colored::Colorize;

/// Priority levels for issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Priority {
    /// No priority (0)
    None = 0,
    /// Urgent priority (1)
    Urgent = 1,
    /// High priority (2)
    High = 2,
    /// Medium priority (3)
    Medium = 3,
    /// Low priority (4)
    Low = 4,
}

impl Priority {
    /// Parse the string form used by trigger inputs ("0" through "4").
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "0" => Some(Priority::None),
            "1" => Some(Priority::Urgent),
            "2" => Some(Priority::High),
            "3" => Some(Priority::Medium),
            "4" => Some(Priority::Low),
            _ => None,
        }
    }

    /// The string form used by trigger inputs.
    pub fn key(self) -> &'static str {
        match self {
            Priority::None => "0",
            Priority::Urgent => "1",
            Priority::High => "2",
            Priority::Medium => "3",
            Priority::Low => "4",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::None => "No priority",
            Priority::Urgent => "Urgent",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Get the colored label for terminal output.
    pub fn colored(self) -> String {
        let label = self.label();
        match self {
            Priority::None => label.to_string(),
            Priority::Urgent => label.red().bold().to_string(),
            Priority::High => label.yellow().bold().to_string(),
            Priority::Medium => label.blue().to_string(),
            Priority::Low => label.bright_black().to_string(),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
