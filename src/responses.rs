//! Shared GraphQL response types used across commands.

use serde::{Deserialize, Serialize};

/// A GraphQL connection, reduced to its node list.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Connection<T> {
    pub nodes: Vec<T>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}
