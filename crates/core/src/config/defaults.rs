//! Default values and functions for configuration

use super::NodeRole;

// Default constants
pub(crate) const DEFAULT_LOG_FILTER: &str = "info";
pub(crate) const DEFAULT_NODE_ROLE: &str = "primary";

pub(crate) fn default_node_role() -> NodeRole {
    NodeRole::Primary
}

pub(crate) fn default_quiet() -> bool {
    false
}

pub(crate) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
