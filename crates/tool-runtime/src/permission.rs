use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the tool that is sensitive out of the box.
pub const GENERATE_IMAGE: &str = "generate_image";

/// Permission level for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionLevel {
    /// Tool executes without asking the user
    AutoApprove,
    /// User must approve before execution
    RequireConfirmation,
}

/// Maps tool names to permission levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionPolicy {
    /// Explicit per-tool permissions
    pub rules: HashMap<String, PermissionLevel>,
    /// Default permission for tools not in the rules map
    pub default: PermissionLevel,
}

impl PermissionPolicy {
    /// A policy that runs every tool without asking.
    pub fn allow_all() -> Self {
        Self {
            rules: HashMap::new(),
            default: PermissionLevel::AutoApprove,
        }
    }

    /// Auto-approve everything except the named tools, which need confirmation.
    pub fn with_sensitive<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut policy = Self::allow_all();
        for name in names {
            policy
                .rules
                .insert(name.into(), PermissionLevel::RequireConfirmation);
        }
        policy
    }

    /// Mark further tools as needing confirmation, keeping existing rules.
    pub fn with_additional<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.rules
                .insert(name.into(), PermissionLevel::RequireConfirmation);
        }
        self
    }

    /// Get the permission level for a given tool name.
    /// Checks exact match first, then glob patterns, then default.
    pub fn level_for(&self, tool_name: &str) -> PermissionLevel {
        if let Some(&level) = self.rules.get(tool_name) {
            return level;
        }
        // Glob patterns (e.g., "send_*")
        for (pattern, &level) in &self.rules {
            if let Some(prefix) = pattern.strip_suffix('*') {
                if tool_name.starts_with(prefix) {
                    return level;
                }
            }
        }
        self.default
    }

    pub fn requires_confirmation(&self, tool_name: &str) -> bool {
        self.level_for(tool_name) == PermissionLevel::RequireConfirmation
    }
}

impl Default for PermissionPolicy {
    fn default() -> Self {
        Self::with_sensitive([GENERATE_IMAGE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_gates_image_generation() {
        let policy = PermissionPolicy::default();
        assert!(policy.requires_confirmation("generate_image"));
        assert_eq!(policy.level_for("calc"), PermissionLevel::AutoApprove);
    }

    #[test]
    fn test_explicit_rule() {
        let policy = PermissionPolicy::with_sensitive(["send_email"]);
        assert!(policy.requires_confirmation("send_email"));
        assert!(!policy.requires_confirmation("generate_image"));
    }

    #[test]
    fn test_additional_tools_keep_image_generation_gated() {
        let policy = PermissionPolicy::default().with_additional(["send_email"]);
        assert!(policy.requires_confirmation("send_email"));
        assert!(policy.requires_confirmation("generate_image"));
        assert!(!policy.requires_confirmation("calc"));

        let empty: [&str; 0] = [];
        assert!(PermissionPolicy::default()
            .with_additional(empty)
            .requires_confirmation("generate_image"));
    }

    #[test]
    fn test_glob_pattern() {
        let policy = PermissionPolicy::with_sensitive(["send_*"]);
        assert!(policy.requires_confirmation("send_email"));
        assert!(policy.requires_confirmation("send_sms"));
        assert!(!policy.requires_confirmation("read_email"));
    }

    #[test]
    fn test_allow_all() {
        let policy = PermissionPolicy::allow_all();
        assert!(!policy.requires_confirmation("generate_image"));
    }
}
