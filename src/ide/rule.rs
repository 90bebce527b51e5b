//! Rule metadata.
//!
//! The texts are templates: `{method}`, `{member}` and `{interface}` are
//! filled from the active [`RuleConfig`], and `{0}`/`{1}` in the message are
//! the per-finding arguments (method name, namespace name).

use crate::hir::Severity;

use super::config::RuleConfig;

/// Identifier reported with every finding of the rule.
pub const RULE_ID: &str = "NamespaceAnalyzer";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    Usage,
}

impl RuleCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Usage => "Usage",
        }
    }
}

/// Describes the automated fix attached to a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixDescriptor {
    title: &'static str,
    /// Fixes from one run may be applied together in a single batch
    pub batchable: bool,
}

impl FixDescriptor {
    /// Human-readable title of the fix. Doubles as its equivalence key.
    pub fn title(&self, config: &RuleConfig) -> String {
        expand(self.title, config)
    }
}

/// Static description of a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub category: RuleCategory,
    pub default_severity: Severity,
    pub enabled_by_default: bool,
    pub fix: FixDescriptor,
    title: &'static str,
    message: &'static str,
    description: &'static str,
}

impl RuleDescriptor {
    pub fn title(&self, config: &RuleConfig) -> String {
        expand(self.title, config)
    }

    pub fn description(&self, config: &RuleConfig) -> String {
        expand(self.description, config)
    }

    /// Render the message for one finding.
    pub fn message(&self, config: &RuleConfig, method: &str, namespace: &str) -> String {
        expand(self.message, config)
            .replace("{0}", method)
            .replace("{1}", namespace)
    }
}

/// The Run/Process convention rule.
pub const NAMESPACE_RULE: RuleDescriptor = RuleDescriptor {
    id: RULE_ID,
    category: RuleCategory::Usage,
    default_severity: Severity::Warning,
    enabled_by_default: true,
    fix: FixDescriptor {
        title: "Add call to {member} method",
        batchable: true,
    },
    title: "{method} method must call {member} method",
    message: "Method '{0}' in namespace '{1}' must call a {member} method on a type implementing {interface}",
    description: "Ensure that the {method} method calls a {member} method on a type implementing {interface}.",
};

fn expand(template: &str, config: &RuleConfig) -> String {
    template
        .replace("{method}", &config.method_name)
        .replace("{member}", &config.member_name)
        .replace("{interface}", config.interface_simple_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_texts() {
        let config = RuleConfig::default();
        let rule = NAMESPACE_RULE;
        assert_eq!(rule.id, "NamespaceAnalyzer");
        assert_eq!(rule.category.as_str(), "Usage");
        assert_eq!(rule.default_severity, Severity::Warning);
        assert!(rule.enabled_by_default);
        assert_eq!(rule.title(&config), "Run method must call Process method");
        assert_eq!(
            rule.message(&config, "Run", "SpecificNamespace"),
            "Method 'Run' in namespace 'SpecificNamespace' must call a Process method on a type implementing ISpecificInterface"
        );
        assert_eq!(
            rule.description(&config),
            "Ensure that the Run method calls a Process method on a type implementing ISpecificInterface."
        );
        assert_eq!(rule.fix.title(&config), "Add call to Process method");
        assert!(rule.fix.batchable);
    }

    #[test]
    fn test_texts_follow_config() {
        let config = RuleConfig::new()
            .with_method_name("Execute")
            .with_member_name("Handle")
            .with_interface_name("App.IStep");
        assert_eq!(
            NAMESPACE_RULE.message(&config, "Execute", "App.Jobs"),
            "Method 'Execute' in namespace 'App.Jobs' must call a Handle method on a type implementing IStep"
        );
        assert_eq!(NAMESPACE_RULE.fix.title(&config), "Add call to Handle method");
    }
}
