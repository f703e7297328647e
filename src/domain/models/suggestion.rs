//! Improvement categories and suggestion records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Improvement category recognised in free-text feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AccessControl,
    AuditLogging,
    AuthenticationFlow,
    Compliance,
    General,
    PasswordPolicy,
    SessionManagement,
}

impl Category {
    /// Categories with a keyword set. `General` is the catch-all and has none.
    pub const KEYWORDED: [Self; 6] = [
        Self::AccessControl,
        Self::AuditLogging,
        Self::AuthenticationFlow,
        Self::Compliance,
        Self::PasswordPolicy,
        Self::SessionManagement,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AccessControl => "access_control",
            Self::AuditLogging => "audit_logging",
            Self::AuthenticationFlow => "authentication_flow",
            Self::Compliance => "compliance",
            Self::General => "general",
            Self::PasswordPolicy => "password_policy",
            Self::SessionManagement => "session_management",
        }
    }

    /// Lowercase keywords that signal this category.
    pub const fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::AccessControl => &[
                "mfa",
                "2fa",
                "otp",
                "authorization",
                "rbac",
                "lockout",
                "permission",
                "role",
            ],
            Self::AuditLogging => &["audit", "logging", "log", "monitoring", "alerting"],
            Self::AuthenticationFlow => &["oauth", "sso", "saml", "oidc", "login", "signup", "social"],
            Self::Compliance => &["hipaa", "pci", "sox", "gdpr", "dss", "compliance", "regulatory"],
            Self::PasswordPolicy => &["password", "complexity", "rotation", "expiry", "passphrase"],
            Self::SessionManagement => &["session", "timeout", "token", "jwt", "cookie", "refresh"],
            Self::General => &[],
        }
    }

    /// Canonical recommendation. When this text already appears in the accumulated
    /// context or the current artifact the category counts as addressed.
    pub const fn recommendation(&self) -> &'static str {
        match self {
            Self::AccessControl => "multi-factor authentication",
            Self::AuditLogging => "audit logging",
            Self::AuthenticationFlow => "single sign-on",
            Self::Compliance => "regulatory compliance",
            Self::General => "acceptance criteria",
            Self::PasswordPolicy => "password complexity",
            Self::SessionManagement => "session timeout",
        }
    }

    /// Human-readable rationale template shown with a suggestion.
    pub const fn rationale(&self) -> &'static str {
        match self {
            Self::AccessControl => {
                "Reviewers flagged access control gaps. Add multi-factor authentication, \
                 role-based authorization and account lockout rules."
            }
            Self::AuditLogging => {
                "Reviewers asked for traceability. Add audit logging for authentication \
                 events and define monitoring and alerting thresholds."
            }
            Self::AuthenticationFlow => {
                "Reviewers questioned the login flow. Describe single sign-on, OAuth/OIDC \
                 federation and social login behaviour."
            }
            Self::Compliance => {
                "Reviewers raised regulatory concerns. Map requirements to regulatory \
                 compliance obligations such as PCI DSS, HIPAA, SOX or GDPR."
            }
            Self::General => {
                "Feedback did not match a known area. Tighten acceptance criteria and \
                 make each requirement specific and testable."
            }
            Self::PasswordPolicy => {
                "Reviewers flagged password handling. Define password complexity, \
                 rotation and reset rules."
            }
            Self::SessionManagement => {
                "Reviewers flagged session handling. Specify session timeout, token \
                 lifetime and refresh/revocation behaviour."
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked improvement suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub category: Category,

    pub rationale: String,

    /// Canonical recommendation text for the category
    pub recommendation: String,

    /// Ranking weight: number of feedback entries pointing at the category
    pub weight: u32,

    /// Sum of distinct keyword matches over those entries
    pub keyword_hits: u32,

    pub supporting_feedback_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_is_alphabetical() {
        let mut categories = Category::KEYWORDED.to_vec();
        categories.push(Category::General);
        let mut by_name = categories.clone();
        by_name.sort_by_key(Category::as_str);
        categories.sort();
        assert_eq!(categories, by_name);
    }

    #[test]
    fn test_keywords_are_lowercase_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for category in Category::KEYWORDED {
            for keyword in category.keywords() {
                assert_eq!(*keyword, keyword.to_lowercase());
                assert!(seen.insert(*keyword), "duplicate keyword {keyword}");
            }
        }
        assert!(Category::General.keywords().is_empty());
    }
}
