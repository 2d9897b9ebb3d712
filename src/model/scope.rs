//! Configuration scopes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Storefront theme (colors, palettes).
pub const THEME: &str = "theme";
/// Footer column/link layout.
pub const FOOTER_LAYOUT: &str = "footer_layout";
/// Showcase grid on the landing page.
pub const SHOWCASE_LAYOUT: &str = "showcase_layout";
/// Category tiles on the home page.
pub const HOME_CATEGORY_LAYOUT: &str = "home_category_layout";
/// Primary navigation menu.
pub const NAV_MENU: &str = "nav_menu";
/// Dealer dashboard layout, usually qualified by tenant id.
pub const DASHBOARD_LAYOUT: &str = "dashboard_layout";

const MAX_IDENT_LEN: usize = 64;

/// Errors raised when parsing scope identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("scope type must not be empty")]
    EmptyType,

    #[error("invalid scope type {0:?}: expected lowercase letters, digits and '_' starting with a letter")]
    InvalidType(String),

    #[error("invalid scope qualifier {0:?}: expected letters, digits, '-' or '_'")]
    InvalidQualifier(String),

    #[error("scope identifier longer than 64 characters")]
    TooLong,
}

/// The (config family, tenant/country qualifier) pair a version belongs to.
///
/// An empty qualifier means the global scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigScope {
    scope_type: String,
    #[serde(default)]
    qualifier: String,
}

impl ConfigScope {
    /// Build a validated scope.
    pub fn new(scope_type: &str, qualifier: &str) -> Result<Self, ScopeError> {
        validate_type(scope_type)?;
        validate_qualifier(qualifier)?;
        Ok(Self {
            scope_type: scope_type.to_string(),
            qualifier: qualifier.to_string(),
        })
    }

    /// Global scope for a config family.
    pub fn global(scope_type: &str) -> Result<Self, ScopeError> {
        Self::new(scope_type, "")
    }

    pub fn scope_type(&self) -> &str {
        &self.scope_type
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn is_global(&self) -> bool {
        self.qualifier.is_empty()
    }

    /// The global scope of the same family.
    pub fn to_global(&self) -> Self {
        Self {
            scope_type: self.scope_type.clone(),
            qualifier: String::new(),
        }
    }
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_global() {
            write!(f, "{}/global", self.scope_type)
        } else {
            write!(f, "{}/{}", self.scope_type, self.qualifier)
        }
    }
}

fn validate_type(value: &str) -> Result<(), ScopeError> {
    if value.is_empty() {
        return Err(ScopeError::EmptyType);
    }
    if value.len() > MAX_IDENT_LEN {
        return Err(ScopeError::TooLong);
    }
    let mut chars = value.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if starts_with_letter && rest_ok {
        Ok(())
    } else {
        Err(ScopeError::InvalidType(value.to_string()))
    }
}

fn validate_qualifier(value: &str) -> Result<(), ScopeError> {
    if value.len() > MAX_IDENT_LEN {
        return Err(ScopeError::TooLong);
    }
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(ScopeError::InvalidQualifier(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        assert_eq!(ConfigScope::global(THEME).unwrap().to_string(), "theme/global");
        assert_eq!(ConfigScope::new(THEME, "DE").unwrap().to_string(), "theme/DE");
    }

    #[test]
    fn test_scope_type_rules() {
        assert!(ConfigScope::global("home_category_layout").is_ok());
        assert!(ConfigScope::global("promo_banner2").is_ok());
        assert_eq!(ConfigScope::global(""), Err(ScopeError::EmptyType));
        assert!(matches!(ConfigScope::global("Theme"), Err(ScopeError::InvalidType(_))));
        assert!(matches!(ConfigScope::global("2theme"), Err(ScopeError::InvalidType(_))));
        assert!(matches!(ConfigScope::global("theme/x"), Err(ScopeError::InvalidType(_))));
        assert_eq!(ConfigScope::global(&"a".repeat(65)), Err(ScopeError::TooLong));
    }

    #[test]
    fn test_qualifier_rules() {
        assert!(ConfigScope::new(DASHBOARD_LAYOUT, "dealer-42_eu").is_ok());
        assert!(matches!(
            ConfigScope::new(THEME, "DE FR"),
            Err(ScopeError::InvalidQualifier(_))
        ));
    }

    #[test]
    fn test_global_scope_of_qualified() {
        let scope = ConfigScope::new(FOOTER_LAYOUT, "AT").unwrap();
        assert!(!scope.is_global());
        let global = scope.to_global();
        assert!(global.is_global());
        assert_eq!(global.scope_type(), FOOTER_LAYOUT);
    }
}
