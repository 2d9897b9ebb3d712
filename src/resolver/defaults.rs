//! Built-in payloads served while a scope has nothing published.

use serde_json::{json, Value};

use crate::model::scope::{
    DASHBOARD_LAYOUT, FOOTER_LAYOUT, HOME_CATEGORY_LAYOUT, NAV_MENU, SHOWCASE_LAYOUT, THEME,
};

/// The default payload for `scope_type`; an empty object for unknown types.
pub fn builtin_default(scope_type: &str) -> Value {
    match scope_type {
        THEME => json!({
            "light": {
                "background": "#FFFFFF",
                "text": "#111827",
                "button_bg": "#1E3A8A",
                "button_text": "#FFFFFF"
            },
            "dark": {
                "background": "#111827",
                "text": "#F9FAFB",
                "button_bg": "#F9FAFB",
                "button_text": "#111827"
            }
        }),
        FOOTER_LAYOUT => json!({
            "columns": [
                { "title": "Company", "links": [] },
                { "title": "Support", "links": [] }
            ]
        }),
        SHOWCASE_LAYOUT => json!({ "rows": 2, "columns": 4, "items": [] }),
        HOME_CATEGORY_LAYOUT => json!({ "columns": 4, "categories": [] }),
        NAV_MENU => json!({ "items": [] }),
        DASHBOARD_LAYOUT => json!({ "widgets": [] }),
        _ => json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::ValidatorRegistry;

    #[test]
    fn test_defaults_pass_builtin_validators() {
        let registry = ValidatorRegistry::default();
        for scope_type in registry.registered_types() {
            let report = registry.run(&scope_type, &builtin_default(&scope_type)).unwrap();
            assert!(report.pass, "default for {scope_type} fails: {:?}", report.entries);
            assert!(
                report.warnings().next().is_none(),
                "default for {scope_type} warns: {:?}",
                report.entries
            );
        }
    }

    #[test]
    fn test_unknown_type_defaults_to_empty_object() {
        assert_eq!(builtin_default("promo_banner"), json!({}));
    }
}
