//! Output value changes.

use serde_json::Value;

use crate::plan::{Change, ChangeType, Overlay};

use super::types::{OutputChange, SENSITIVE_PLACEHOLDER, UNKNOWN_PLACEHOLDER};

impl OutputChange {
    /// Builds the display form of one output change.
    ///
    /// An unknown after value always shows the "known after apply"
    /// placeholder, sensitive or not.
    #[must_use]
    pub fn from_change(name: &str, change: &Change) -> Self {
        let change_type = ChangeType::from_actions(&change.actions);
        let sensitive = Overlay::new(&change.before_sensitive).covers_any()
            || Overlay::new(&change.after_sensitive).covers_any();
        let is_unknown = Overlay::new(&change.after_unknown).covers_any();

        let masked = || Value::String(String::from(SENSITIVE_PLACEHOLDER));
        let before = if sensitive { masked() } else { change.before.clone() };
        let after = if is_unknown {
            Value::String(String::from(UNKNOWN_PLACEHOLDER))
        } else if sensitive {
            masked()
        } else {
            change.after.clone()
        };

        Self {
            name: name.to_string(),
            change_type,
            sensitive,
            is_unknown,
            before,
            after,
            action: change_type.label().to_string(),
            indicator: change_type.indicator().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Action;
    use serde_json::json;

    fn change(actions: Vec<Action>, before: Value, after: Value) -> Change {
        Change {
            actions,
            before,
            after,
            ..Change::default()
        }
    }

    #[test]
    fn test_plain_update() {
        let output = OutputChange::from_change("ip", &change(vec![Action::Update], json!("a"), json!("b")));

        assert_eq!(output.change_type, ChangeType::Update);
        assert_eq!(output.before, json!("a"));
        assert_eq!(output.after, json!("b"));
        assert_eq!(output.action, "Modify");
        assert_eq!(output.indicator, "~");
    }

    #[test]
    fn test_unknown_wins_over_sensitive() {
        let mut c = change(vec![Action::Update], json!("old"), Value::Null);
        c.after_unknown = json!(true);
        c.after_sensitive = json!(true);

        let output = OutputChange::from_change("token", &c);

        assert!(output.is_unknown);
        assert!(output.sensitive);
        assert_eq!(output.after, json!(UNKNOWN_PLACEHOLDER));
        assert_eq!(output.before, json!(SENSITIVE_PLACEHOLDER));
    }

    #[test]
    fn test_unknown_without_sensitivity() {
        let mut c = change(vec![Action::Create], Value::Null, Value::Null);
        c.after_unknown = json!(true);

        let output = OutputChange::from_change("id", &c);
        assert!(output.is_unknown);
        assert!(!output.sensitive);
        assert_eq!(output.after, json!(UNKNOWN_PLACEHOLDER));
        assert_eq!(output.action, "Add");
        assert_eq!(output.indicator, "+");
    }

    #[test]
    fn test_sensitive_is_masked() {
        let mut c = change(vec![Action::NoOp], json!("x"), json!("x"));
        c.before_sensitive = json!(true);
        c.after_sensitive = json!(true);

        let output = OutputChange::from_change("secret", &c);
        assert_eq!(output.before, json!(SENSITIVE_PLACEHOLDER));
        assert_eq!(output.after, json!(SENSITIVE_PLACEHOLDER));
        assert_eq!(output.change_type, ChangeType::NoOp);
    }
}
