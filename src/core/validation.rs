//! Reusable field validators
//!
//! Validators run against the JSON form of a record before it is accepted by
//! a mutation. Each one returns `Err(message)` describing the violation.

use crate::core::error::{FieldViolation, ValidationError};
use crate::core::field::FieldFormat;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A single field validator
pub type Validator = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// Validator: field is required (present and not null)
pub fn required() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_null() {
            Err(format!("field '{}' is required", field))
        } else {
            Ok(())
        }
    }
}

/// Validator: strings must not be blank
pub fn not_blank() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some(s) if s.trim().is_empty() => Err(format!("field '{}' must not be blank", field)),
        _ => Ok(()),
    }
}

/// Validator: number must be zero or greater
pub fn non_negative() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if let Some(num) = value.as_f64() {
            if num < 0.0 {
                return Err(format!(
                    "field '{}' must not be negative (value: {})",
                    field, num
                ));
            }
        }
        Ok(())
    }
}

/// Validator: number must not exceed maximum
pub fn max_value(max: f64) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(num) = value.as_f64() {
            if num > max {
                return Err(format!(
                    "field '{}' must not exceed {} (value: {})",
                    field, max, num
                ));
            }
        }
        Ok(())
    }
}

/// Validator: value must be in allowed list
pub fn in_list(
    allowed: &'static [&'static str],
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            if !allowed.contains(&s) {
                return Err(format!(
                    "field '{}' must be one of {:?} (value: {})",
                    field, allowed, s
                ));
            }
        }
        Ok(())
    }
}

/// Validator: string must match a format
pub fn format(format: FieldFormat) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            if !format.validate(s) {
                return Err(format!(
                    "field '{}' is not a valid {} (value: {})",
                    field,
                    format.name(),
                    s
                ));
            }
        }
        Ok(())
    }
}

/// Ordered set of validators keyed by field name
#[derive(Clone, Default)]
pub struct FieldRules {
    rules: Vec<(&'static str, Validator)>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator for a field
    pub fn rule<F>(mut self, field: &'static str, validator: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rules.push((field, Arc::new(validator)));
        self
    }

    /// Require each listed field to be present and non-null
    pub fn required(mut self, fields: &[&'static str]) -> Self {
        for field in fields {
            self = self.rule(*field, required());
        }
        self
    }

    /// Append every rule of another set
    pub fn extend(mut self, other: FieldRules) -> Self {
        self.rules.extend(other.rules);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule against an object, collecting all violations
    ///
    /// Missing keys are seen as `null`.
    pub fn check(&self, object: &Map<String, Value>) -> Result<(), ValidationError> {
        let mut violations: Vec<FieldViolation> = self
            .rules
            .iter()
            .filter_map(|(field, validator)| {
                let value = object.get(*field).unwrap_or(&Value::Null);
                validator(field, value).err().map(|message| FieldViolation {
                    field: (*field).to_string(),
                    message,
                })
            })
            .collect();

        match violations.len() {
            0 => Ok(()),
            1 => {
                let FieldViolation { field, message } = violations.remove(0);
                Err(ValidationError::FieldError { field, message })
            }
            _ => Err(ValidationError::FieldErrors(violations)),
        }
    }
}

impl std::fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|(field, _)| field))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_required_rejects_null() {
        let v = required();
        assert!(v("name", &json!("Alice")).is_ok());
        assert!(v("name", &json!(null)).is_err());
    }

    #[test]
    fn test_not_blank() {
        let v = not_blank();
        assert!(v("name", &json!("  ")).is_err());
        assert!(v("name", &json!("x")).is_ok());
        assert!(v("name", &json!(3)).is_ok());
    }

    #[test]
    fn test_non_negative() {
        let v = non_negative();
        assert!(v("price", &json!(0)).is_ok());
        assert!(v("price", &json!(-0.01)).is_err());
        assert!(v("price", &json!("n/a")).is_ok());
    }

    #[test]
    fn test_max_value() {
        let v = max_value(5.0);
        assert!(v("rating", &json!(4.8)).is_ok());
        assert!(v("rating", &json!(5.1)).is_err());
    }

    #[test]
    fn test_in_list() {
        let v = in_list(&["active", "inactive"]);
        assert!(v("status", &json!("active")).is_ok());
        let err = v("status", &json!("archived")).unwrap_err();
        assert!(err.contains("archived"));
    }

    #[test]
    fn test_format_rule() {
        let v = format(FieldFormat::Email);
        assert!(v("email", &json!("tom.barnett@email.com")).is_ok());
        assert!(v("email", &json!("tom")).is_err());
    }

    #[test]
    fn test_rules_single_violation() {
        let rules = FieldRules::new().required(&["name", "email"]);
        let err = rules.check(&object(json!({"name": "Tom"}))).unwrap_err();
        match err {
            ValidationError::FieldError { field, .. } => assert_eq!(field, "email"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rules_collects_all_violations() {
        let rules = FieldRules::new()
            .required(&["name"])
            .rule("price", non_negative());
        let err = rules.check(&object(json!({"price": -1}))).unwrap_err();
        match err {
            ValidationError::FieldErrors(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rules_pass() {
        let rules = FieldRules::new().required(&["name"]);
        assert!(rules.check(&object(json!({"name": "Denim Jacket"}))).is_ok());
        assert_eq!(rules.len(), 1);
    }
}
