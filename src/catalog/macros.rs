//! Macro for the repetitive parts of a [`Record`](crate::core::record::Record) impl

/// Implement `Record` for a struct with a `String` `id` field
///
/// Each entry under `fields` maps a queryable field name to an expression
/// over the record, converted with `FieldValue::from`.
///
/// # Example
/// ```rust,ignore
/// impl_record!(Country, "countries",
///     search: ["name"],
///     required: ["name"],
///     fields: {
///         "id" => |c| c.id.as_str(),
///         "name" => |c| c.name.as_str(),
///         "rawValue" => |c| c.raw_value,
///     }
/// );
/// ```
#[macro_export]
macro_rules! impl_record {
    (
        $type:ident, $collection:literal,
        search: [$($search:literal),* $(,)?],
        required: [$($required:literal),* $(,)?],
        fields: { $($name:literal => |$r:ident| $value:expr),* $(,)? }
        $(, rules: $rules:expr)?
        $(,)?
    ) => {
        impl $crate::core::record::Record for $type {
            fn collection() -> &'static str {
                $collection
            }

            fn id(&self) -> &str {
                &self.id
            }

            fn fields() -> &'static [&'static str] {
                &[$($name),*]
            }

            fn searchable_fields() -> &'static [&'static str] {
                &[$($search),*]
            }

            fn required_fields() -> &'static [&'static str] {
                &[$($required),*]
            }

            fn field_value(&self, field: &str) -> Option<$crate::core::field::FieldValue> {
                match field {
                    $($name => {
                        let $r = self;
                        Some($crate::core::field::FieldValue::from($value))
                    })*
                    _ => None,
                }
            }

            $(
                fn field_rules() -> $crate::core::validation::FieldRules {
                    $rules
                }
            )?
        }
    };
}
