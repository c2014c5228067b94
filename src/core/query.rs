//! Query specs, derived views and pagination utilities

use crate::core::error::QueryError;
use crate::core::field::FieldValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Bound;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Sort key and direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parse `field`, `field:asc` or `field:desc`
    pub fn parse(expr: &str) -> Option<Self> {
        let (key, direction) = match expr.split_once(':') {
            Some((key, "asc")) => (key, SortDirection::Asc),
            Some((key, "desc")) => (key, SortDirection::Desc),
            Some(_) => return None,
            None => (expr, SortDirection::Asc),
        };
        let key = key.trim();
        (!key.is_empty()).then(|| Self {
            key: key.to_string(),
            direction,
        })
    }

    /// Column-header click: the same column flips direction, a new column
    /// starts ascending
    pub fn toggle(current: Option<&SortSpec>, key: &str) -> SortSpec {
        match current {
            Some(spec) if spec.key == key => SortSpec {
                key: spec.key.clone(),
                direction: spec.direction.reversed(),
            },
            _ => SortSpec::asc(key),
        }
    }
}

/// Accepted values for one field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    /// The "all" sentinel, no-op
    All,
    /// Field equals the value (or contains it, for list fields)
    Equals(FieldValue),
    /// Field matches any of the values
    OneOf(Vec<FieldValue>),
    /// Field lies within the bounds
    Range {
        lower: Bound<FieldValue>,
        upper: Bound<FieldValue>,
    },
}

impl FieldFilter {
    /// Inclusive range, either side optional
    pub fn between(min: Option<FieldValue>, max: Option<FieldValue>) -> Self {
        FieldFilter::Range {
            lower: min.map_or(Bound::Unbounded, Bound::Included),
            upper: max.map_or(Bound::Unbounded, Bound::Included),
        }
    }

    /// Check a record's field value against this filter
    ///
    /// An absent value passes only the `All` filter.
    pub fn accepts(&self, value: Option<&FieldValue>) -> bool {
        let value = match (self, value) {
            (FieldFilter::All, _) => return true,
            (_, None) | (_, Some(FieldValue::Null)) => return false,
            (_, Some(value)) => value,
        };

        match self {
            FieldFilter::All => true,
            FieldFilter::Equals(accepted) => value.matches(accepted),
            FieldFilter::OneOf(accepted) => accepted.iter().any(|a| value.matches(a)),
            FieldFilter::Range { lower, upper } => {
                let above = match lower {
                    Bound::Included(min) => value.compare(min).is_ge(),
                    Bound::Excluded(min) => value.compare(min).is_gt(),
                    Bound::Unbounded => true,
                };
                let below = match upper {
                    Bound::Included(max) => value.compare(max).is_le(),
                    Bound::Excluded(max) => value.compare(max).is_lt(),
                    Bound::Unbounded => true,
                };
                above && below
            }
        }
    }

    /// Build a filter from a JSON value
    ///
    /// `"all"` is the sentinel, arrays become `OneOf`, scalars `Equals`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) if s == "all" => FieldFilter::All,
            Value::Array(items) => {
                FieldFilter::OneOf(items.iter().map(FieldValue::from_json).collect())
            }
            other => FieldFilter::Equals(FieldValue::from_json(other)),
        }
    }
}

/// Page window over a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub offset: usize,
    pub size: usize,
}

impl PageWindow {
    pub fn new(offset: usize, size: usize) -> Self {
        Self { offset, size }
    }

    /// Window for a 1-based page number
    pub fn page(page: usize, size: usize) -> Self {
        Self {
            offset: page.saturating_sub(1).saturating_mul(size),
            size,
        }
    }

    /// The following window
    pub fn next(self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.size),
            size: self.size,
        }
    }
}

/// User-controlled parameters driving a derived view
///
/// # Example
/// ```rust,ignore
/// let spec = QuerySpec::new()
///     .search("nike")
///     .filter("status", FieldFilter::Equals("active".into()))
///     .sort(SortSpec::desc("sales"))
///     .page(PageWindow::new(0, 10));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub search: String,
    pub filters: IndexMap<String, FieldFilter>,
    pub sort: Option<SortSpec>,
    pub page: Option<PageWindow>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn filter(mut self, field: impl Into<String>, filter: FieldFilter) -> Self {
        self.filters.insert(field.into(), filter);
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(mut self, page: PageWindow) -> Self {
        self.page = Some(page);
        self
    }

    /// Same spec without its page window
    pub fn unpaged(&self) -> Self {
        Self {
            page: None,
            ..self.clone()
        }
    }

    /// Whether search or any non-"all" filter is active
    pub fn has_active_filters(&self) -> bool {
        !self.search.trim().is_empty()
            || self.filters.values().any(|f| !matches!(f, FieldFilter::All))
    }

    /// Build a spec from URL-style query parameters
    ///
    /// Filter keys may carry a comparison suffix (`>`, `>=`, `<`, `<=`);
    /// several suffixes on one field combine into a single range.
    pub fn from_params(params: &QueryParams) -> Result<Self, QueryError> {
        let mut spec = QuerySpec::new().search(params.search.clone().unwrap_or_default());

        if let Some(raw) = &params.filter {
            let value: Value = serde_json::from_str(raw).map_err(|e| QueryError::MalformedFilter {
                message: e.to_string(),
            })?;
            let object = value.as_object().ok_or_else(|| QueryError::MalformedFilter {
                message: "filter must be a JSON object".to_string(),
            })?;

            for (key, value) in object {
                spec.add_filter_expr(key, value);
            }
        }

        if let Some(sort) = &params.sort {
            spec.sort = Some(SortSpec::parse(sort).ok_or_else(|| QueryError::MalformedFilter {
                message: format!("invalid sort expression '{}'", sort),
            })?);
        }

        spec.page = Some(PageWindow::page(params.page(), params.limit()));
        Ok(spec)
    }

    fn add_filter_expr(&mut self, key: &str, value: &Value) {
        let bound = |v: &Value, inclusive: bool| {
            let v = FieldValue::from_json(v);
            if inclusive { Bound::Included(v) } else { Bound::Excluded(v) }
        };

        let (field, lower, upper) = if let Some(field) = key.strip_suffix(">=") {
            (field, Some(bound(value, true)), None)
        } else if let Some(field) = key.strip_suffix("<=") {
            (field, None, Some(bound(value, true)))
        } else if let Some(field) = key.strip_suffix('>') {
            (field, Some(bound(value, false)), None)
        } else if let Some(field) = key.strip_suffix('<') {
            (field, None, Some(bound(value, false)))
        } else {
            self.filters.insert(key.to_string(), FieldFilter::from_json(value));
            return;
        };

        let entry = self
            .filters
            .entry(field.to_string())
            .or_insert(FieldFilter::Range {
                lower: Bound::Unbounded,
                upper: Bound::Unbounded,
            });

        if let FieldFilter::Range { lower: l, upper: u } = entry {
            if let Some(lower) = lower {
                *l = lower;
            }
            if let Some(upper) = upper {
                *u = upper;
            }
        } else {
            *entry = FieldFilter::Range {
                lower: lower.unwrap_or(Bound::Unbounded),
                upper: upper.unwrap_or(Bound::Unbounded),
            };
        }
    }
}

/// Ordered result of applying a spec to a snapshot
///
/// Not persisted; recomputed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView<R> {
    /// Records in the page window, in final order
    pub records: Vec<R>,
    /// Number of records matching search and filters, before paging
    pub total: usize,
    /// Window that was applied, if any
    pub window: Option<PageWindow>,
    /// Version of the snapshot the view was computed from
    pub version: u64,
}

impl<R> DerivedView<R> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    /// Pagination metadata, when a window was applied
    pub fn pagination(&self) -> Option<PaginationMeta> {
        self.window.map(|w| {
            let size = w.size.max(1);
            PaginationMeta::new(w.offset / size + 1, size, self.total)
        })
    }
}

impl<R> IntoIterator for DerivedView<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Query parameters for pagination and filtering
///
/// Mirrors the query string a table view sends. All parameters have
/// sensible defaults.
///
/// # Example
/// ```text
/// ?page=2&limit=10
/// ?search=nike&filter={"status": "active"}
/// ?page=1&limit=20&filter={"price>=": 50, "price<=": 100}&sort=sales:desc
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct QueryParams {
    /// Page number (starts at 1)
    #[serde(default = "default_page")]
    pub page: usize,

    /// Number of items per page
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Free-text search
    pub search: Option<String>,

    /// Filters as JSON object
    ///
    /// - Exact match: `{"field": "value"}`, `"all"` disables the field
    /// - Any of: `{"field": ["a", "b"]}`
    /// - Comparison: `{"field>": v, "field<": v, "field>=": v, "field<=": v}`
    pub filter: Option<String>,

    /// Sort field and direction: `field`, `field:asc` or `field:desc`
    pub sort: Option<String>,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

impl QueryParams {
    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    /// Get limit, ensuring it doesn't exceed the maximum
    pub fn limit(&self) -> usize {
        self.limit.clamp(1, 100) // Maximum 100 per page, minimum 1
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        // Ensure limit is at least 1 to avoid division by zero
        let limit = limit.max(1);
        let page = page.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };
        let start = (page - 1).saturating_mul(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_params_defaults() {
        let params: QueryParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn test_limit_is_clamped() {
        let params = QueryParams {
            limit: 0,
            ..Default::default()
        };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(1, 20, 145);
        assert_eq!(meta.total, 145);
        assert_eq!(meta.total_pages, 8);
        assert!(!meta.has_prev);
        assert!(meta.has_next);

        let last = PaginationMeta::new(8, 20, 145);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn test_huge_page_number_is_an_empty_window() {
        let params = QueryParams {
            page: usize::MAX,
            limit: 10,
            ..Default::default()
        };
        let spec = QuerySpec::from_params(&params).unwrap();
        let window = spec.page.unwrap();
        assert_eq!(window.offset, usize::MAX);
        assert_eq!(window.next().offset, usize::MAX);

        let meta = PaginationMeta::new(usize::MAX, usize::MAX, 145);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(SortSpec::parse("price"), Some(SortSpec::asc("price")));
        assert_eq!(SortSpec::parse("price:desc"), Some(SortSpec::desc("price")));
        assert_eq!(SortSpec::parse("price:sideways"), None);
        assert_eq!(SortSpec::parse(":asc"), None);
    }

    #[test]
    fn test_sort_toggle() {
        let first = SortSpec::toggle(None, "name");
        assert_eq!(first, SortSpec::asc("name"));

        let flipped = SortSpec::toggle(Some(&first), "name");
        assert_eq!(flipped, SortSpec::desc("name"));

        let other = SortSpec::toggle(Some(&flipped), "status");
        assert_eq!(other, SortSpec::asc("status"));
    }

    #[test]
    fn test_filter_accepts() {
        let active = FieldFilter::Equals("active".into());
        assert!(active.accepts(Some(&"active".into())));
        assert!(!active.accepts(Some(&"inactive".into())));
        assert!(!active.accepts(None));
        assert!(FieldFilter::All.accepts(None));

        let one_of = FieldFilter::OneOf(vec!["pending".into(), "completed".into()]);
        assert!(one_of.accepts(Some(&"pending".into())));
        assert!(!one_of.accepts(Some(&"cancelled".into())));
    }

    #[test]
    fn test_range_filter() {
        let range = FieldFilter::between(Some(FieldValue::Integer(50)), Some(FieldValue::Integer(100)));
        assert!(range.accepts(Some(&FieldValue::Float(89.99))));
        assert!(range.accepts(Some(&FieldValue::Integer(100))));
        assert!(!range.accepts(Some(&FieldValue::Float(159.99))));
        assert!(!range.accepts(Some(&FieldValue::Null)));

        let strict = FieldFilter::Range {
            lower: Bound::Excluded(FieldValue::Integer(3)),
            upper: Bound::Unbounded,
        };
        assert!(!strict.accepts(Some(&FieldValue::Integer(3))));
        assert!(strict.accepts(Some(&FieldValue::Integer(4))));
    }

    #[test]
    fn test_filter_from_json() {
        assert_eq!(FieldFilter::from_json(&json!("all")), FieldFilter::All);
        assert_eq!(
            FieldFilter::from_json(&json!("active")),
            FieldFilter::Equals("active".into())
        );
        assert_eq!(
            FieldFilter::from_json(&json!(["a", "b"])),
            FieldFilter::OneOf(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_spec_from_params() {
        let params = QueryParams {
            page: 2,
            limit: 10,
            search: Some("nike".to_string()),
            filter: Some(r#"{"status": "active", "price>=": 50, "price<": 100}"#.to_string()),
            sort: Some("sales:desc".to_string()),
        };

        let spec = QuerySpec::from_params(&params).unwrap();
        assert_eq!(spec.search, "nike");
        assert_eq!(spec.sort, Some(SortSpec::desc("sales")));
        assert_eq!(spec.page, Some(PageWindow::new(10, 10)));
        assert_eq!(spec.filters["status"], FieldFilter::Equals("active".into()));
        assert_eq!(
            spec.filters["price"],
            FieldFilter::Range {
                lower: Bound::Included(FieldValue::Integer(50)),
                upper: Bound::Excluded(FieldValue::Integer(100)),
            }
        );
    }

    #[test]
    fn test_spec_from_params_rejects_bad_filter() {
        let params = QueryParams {
            filter: Some("not json".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            QuerySpec::from_params(&params),
            Err(QueryError::MalformedFilter { .. })
        ));

        let params = QueryParams {
            filter: Some("[1, 2]".to_string()),
            ..Default::default()
        };
        assert!(QuerySpec::from_params(&params).is_err());
    }

    #[test]
    fn test_has_active_filters() {
        let spec = QuerySpec::new().filter("status", FieldFilter::All);
        assert!(!spec.has_active_filters());
        assert!(spec.clone().search("x").has_active_filters());
        assert!(
            spec.filter("role", FieldFilter::Equals("admin".into()))
                .has_active_filters()
        );
    }

    #[test]
    fn test_page_window() {
        assert_eq!(PageWindow::page(1, 10), PageWindow::new(0, 10));
        assert_eq!(PageWindow::page(3, 10), PageWindow::new(20, 10));
        assert_eq!(PageWindow::new(0, 5).next(), PageWindow::new(5, 5));
    }

    #[test]
    fn test_derived_view_pagination() {
        let view = DerivedView {
            records: vec![1, 2],
            total: 5,
            window: Some(PageWindow::new(2, 2)),
            version: 1,
        };
        let meta = view.pagination().unwrap();
        assert_eq!(meta.page, 2);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
    }
}
