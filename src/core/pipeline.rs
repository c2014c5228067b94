//! Search → filter → sort → paginate over a store snapshot
//!
//! ```text
//! RecordStore::snapshot() ──▶ search ──▶ filter ──▶ stable sort ──▶ page slice ──▶ DerivedView
//! ```
//!
//! Every stage is a pure function of the snapshot and the [`QuerySpec`], so
//! running the same spec against the same snapshot always yields the same
//! view.

use crate::config::CollectionConfig;
use crate::core::error::QueryError;
use crate::core::field::FieldValue;
use crate::core::query::{DerivedView, FieldFilter, PageWindow, QuerySpec, SortDirection, SortSpec};
use crate::core::record::Record;
use crate::core::store::RecordStore;
use std::cmp::Ordering;

/// Query engine bound to one record store
#[derive(Clone)]
pub struct QueryPipeline<R> {
    store: RecordStore<R>,
    search_fields: Vec<String>,
    default_page_size: Option<usize>,
}

impl<R: Record> QueryPipeline<R> {
    /// Create a pipeline searching the record's default searchable fields
    pub fn new(store: RecordStore<R>) -> Self {
        Self {
            store,
            search_fields: R::searchable_fields().iter().map(|f| f.to_string()).collect(),
            default_page_size: None,
        }
    }

    /// Create a pipeline honouring a collection's configuration
    pub fn from_config(store: RecordStore<R>, config: &CollectionConfig) -> Self {
        let mut pipeline = Self::new(store);
        if let Some(fields) = &config.search_fields {
            pipeline.search_fields = fields.clone();
        }
        pipeline.default_page_size = config.default_page_size;
        pipeline
    }

    /// Override the fields matched by free-text search
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    /// Page size used by [`QueryPipeline::page_spec`]
    pub fn default_page_size(&self) -> Option<usize> {
        self.default_page_size
    }

    /// Add the configured default window to a spec that has none
    pub fn page_spec(&self, spec: QuerySpec) -> QuerySpec {
        match (spec.page, self.default_page_size) {
            (None, Some(size)) => spec.page(PageWindow::new(0, size)),
            _ => spec,
        }
    }

    pub fn store(&self) -> &RecordStore<R> {
        &self.store
    }

    /// Run a spec against the store's current snapshot
    pub fn run(&self, spec: &QuerySpec) -> Result<DerivedView<R>, QueryError> {
        let snapshot = self.store.snapshot();
        let mut view = self.apply(&snapshot, spec)?;
        view.version = snapshot.version();
        Ok(view)
    }

    /// Apply a spec to an arbitrary slice of records
    ///
    /// The returned view carries version 0; [`QueryPipeline::run`] stamps the
    /// snapshot version.
    pub fn apply(&self, records: &[R], spec: &QuerySpec) -> Result<DerivedView<R>, QueryError> {
        validate_spec::<R>(spec)?;

        let matched: Vec<&R> = records
            .iter()
            .filter(|record| self.matches_search(record, &spec.search))
            .filter(|record| matches_filters(*record, spec))
            .collect();

        let sorted = match &spec.sort {
            Some(sort) => sort_stable(matched, sort),
            None => matched,
        };

        let total = sorted.len();
        let records = match spec.page {
            Some(window) => sorted
                .into_iter()
                .skip(window.offset)
                .take(window.size)
                .cloned()
                .collect(),
            None => sorted.into_iter().cloned().collect(),
        };

        Ok(DerivedView {
            records,
            total,
            window: spec.page,
            version: 0,
        })
    }

    fn matches_search(&self, record: &R, search: &str) -> bool {
        if search.trim().is_empty() {
            return true;
        }
        let needle = search.to_lowercase();
        self.search_fields.iter().any(|field| {
            record
                .field_value(field)
                .is_some_and(|value| value.contains_text(&needle))
        })
    }
}

fn validate_spec<R: Record>(spec: &QuerySpec) -> Result<(), QueryError> {
    if let Some(sort) = &spec.sort {
        if !R::has_field(&sort.key) {
            return Err(QueryError::UnknownSortKey {
                collection: R::collection().to_string(),
                field: sort.key.clone(),
            });
        }
    }

    if let Some(field) = spec.filters.keys().find(|field| !R::has_field(field)) {
        return Err(QueryError::UnknownFilterField {
            collection: R::collection().to_string(),
            field: field.clone(),
        });
    }

    if spec.page.is_some_and(|window| window.size == 0) {
        return Err(QueryError::InvalidPageSize);
    }

    Ok(())
}

fn matches_filters<R: Record>(record: &R, spec: &QuerySpec) -> bool {
    spec.filters.iter().all(|(field, filter)| match filter {
        FieldFilter::All => true,
        filter => filter.accepts(record.field_value(field).as_ref()),
    })
}

/// Stable sort with absent values last in either direction
fn sort_stable<'a, R: Record>(records: Vec<&'a R>, sort: &SortSpec) -> Vec<&'a R> {
    // Extract keys once; slice::sort_by is a stable merge sort
    let mut keyed: Vec<(Option<FieldValue>, &'a R)> = records
        .into_iter()
        .map(|record| {
            let key = record.field_value(&sort.key).filter(|v| !v.is_null());
            (key, record)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| compare_keys(a.as_ref(), b.as_ref(), sort.direction));
    keyed.into_iter().map(|(_, record)| record).collect()
}

fn compare_keys(a: Option<&FieldValue>, b: Option<&FieldValue>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Asc => a.compare(b),
            SortDirection::Desc => b.compare(a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
        name: String,
        sales: Option<i64>,
        tags: Vec<String>,
    }

    impl Record for Row {
        fn collection() -> &'static str {
            "rows"
        }

        fn id(&self) -> &str {
            &self.id
        }

        fn fields() -> &'static [&'static str] {
            &["id", "name", "sales", "tags"]
        }

        fn searchable_fields() -> &'static [&'static str] {
            &["name", "tags"]
        }

        fn field_value(&self, field: &str) -> Option<FieldValue> {
            match field {
                "id" => Some(self.id.as_str().into()),
                "name" => Some(self.name.as_str().into()),
                "sales" => self.sales.map(FieldValue::Integer),
                "tags" => Some(FieldValue::List(self.tags.clone())),
                _ => None,
            }
        }
    }

    fn row(id: &str, name: &str, sales: Option<i64>, tags: &[&str]) -> Row {
        Row {
            id: id.to_string(),
            name: name.to_string(),
            sales,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn pipeline(rows: Vec<Row>) -> QueryPipeline<Row> {
        QueryPipeline::new(RecordStore::with_records(rows).unwrap())
    }

    fn ids(view: &DerivedView<Row>) -> Vec<&str> {
        view.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_store_yields_empty_view() {
        let view = pipeline(vec![])
            .run(&QuerySpec::new().search("x").page(PageWindow::new(5, 3)))
            .unwrap();
        assert!(view.is_empty());
        assert_eq!(view.total, 0);
    }

    #[test]
    fn test_blank_search_passes_all() {
        let p = pipeline(vec![row("1", "a", None, &[]), row("2", "b", None, &[])]);
        assert_eq!(p.run(&QuerySpec::new().search("   ")).unwrap().len(), 2);
    }

    #[test]
    fn test_search_matches_list_fields() {
        let p = pipeline(vec![
            row("1", "Jacket", None, &["Winter"]),
            row("2", "Sandals", None, &["summer"]),
        ]);
        let view = p.run(&QuerySpec::new().search("SUMMER")).unwrap();
        assert_eq!(ids(&view), vec!["2"]);
    }

    #[test]
    fn test_missing_values_sort_last_both_directions() {
        let p = pipeline(vec![
            row("1", "a", None, &[]),
            row("2", "b", Some(5), &[]),
            row("3", "c", Some(9), &[]),
            row("4", "d", None, &[]),
        ]);

        let asc = p.run(&QuerySpec::new().sort(SortSpec::asc("sales"))).unwrap();
        assert_eq!(ids(&asc), vec!["2", "3", "1", "4"]);

        let desc = p.run(&QuerySpec::new().sort(SortSpec::desc("sales"))).unwrap();
        assert_eq!(ids(&desc), vec!["3", "2", "1", "4"]);
    }

    #[test]
    fn test_unknown_sort_key_is_rejected() {
        let p = pipeline(vec![row("1", "a", None, &[])]);
        let err = p.run(&QuerySpec::new().sort(SortSpec::asc("rating"))).unwrap_err();
        assert_eq!(
            err,
            QueryError::UnknownSortKey {
                collection: "rows".to_string(),
                field: "rating".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_filter_field_is_rejected() {
        let p = pipeline(vec![]);
        let spec = QuerySpec::new().filter("colour", FieldFilter::All);
        assert!(matches!(p.run(&spec), Err(QueryError::UnknownFilterField { .. })));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let p = pipeline(vec![]);
        let spec = QuerySpec::new().page(PageWindow::new(0, 0));
        assert_eq!(p.run(&spec).unwrap_err(), QueryError::InvalidPageSize);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let p = pipeline(vec![row("1", "a", None, &[])]);
        let view = p.run(&QuerySpec::new().page(PageWindow::new(10, 5))).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.total, 1);
    }

    #[test]
    fn test_run_stamps_snapshot_version() {
        let p = pipeline(vec![row("1", "a", None, &[])]);
        let view = p.run(&QuerySpec::new()).unwrap();
        assert_eq!(view.version, p.store().version());
    }

    #[test]
    fn test_search_field_override() {
        let p = pipeline(vec![row("1", "Jacket", None, &["winter"])]).with_search_fields(["name"]);
        assert!(p.run(&QuerySpec::new().search("winter")).unwrap().is_empty());
        assert_eq!(p.search_fields(), ["name".to_string()]);
    }

    #[test]
    fn test_page_spec_uses_default_size() {
        let config = CollectionConfig {
            name: "rows".to_string(),
            search_fields: None,
            default_page_size: Some(4),
        };
        let p = QueryPipeline::from_config(RecordStore::<Row>::new(), &config);
        assert_eq!(p.page_spec(QuerySpec::new()).page, Some(PageWindow::new(0, 4)));

        let explicit = QuerySpec::new().page(PageWindow::new(2, 2));
        assert_eq!(p.page_spec(explicit).page, Some(PageWindow::new(2, 2)));
    }
}
