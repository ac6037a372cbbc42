use crate::data::record::{Record, RecordSet};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Which record fields a search looks at
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterFields {
    /// Every key of the first record
    #[default]
    All,
    /// An explicit, ordered field list
    Only(Vec<String>),
}

impl FilterFields {
    /// An absent or empty list means all fields
    pub fn from_list(fields: Option<Vec<String>>) -> Self {
        match fields {
            Some(list) if !list.is_empty() => FilterFields::Only(list),
            _ => FilterFields::All,
        }
    }
}

/// Search term plus the fields it applies to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub term: String,
    pub fields: FilterFields,
}

impl FilterState {
    pub fn new(fields: FilterFields) -> Self {
        Self {
            term: String::new(),
            fields,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.term.is_empty()
    }
}

/// Field names of the first record, in order
pub fn default_fields(records: &[Record]) -> Vec<String> {
    records
        .first()
        .map(|r| r.keys().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Remembers the default field set per dataset, so it is derived once per
/// distinct record set rather than on every keystroke
#[derive(Debug, Default)]
pub struct FieldSetCache {
    source: Option<Weak<Vec<Record>>>,
    fields: Vec<String>,
    derivations: usize,
}

impl FieldSetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective field list for `records` under `configured`
    pub fn resolve<'a>(
        &'a mut self,
        records: &RecordSet,
        configured: &'a FilterFields,
    ) -> &'a [String] {
        match configured {
            FilterFields::Only(fields) => fields,
            FilterFields::All => {
                if !self.is_cached_for(records) {
                    self.fields = default_fields(records);
                    self.source = Some(Arc::downgrade(records));
                    self.derivations += 1;
                    debug!(
                        target: "filter",
                        "Derived default search fields: {:?}",
                        self.fields
                    );
                }
                &self.fields
            }
        }
    }

    fn is_cached_for(&self, records: &RecordSet) -> bool {
        self.source
            .as_ref()
            .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), Arc::as_ptr(records)))
    }

    /// How many times the default field set has been derived
    pub fn derivations(&self) -> usize {
        self.derivations
    }

    pub fn invalidate(&mut self) {
        self.source = None;
        self.fields.clear();
    }
}

/// Case-insensitive substring search over records
pub struct SearchFilter;

impl SearchFilter {
    /// Indices of matching records, in original order.
    /// An empty term keeps every record.
    pub fn filter_indices(records: &[Record], fields: &[String], term: &str) -> Vec<usize> {
        if term.is_empty() {
            return (0..records.len()).collect();
        }

        let needle = term.to_lowercase();
        let matched: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, record)| Self::matches(record, fields, &needle))
            .map(|(idx, _)| idx)
            .collect();

        trace!(
            target: "filter",
            "Term '{}' matched {} of {} records",
            term,
            matched.len(),
            records.len()
        );
        matched
    }

    /// Matching records, in original order
    pub fn filter(records: &[Record], fields: &[String], term: &str) -> Vec<Record> {
        Self::filter_indices(records, fields, term)
            .into_iter()
            .map(|idx| records[idx].clone())
            .collect()
    }

    /// `needle` must already be lowercase
    pub fn matches(record: &Record, fields: &[String], needle: &str) -> bool {
        fields.iter().any(|field| {
            record
                .get(field)
                .and_then(|value| value.as_text())
                .is_some_and(|text| text.to_lowercase().contains(needle))
        })
    }
}
