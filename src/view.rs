//! Pure projections from dataset, schema and filter state to what gets drawn.

use crate::filter::FilterState;
use crate::record::{Dataset, Value};
use crate::schema::Schema;

pub const SEARCH_FALLBACK_LABEL: &str = "SEARCH";

#[derive(Debug, Clone, PartialEq)]
pub struct CheckboxEntry {
    pub value: Value,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckboxGroup {
    pub column: String,
    pub title: String,
    pub entries: Vec<CheckboxEntry>,
}

/// Filter options per column. The dataset is static, so these are computed
/// once and only the checked flags change afterwards.
#[derive(Debug, Clone, Default)]
pub struct CheckboxPanel {
    options: Vec<(String, Vec<Value>)>,
}

impl CheckboxPanel {
    pub fn build(schema: &Schema, dataset: &Dataset) -> Self {
        let options = schema
            .filter_columns()
            .map(|column| (column.to_string(), distinct_values(dataset, column)))
            .collect();
        Self { options }
    }

    pub fn groups(&self, state: &FilterState) -> Vec<CheckboxGroup> {
        self.options
            .iter()
            .map(|(column, values)| CheckboxGroup {
                column: column.clone(),
                title: column.to_uppercase(),
                entries: values
                    .iter()
                    .map(|value| CheckboxEntry {
                        value: value.clone(),
                        checked: state.is_selected(column, value),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Total number of toggles across all groups.
    pub fn len(&self) -> usize {
        self.options.iter().map(|(_, values)| values.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves a flat cursor position to its column and value.
    pub fn entry_at(&self, mut idx: usize) -> Option<(&str, &Value)> {
        for (column, values) in &self.options {
            if idx < values.len() {
                return Some((column.as_str(), &values[idx]));
            }
            idx -= values.len();
        }
        None
    }
}

/// Distinct non-blank values of `column` across the whole dataset,
/// in first-occurrence order.
pub fn distinct_values(dataset: &Dataset, column: &str) -> Vec<Value> {
    let mut values: Vec<Value> = Vec::new();
    for record in dataset.records() {
        let value = record.get(column);
        if !value.is_blank() && !values.contains(value) {
            values.push(value.clone());
        }
    }
    values
}

pub fn search_label(schema: &Schema) -> String {
    schema
        .search_column()
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| SEARCH_FALLBACK_LABEL.to_string())
}

pub fn table_header(schema: &Schema) -> Vec<String> {
    schema.columns().to_vec()
}

/// One row of display strings per visible record, one cell per schema column.
pub fn table_rows(schema: &Schema, dataset: &Dataset, visible: &[usize]) -> Vec<Vec<String>> {
    visible
        .iter()
        .filter_map(|&idx| dataset.get(idx))
        .map(|record| {
            schema
                .columns()
                .iter()
                .map(|column| record.get(column).to_string())
                .collect()
        })
        .collect()
}
