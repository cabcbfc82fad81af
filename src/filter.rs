use std::collections::HashMap;

use clap::ValueEnum;
use tracing::{debug, trace};

use crate::record::{Dataset, Value};
use crate::schema::Schema;

/// How a search keystroke combines with the checkbox filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SearchMode {
    /// Each keystroke narrows whatever is currently visible. Deleting
    /// characters never brings rows back, and a checkbox toggle drops the
    /// search constraint until the next keystroke.
    #[default]
    Legacy,
    /// Every change re-derives the view from the full dataset, applying
    /// checkbox filters first and the search on top.
    Recompute,
}

/// Checkbox selections per column plus the search text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    selected: HashMap<String, Vec<Value>>,
    query: String,
}

impl FilterState {
    /// Adds `value` to the column's selection or removes it if already there.
    /// An emptied selection is kept and simply imposes no constraint.
    /// Returns whether the value is selected afterwards.
    pub fn toggle(&mut self, column: &str, value: &Value) -> bool {
        let values = self.selected.entry(column.to_string()).or_default();
        match values.iter().position(|v| v == value) {
            Some(pos) => {
                values.remove(pos);
                false
            }
            None => {
                values.push(value.clone());
                true
            }
        }
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_lowercase();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self, column: &str) -> &[Value] {
        self.selected.get(column).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn is_selected(&self, column: &str, value: &Value) -> bool {
        self.selected(column).contains(value)
    }

    /// Columns whose selection currently constrains the view.
    pub fn active_filters(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.selected
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(column, values)| (column.as_str(), values.as_slice()))
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.query.clear();
    }
}

/// Dataset indices of records matching every non-empty column selection.
pub fn checkbox_pass(dataset: &Dataset, state: &FilterState) -> Vec<usize> {
    let active: Vec<(&str, &[Value])> = state.active_filters().collect();
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            active
                .iter()
                .all(|(column, values)| values.contains(record.get(column)))
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Keeps the rows whose search column contains `query`, case-insensitively.
/// Without a search column nothing can be searched and `rows` is returned as is.
pub fn search_pass(
    dataset: &Dataset,
    rows: &[usize],
    column: Option<&str>,
    query: &str,
) -> Vec<usize> {
    let Some(column) = column else {
        return rows.to_vec();
    };
    let query = query.to_lowercase();
    rows.iter()
        .copied()
        .filter(|&idx| {
            dataset
                .get(idx)
                .map(|r| r.get(column).to_string().to_lowercase().contains(&query))
                .unwrap_or(false)
        })
        .collect()
}

/// The view the filter state describes, independent of any history.
pub fn derive(dataset: &Dataset, schema: &Schema, state: &FilterState) -> Vec<usize> {
    let rows = checkbox_pass(dataset, state);
    search_pass(dataset, &rows, schema.search_column(), state.query())
}

/// Owns the filter state and the rows currently visible in the table.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    state: FilterState,
    visible: Vec<usize>,
    mode: SearchMode,
}

impl FilterEngine {
    pub fn new(dataset: &Dataset, mode: SearchMode) -> Self {
        Self {
            state: FilterState::default(),
            visible: (0..dataset.len()).collect(),
            mode,
        }
    }

    pub fn toggle(&mut self, dataset: &Dataset, schema: &Schema, column: &str, value: &Value) {
        let selected = self.state.toggle(column, value);
        trace!("Toggled {column}={value} -> {selected}");
        self.visible = match self.mode {
            SearchMode::Legacy => checkbox_pass(dataset, &self.state),
            SearchMode::Recompute => derive(dataset, schema, &self.state),
        };
        debug!("{} of {} rows visible", self.visible.len(), dataset.len());
    }

    pub fn search(&mut self, dataset: &Dataset, schema: &Schema, query: &str) {
        self.state.set_query(query);
        let column = schema.search_column();
        self.visible = match self.mode {
            SearchMode::Legacy => search_pass(dataset, &self.visible, column, self.state.query()),
            SearchMode::Recompute => derive(dataset, schema, &self.state),
        };
        debug!(
            "Search {:?} on {:?}: {} rows visible",
            self.state.query(),
            column,
            self.visible.len()
        );
    }

    pub fn reset(&mut self, dataset: &Dataset) {
        self.state.clear();
        self.visible = (0..dataset.len()).collect();
    }

    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }
}
