use std::collections::HashSet;

use tracing::debug;

use crate::record::Record;

pub const ID_COLUMN: &str = "id";
pub const SEARCH_COLUMN_POSITION: usize = 1;

/// Ordered, de-duplicated field names across all records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    /// Union of all field names, in the order they are first seen.
    pub fn infer(records: &[Record]) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for name in records.iter().flat_map(|r| r.field_names()) {
            if seen.insert(name) {
                columns.push(name.to_string());
            }
        }
        debug!("Inferred schema {:?}", columns);
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn search_column(&self) -> Option<&str> {
        self.columns
            .get(SEARCH_COLUMN_POSITION)
            .map(|s| s.as_str())
    }

    pub fn is_filterable(&self, column: &str) -> bool {
        column != ID_COLUMN && Some(column) != self.search_column()
    }

    pub fn filter_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(|s| s.as_str())
            .filter(|c| self.is_filterable(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Dataset;

    fn schema_of(json: &str) -> Schema {
        Schema::infer(Dataset::from_json_str(json).unwrap().records())
    }

    #[test]
    fn union_in_first_seen_order() {
        let schema = schema_of(
            r#"[{"id": 1, "name": "a"}, {"id": 2, "type": "x", "name": "b"}, {"extra": 1}]"#,
        );
        assert_eq!(schema.columns(), &["id", "name", "type", "extra"]);
    }

    #[test]
    fn second_column_is_searched() {
        let schema = schema_of(r#"[{"id": 1, "name": "a", "type": "x"}]"#);
        assert_eq!(schema.search_column(), Some("name"));
        assert!(!schema.is_filterable("id"));
        assert!(!schema.is_filterable("name"));
        assert_eq!(schema.filter_columns().collect::<Vec<_>>(), vec!["type"]);
    }

    #[test]
    fn id_excluded_anywhere() {
        let schema = schema_of(r#"[{"title": "a", "kind": "b", "id": 3}]"#);
        assert_eq!(schema.search_column(), Some("kind"));
        assert_eq!(schema.filter_columns().collect::<Vec<_>>(), vec!["title"]);
    }

    #[test]
    fn degenerate_schemas() {
        let empty = schema_of("[]");
        assert!(empty.is_empty());
        assert_eq!(empty.search_column(), None);

        let single = schema_of(r#"[{"only": 1}]"#);
        assert_eq!(single.len(), 1);
        assert_eq!(single.search_column(), None);
        assert_eq!(single.filter_columns().collect::<Vec<_>>(), vec!["only"]);
    }
}
