//! Raw-row primitives: coercing untyped cells into fields and building
//! fixed-width rows for positional writes.

use serde_json::Value;

/// Read-side view over one raw row from the store.
///
/// Cells are untyped (`null`, string, number, bool); every accessor coerces
/// and never fails, so a malformed cell degrades to a default instead of
/// poisoning the whole fetch.
#[derive(Debug, Clone, Copy)]
pub struct RowReader<'a> {
    cells: &'a [Value],
}

impl<'a> RowReader<'a> {
    pub fn new(cells: &'a [Value]) -> Self {
        Self { cells }
    }

    /// `row[offset] ?? ""`, stringified and trimmed.
    pub fn text(&self, offset: usize) -> String {
        match self.cells.get(offset) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other) => other.to_string().trim().to_string(),
        }
    }

    /// `Number(value) || 0`: empty or non-numeric cells read as 0.
    pub fn number(&self, offset: usize) -> f64 {
        match self.cells.get(offset) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            Some(Value::Bool(true)) => 1.0,
            _ => 0.0,
        }
    }

    /// True when every cell is empty or whitespace. Merged and trailing
    /// formatting rows in the sheet surface as fully blank rows.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| match cell {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        })
    }
}

/// Write-side builder for a fixed-width row.
///
/// The store's write path overwrites positionally by column index, so
/// unspecified trailing columns must be sent as empty strings, never
/// omitted.
#[derive(Debug, Clone)]
pub struct RowBuilder {
    cells: Vec<Value>,
}

impl RowBuilder {
    pub fn new(width: usize) -> Self {
        Self {
            cells: vec![Value::String(String::new()); width],
        }
    }

    pub fn set(mut self, offset: usize, value: impl Into<String>) -> Self {
        debug_assert!(offset < self.cells.len(), "offset outside row width");
        if let Some(cell) = self.cells.get_mut(offset) {
            *cell = Value::String(value.into());
        }
        self
    }

    pub fn set_number(mut self, offset: usize, value: f64) -> Self {
        debug_assert!(offset < self.cells.len(), "offset outside row width");
        if let Some(cell) = self.cells.get_mut(offset) {
            *cell = serde_json::Number::from_f64(value)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(value.to_string()));
        }
        self
    }

    pub fn build(self) -> Vec<Value> {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_trims_and_defaults() {
        let cells = vec![json!("  PN-04  "), json!(null), json!(12.5)];
        let row = RowReader::new(&cells);
        assert_eq!(row.text(0), "PN-04");
        assert_eq!(row.text(1), "");
        assert_eq!(row.text(2), "12.5");
        assert_eq!(row.text(99), "");
    }

    #[test]
    fn number_coerces_without_erroring() {
        let cells = vec![json!("42"), json!("n/a"), json!(3.5), json!(null)];
        let row = RowReader::new(&cells);
        assert_eq!(row.number(0), 42.0);
        assert_eq!(row.number(1), 0.0);
        assert_eq!(row.number(2), 3.5);
        assert_eq!(row.number(3), 0.0);
        assert_eq!(row.number(99), 0.0);
    }

    #[test]
    fn mapping_is_idempotent() {
        let cells = vec![json!(" a "), json!("7")];
        let row = RowReader::new(&cells);
        assert_eq!(row.text(0), row.text(0));
        assert_eq!(row.number(1), row.number(1));
    }

    #[test]
    fn blank_detection_ignores_whitespace() {
        let blank = vec![json!("  "), json!(null), json!("")];
        assert!(RowReader::new(&blank).is_blank());
        let not_blank = vec![json!(""), json!("PN-01")];
        assert!(!RowReader::new(&not_blank).is_blank());
    }

    #[test]
    fn builder_pads_to_full_width() {
        let row = RowBuilder::new(5).set(1, "PN-01").set_number(3, 2.0).build();
        assert_eq!(row.len(), 5);
        assert_eq!(row[0], json!(""));
        assert_eq!(row[1], json!("PN-01"));
        assert_eq!(row[3], json!(2.0));
        assert_eq!(row[4], json!(""));
    }
}
