use std::collections::HashMap;

/// A rectangular sheet tab: one header row plus data rows of the same width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(header: Vec<String>) -> Self {
        Self { header, rows: Vec::new() }
    }

    pub fn with_columns(columns: &[&str]) -> Self {
        Self::new(columns.iter().map(|c| c.to_string()).collect())
    }

    /// Build from raw cell values as a sheet returns them: first row is the
    /// header, later rows may be ragged (trailing blanks trimmed) and are padded.
    /// Rows with no content at all are dropped.
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        let mut iter = values.into_iter();
        let header = match iter.next() {
            Some(h) => h,
            None => return Self::default(),
        };
        let mut table = Self::new(header);
        for row in iter {
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            table.push_row(row);
        }
        table
    }

    /// Header followed by rows, the shape a sheet write expects.
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.header.clone());
        values.extend(self.rows.iter().cloned());
        values
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.header.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// First header matching any accepted spelling, compared trimmed and
    /// case-insensitively. Returns the header exactly as written in the sheet.
    pub fn find_column(&self, accepted: &[&str]) -> Option<&str> {
        self.header
            .iter()
            .find(|h| {
                let norm = h.trim().to_lowercase();
                accepted.iter().any(|a| a.trim().to_lowercase() == norm)
            })
            .map(|h| h.as_str())
    }

    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| Record::from_row(&self.header, row))
            .collect()
    }
}

/// One data row keyed by header name. Missing keys read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn from_row(header: &[String], row: &[String]) -> Self {
        let mut fields = HashMap::with_capacity(header.len());
        for (i, name) in header.iter().enumerate() {
            let value = row.get(i).cloned().unwrap_or_default();
            // duplicate headers: leftmost column wins
            fields.entry(name.clone()).or_insert(value);
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
