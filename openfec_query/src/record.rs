//! Decoded result rows.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::value::SqlValue;

/// One result row: field names paired with values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, SqlValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<SqlValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Sets a field, replacing an existing value with the same name.
    pub fn push(&mut self, name: &str, value: impl Into<SqlValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Like [`Record::get`], treating a missing field as `Null`.
    pub fn value_of(&self, name: &str) -> SqlValue {
        self.get(name).cloned().unwrap_or(SqlValue::Null)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_replaces_existing_field() {
        let mut record = Record::new().with("sub_id", 1_i64);
        record.push("sub_id", 2_i64);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("sub_id"), Some(&SqlValue::Integer(2)));
    }

    #[test]
    fn missing_field_reads_as_null() {
        let record = Record::new().with("sub_id", 1_i64);
        assert!(record.value_of("committee_id").is_null());
    }

    #[test]
    fn serializes_in_field_order() {
        let record = Record::new()
            .with("sub_id", 7_i64)
            .with("committee_id", "C00000042")
            .with("contribution_receipt_amount", SqlValue::Null);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"sub_id":7,"committee_id":"C00000042","contribution_receipt_amount":null}"#
        );
    }
}
