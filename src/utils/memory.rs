use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use lazy_static::lazy_static;
use serde_json::Value;
use crate::core::library::{LibraryError, LibraryResult, ReasonCode};
use crate::core::repository::{PredicateOp, split_predicate_key};
use crate::core::transaction::{TableWrite, WriteCondition};

lazy_static! {
    static ref SHARED_STORE: Arc<MemoryStore> = Arc::new(MemoryStore::new());
}

#[derive(Debug, Default)]
struct MemoryTable {
    rows: HashMap<String, Value>,
    // insertion order of keys, queries return rows in this order
    order: Vec<String>,
}

// MemoryStore keeps tables of serialized rows in process, writes follow the same conditional
// semantics as the DynamoDB tables.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    tables: RwLock<HashMap<String, MemoryTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    // process-wide store shared by every service built for RepositoryStore::InMemory
    pub fn shared() -> Arc<MemoryStore> {
        SHARED_STORE.clone()
    }

    // write validates every condition before applying any row
    pub fn write(&self, writes: &[TableWrite]) -> LibraryResult<usize> {
        let mut tables = self.tables.write().map_err(|_| {
            LibraryError::runtime("memory store lock poisoned", None)
        })?;
        for (i, write) in writes.iter().enumerate() {
            if writes[..i].iter().any(|w| w.table_name == write.table_name && w.key == write.key) {
                return Err(LibraryError::invariant(
                    format!("multiple writes for {} in {}", write.key, write.table_name).as_str(),
                    ReasonCode::DuplicateWrite));
            }
            let existing = tables.get(&write.table_name).and_then(|t| t.rows.get(&write.key));
            check_condition(write, existing)?;
        }
        for write in writes {
            let table = tables.entry(write.table_name.to_string()).or_default();
            if table.rows.insert(write.key.to_string(), write.item.clone()).is_none() {
                table.order.push(write.key.to_string());
            }
        }
        Ok(writes.len())
    }

    pub fn get(&self, table_name: &str, key: &str) -> LibraryResult<Option<Value>> {
        let tables = self.tables.read().map_err(|_| {
            LibraryError::runtime("memory store lock poisoned", None)
        })?;
        Ok(tables.get(table_name).and_then(|t| t.rows.get(key)).cloned())
    }

    pub fn scan(&self, table_name: &str, predicate: &HashMap<String, String>) -> LibraryResult<Vec<Value>> {
        let tables = self.tables.read().map_err(|_| {
            LibraryError::runtime("memory store lock poisoned", None)
        })?;
        let mut matched = vec![];
        if let Some(table) = tables.get(table_name) {
            for key in table.order.iter() {
                if let Some(row) = table.rows.get(key) {
                    if matches_predicate(row, predicate) {
                        matched.push(row.clone());
                    }
                }
            }
        }
        Ok(matched)
    }
}

fn check_condition(write: &TableWrite, existing: Option<&Value>) -> LibraryResult<()> {
    match (write.condition, existing) {
        (WriteCondition::NotExists, None) => Ok(()),
        (WriteCondition::NotExists, Some(_)) => Err(LibraryError::conflict(
            format!("{} {} already exists in {}", write.key_name, write.key, write.table_name).as_str(),
            ReasonCode::VersionConflict)),
        (WriteCondition::VersionEquals(_), None) => Err(LibraryError::not_found(
            format!("{} {} not found in {}", write.key_name, write.key, write.table_name).as_str(),
            ReasonCode::RecordNotFound)),
        (WriteCondition::VersionEquals(expected), Some(row)) => {
            let stored = row.get("version").and_then(Value::as_i64).unwrap_or(0);
            if stored == expected {
                Ok(())
            } else {
                Err(LibraryError::conflict(
                    format!("{} {} in {} has version {} but {} was expected",
                            write.key_name, write.key, write.table_name, stored, expected).as_str(),
                    ReasonCode::VersionConflict))
            }
        }
    }
}

pub(crate) fn matches_predicate(row: &Value, predicate: &HashMap<String, String>) -> bool {
    predicate.iter().all(|(k, expected)| {
        let (field, op) = split_predicate_key(k);
        let actual = row.get(field).unwrap_or(&Value::Null);
        match op {
            PredicateOp::BeginsWith => {
                actual.as_str().map(|s| s.starts_with(expected.as_str())).unwrap_or(false)
            }
            PredicateOp::Ne => compare(actual, expected) != Some(Ordering::Equal),
            _ => match compare(actual, expected) {
                Some(ordering) => match op {
                    PredicateOp::Eq => ordering == Ordering::Equal,
                    PredicateOp::Lt => ordering == Ordering::Less,
                    PredicateOp::Le => ordering != Ordering::Greater,
                    PredicateOp::Gt => ordering == Ordering::Greater,
                    PredicateOp::Ge => ordering != Ordering::Less,
                    _ => false,
                },
                None => false,
            },
        }
    })
}

fn compare(actual: &Value, expected: &str) -> Option<Ordering> {
    match actual {
        Value::String(s) => Some(s.as_str().cmp(expected)),
        Value::Number(n) => {
            if let (Some(a), Ok(e)) = (n.as_i64(), expected.parse::<i64>()) {
                Some(a.cmp(&e))
            } else {
                Some(n.to_string().as_str().cmp(expected))
            }
        }
        Value::Bool(b) => Some(b.to_string().as_str().cmp(expected)),
        _ => None,
    }
}
