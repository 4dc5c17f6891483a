pub mod ddb_transaction_manager;
pub mod memory_transaction_manager;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use crate::core::domain::{Identifiable, Versioned};
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult, ReasonCode};
use crate::core::repository::RepositoryStore;
use crate::core::transaction::ddb_transaction_manager::DDBTransactionManager;
use crate::core::transaction::memory_transaction_manager::MemoryTransactionManager;
use crate::utils::date::format_date;
use crate::utils::ddb::build_db_client;
use crate::utils::memory::MemoryStore;

// WriteCondition guards a staged write, a failed condition aborts the whole transaction
#[derive(Debug, PartialEq, Clone, Copy)]
pub(crate) enum WriteCondition {
    NotExists,
    VersionEquals(i64),
}

// TableWrite is a single conditional put of a serialized entity
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct TableWrite {
    pub table_name: String,
    pub key_name: String,
    pub key: String,
    pub item: Value,
    pub condition: WriteCondition,
}

impl TableWrite {
    pub fn create<E: Identifiable + Serialize>(table_name: &str, key_name: &str, entity: &E) -> LibraryResult<Self> {
        Ok(TableWrite {
            table_name: table_name.to_string(),
            key_name: key_name.to_string(),
            key: entity.id(),
            item: serde_json::to_value(entity)?,
            condition: WriteCondition::NotExists,
        })
    }

    // update writes the entity with its version advanced by one, it only succeeds while the
    // stored version still equals the version that was read
    pub fn update<E: Identifiable + Serialize>(table_name: &str, key_name: &str, entity: &E, now: NaiveDateTime) -> LibraryResult<Self> {
        let mut item = serde_json::to_value(entity)?;
        if let Value::Object(ref mut map) = item {
            map.insert("version".to_string(), Value::from(entity.version() + 1));
            if map.contains_key("updated_at") {
                map.insert("updated_at".to_string(), Value::from(format_date(now)));
            }
        } else {
            return Err(LibraryError::serialization(
                format!("entity {} is not serialized as an object", entity.id()).as_str()));
        }
        Ok(TableWrite {
            table_name: table_name.to_string(),
            key_name: key_name.to_string(),
            key: entity.id(),
            item,
            condition: WriteCondition::VersionEquals(entity.version()),
        })
    }
}

// ChangeSet collects all writes and events of one circulation operation so that they are
// committed together or not at all.
#[derive(Debug, Default)]
pub(crate) struct ChangeSet {
    now: Option<NaiveDateTime>,
    writes: Vec<TableWrite>,
    events: Vec<DomainEvent>,
}

impl ChangeSet {
    pub fn new() -> Self {
        ChangeSet::default()
    }

    // at fixes the clock of the operation, e.g. for a back-dated check-in
    pub fn at(now: NaiveDateTime) -> Self {
        ChangeSet { now: Some(now), ..ChangeSet::default() }
    }

    // stamp used for updated_at of every staged update
    pub fn now(&mut self) -> NaiveDateTime {
        *self.now.get_or_insert_with(|| Utc::now().naive_utc())
    }

    pub fn create<E: Identifiable + Serialize>(&mut self, table_name: &str, key_name: &str, entity: &E) -> LibraryResult<()> {
        let write = TableWrite::create(table_name, key_name, entity)?;
        self.push(write)
    }

    // stages the update and advances the in-memory entity to the version it will have once committed
    pub fn update<E: Versioned + Serialize>(&mut self, table_name: &str, key_name: &str, entity: &mut E) -> LibraryResult<()> {
        let now = self.now();
        let write = TableWrite::update(table_name, key_name, entity, now)?;
        self.push(write)?;
        entity.advance_version(now);
        Ok(())
    }

    pub fn publish(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    pub fn writes(&self) -> &[TableWrite] {
        &self.writes
    }

    pub fn events(&self) -> &[DomainEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    fn push(&mut self, write: TableWrite) -> LibraryResult<()> {
        if self.writes.iter().any(|w| w.table_name == write.table_name && w.key == write.key) {
            // each record may only be written once per transaction, see callers for batching
            return Err(LibraryError::invariant(
                format!("record {} in {} staged twice", write.key, write.table_name).as_str(),
                ReasonCode::DuplicateWrite));
        }
        self.writes.push(write);
        Ok(())
    }
}

#[async_trait]
pub(crate) trait TransactionManager: Sync + Send {
    // commit applies every staged write atomically and returns the number of writes
    async fn commit(&self, changes: &ChangeSet) -> LibraryResult<usize>;
}

pub(crate) async fn create_transaction_manager(store: RepositoryStore) -> LibraryResult<Box<dyn TransactionManager>> {
    match store {
        RepositoryStore::DynamoDB | RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await?;
            Ok(Box::new(DDBTransactionManager::new(client)))
        }
        RepositoryStore::InMemory => {
            Ok(Box::new(MemoryTransactionManager::new(MemoryStore::shared())))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDateTime, Utc};
    use serde::Serialize;
    use crate::core::domain::{Identifiable, Versioned};
    use crate::core::library::{LibraryError, ReasonCode};
    use crate::core::transaction::{ChangeSet, WriteCondition};

    #[derive(Debug, Clone, Serialize)]
    struct Sample {
        sample_id: String,
        version: i64,
        updated_at: NaiveDateTime,
    }

    impl Identifiable for Sample {
        fn id(&self) -> String {
            self.sample_id.to_string()
        }

        fn version(&self) -> i64 {
            self.version
        }
    }

    impl Versioned for Sample {
        fn advance_version(&mut self, now: NaiveDateTime) {
            self.version += 1;
            self.updated_at = now;
        }
    }

    #[tokio::test]
    async fn test_should_stage_create_and_update() {
        let mut changes = ChangeSet::new();
        let created = Sample { sample_id: "a".to_string(), version: 0, updated_at: Utc::now().naive_utc() };
        let mut updated = Sample { sample_id: "b".to_string(), version: 3, updated_at: Utc::now().naive_utc() };
        changes.create("samples", "sample_id", &created).expect("should stage create");
        changes.update("samples", "sample_id", &mut updated).expect("should stage update");
        assert_eq!(2, changes.len());
        assert_eq!(WriteCondition::NotExists, changes.writes()[0].condition);
        assert_eq!(WriteCondition::VersionEquals(3), changes.writes()[1].condition);
        assert_eq!(4, changes.writes()[1].item["version"]);
        assert_eq!(4, updated.version);
    }

    #[tokio::test]
    async fn test_should_use_fixed_clock() {
        let now = Utc::now().naive_utc();
        let mut changes = ChangeSet::at(now);
        assert_eq!(now, changes.now());
        let mut sample = Sample { sample_id: "a".to_string(), version: 0, updated_at: now };
        changes.update("samples", "sample_id", &mut sample).expect("should stage update");
        assert_eq!(now, sample.updated_at);
    }

    #[tokio::test]
    async fn test_should_reject_double_write() {
        let mut changes = ChangeSet::new();
        let mut sample = Sample { sample_id: "a".to_string(), version: 0, updated_at: Utc::now().naive_utc() };
        changes.update("samples", "sample_id", &mut sample).expect("should stage update");
        let err = changes.update("samples", "sample_id", &mut sample).unwrap_err();
        assert!(matches!(err, LibraryError::Invariant { reason_code: ReasonCode::DuplicateWrite, .. }));
    }
}
