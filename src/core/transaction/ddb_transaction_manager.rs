use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, Put, TransactWriteItem};
use tracing::debug;
use crate::core::library::{LibraryError, LibraryResult, ReasonCode};
use crate::core::transaction::{ChangeSet, TableWrite, TransactionManager, WriteCondition};
use crate::utils::ddb::parse_item;

// DynamoDB accepts at most 100 actions in one TransactWriteItems call
const MAX_TRANSACTION_WRITES: usize = 100;

#[derive(Debug)]
pub(crate) struct DDBTransactionManager {
    client: Client,
}

impl DDBTransactionManager {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

fn to_transact_item(write: &TableWrite) -> LibraryResult<TransactWriteItem> {
    let mut put = Put::builder()
        .table_name(write.table_name.as_str())
        .set_item(Some(parse_item(write.item.clone())?))
        .expression_attribute_names("#pk", write.key_name.as_str());
    put = match write.condition {
        WriteCondition::NotExists => {
            put.condition_expression("attribute_not_exists(#pk)")
        }
        WriteCondition::VersionEquals(version) => {
            put.condition_expression("attribute_exists(#pk) AND version = :old_version")
                .expression_attribute_values(":old_version", AttributeValue::N(version.to_string()))
        }
    };
    Ok(TransactWriteItem::builder().put(put.build()).build())
}

#[async_trait]
impl TransactionManager for DDBTransactionManager {
    async fn commit(&self, changes: &ChangeSet) -> LibraryResult<usize> {
        if changes.is_empty() {
            return Ok(0);
        }
        if changes.len() > MAX_TRANSACTION_WRITES {
            return Err(LibraryError::invariant(
                format!("transaction with {} writes exceeds {}", changes.len(), MAX_TRANSACTION_WRITES).as_str(),
                ReasonCode::TooManyWrites));
        }
        let mut items = vec![];
        for write in changes.writes() {
            items.push(to_transact_item(write)?);
        }
        self.client
            .transact_write_items()
            .set_transact_items(Some(items))
            .send()
            .await?;
        debug!("committed {} writes to dynamodb", changes.len());
        Ok(changes.len())
    }
}
