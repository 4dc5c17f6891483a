use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::{AttributeDefinition, AttributeValue, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection, ProjectionType, ProvisionedThroughput, ScalarAttributeType, TableStatus};
use serde_json::{Number, Value};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::{PredicateOp, RepositoryStore, split_predicate_key};

const LOCAL_DYNAMODB_URL: &str = "http://localhost:8000";

pub(crate) async fn create_table(client: &Client,
                                 table_name: &str, pk: &str,
                                 gsi_pk: &str, gsi_sk: &str) -> LibraryResult<()> {
    let gsi = GlobalSecondaryIndex::builder()
        .index_name(format!("{}_ndx", table_name))
        .key_schema(KeySchemaElement::builder()
            .attribute_name(gsi_pk)
            .key_type(KeyType::Hash).build())
        .key_schema(KeySchemaElement::builder()
            .attribute_name(gsi_sk)
            .key_type(KeyType::Range).build())
        .projection(Projection::builder().projection_type(ProjectionType::All).build())
        .provisioned_throughput(
            ProvisionedThroughput::builder().read_capacity_units(10).write_capacity_units(10).build())
        .build();

    match client
        .create_table()
        .table_name(table_name)
        .global_secondary_indexes(gsi)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(pk)
                .key_type(KeyType::Hash)
                .build(),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(pk)
                .attribute_type(ScalarAttributeType::S)
                .build(),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(gsi_pk)
                .attribute_type(ScalarAttributeType::S)
                .build(),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(gsi_sk)
                .attribute_type(ScalarAttributeType::S)
                .build(),
        )
        .provisioned_throughput(
            ProvisionedThroughput::builder()
                .read_capacity_units(10)
                .write_capacity_units(10)
                .build(),
        )
        .send()
        .await
    {
        Ok(_k) => {
            wait_until_table_status_is_not(client, table_name, TableStatus::Creating).await;
            Ok(())
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to create {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

pub(crate) async fn delete_table(client: &Client, table_name: &str) -> LibraryResult<()> {
    match client.delete_table().table_name(table_name).send().await {
        Ok(_k) => {
            wait_until_table_status_is_not(client, table_name, TableStatus::Deleting).await;
            Ok(())
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to delete {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

async fn wait_until_table_status_is_not(client: &Client, table_name: &str, other_status: TableStatus) {
    for _i in 0..30 {
        if let Ok(status) = describe_table(client, table_name).await {
            if status != other_status {
                return;
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

async fn describe_table(client: &Client, table_name: &str) -> LibraryResult<TableStatus> {
    match client
        .describe_table()
        .table_name(table_name)
        .send()
        .await
    {
        Ok(out) => {
            if let Some(table) = out.table() {
                if let Some(status) = table.table_status() {
                    return Ok(status.clone());
                }
            }
            Err(LibraryError::runtime(format!("failed to describe {} table",
                                              table_name).as_str(), None))
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to describe {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

pub(crate) fn parse_item(value: Value) -> Result<HashMap<String, AttributeValue>, String> {
    match value_to_item(value) {
        AttributeValue::M(map) => Ok(map),
        other => Err(format!("failed to parse{:?}", other)),
    }
}

// item_to_value converts a stored item back into json so that entities can be deserialized with serde
pub(crate) fn item_to_value(map: &HashMap<String, AttributeValue>) -> Value {
    Value::Object(map.iter().map(|(k, v)| (k.to_string(), attribute_to_value(v))).collect())
}

fn attribute_to_value(attr: &AttributeValue) -> Value {
    match attr {
        AttributeValue::S(s) => Value::String(s.to_string()),
        AttributeValue::N(n) => {
            if let Ok(i) = n.parse::<i64>() {
                Value::from(i)
            } else if let Some(f) = n.parse::<f64>().ok().and_then(Number::from_f64) {
                Value::Number(f)
            } else {
                Value::String(n.to_string())
            }
        }
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::L(list) => Value::Array(list.iter().map(attribute_to_value).collect()),
        AttributeValue::M(map) => item_to_value(map),
        _ => Value::Null,
    }
}

fn value_to_item(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(a) => AttributeValue::L(a.into_iter().map(value_to_item).collect()),
        Value::Object(o) => {
            AttributeValue::M(o.into_iter().map(|(k, v)| (k, value_to_item(v))).collect())
        }
    }
}

// DDBExpression holds key condition, filter and placeholders built from a predicate map.
// Attribute names always go through `#` placeholders, see
// https://docs.aws.amazon.com/amazondynamodb/latest/developerguide/ReservedWords.html
#[derive(Debug, Default, PartialEq)]
pub(crate) struct DDBExpression {
    pub key_condition: Option<String>,
    pub filter: Option<String>,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

// build_expression queries the index when the predicate pins its partition key. The index sort
// key may only appear in the key condition, so `<>` or a second predicate on it makes the
// whole predicate a filter of a scan instead. Predicate values are compared as strings.
pub(crate) fn build_expression(predicate: &HashMap<String, String>,
                               index_pk: Option<&str>, index_sk: Option<&str>) -> DDBExpression {
    let mut expr = DDBExpression::default();
    // sorted so that placeholders are stable
    let sorted: BTreeMap<(&str, PredicateOp), &String> = predicate.iter()
        .map(|(k, v)| (split_predicate_key(k.as_str()), v))
        .collect();
    let on = |key: Option<&str>| sorted.keys().filter(|(field, _)| key == Some(*field)).collect::<Vec<_>>();
    let (pk_keys, sk_keys) = (on(index_pk), on(index_sk));
    let use_index = pk_keys.len() == 1 && pk_keys[0].1 == PredicateOp::Eq
        && sk_keys.len() <= 1 && sk_keys.iter().all(|(_, op)| *op != PredicateOp::Ne);

    let mut keys = vec![];
    let mut filters = vec![];
    for (i, ((field, op), v)) in sorted.iter().enumerate() {
        let name = format!("#f{}", i);
        let val = format!(":v{}", i);
        expr.names.insert(name.to_string(), field.to_string());
        expr.values.insert(val.to_string(), AttributeValue::S(v.to_string()));
        let clause = match op {
            PredicateOp::BeginsWith => format!("begins_with({}, {})", name, val),
            _ => format!("{} {} {}", name, op_expr(*op), val),
        };
        if use_index && (index_pk == Some(*field) || index_sk == Some(*field)) {
            keys.push(clause);
        } else {
            filters.push(clause);
        }
    }
    if !keys.is_empty() {
        expr.key_condition = Some(keys.join(" AND "));
    }
    if !filters.is_empty() {
        expr.filter = Some(filters.join(" AND "));
    }
    expr
}

fn op_expr(op: PredicateOp) -> &'static str {
    match op {
        PredicateOp::Eq => "=",
        PredicateOp::Ne => "<>",
        PredicateOp::Lt => "<",
        PredicateOp::Le => "<=",
        PredicateOp::Gt => ">",
        PredicateOp::Ge => ">=",
        PredicateOp::BeginsWith => "begins_with",
    }
}

// helper method to build db-client with tracing enabled
pub(crate) async fn build_db_client(store: RepositoryStore) -> LibraryResult<Client> {
    match store {
        RepositoryStore::DynamoDB => {
            //Get config from environment.
            let config = aws_config::load_from_env().await;
            //Create the DynamoDB client.
            Ok(Client::new(&config))
        }
        RepositoryStore::LocalDynamoDB => {
            // See https://docs.aws.amazon.com/sdk-for-rust/latest/dg/dynamodb-local.html
            let dynamodb_local_config = aws_sdk_dynamodb::Config::builder()
                .region(Region::new("local"))
                .credentials_provider(
                    Credentials::new("AKIDLOCALSTACK", "localstacksecret", None, None, "faked"))
                .endpoint_url(LOCAL_DYNAMODB_URL)
                .build();
            Ok(Client::from_conf(dynamodb_local_config))
        }
        RepositoryStore::InMemory => {
            Err(LibraryError::runtime("in-memory store has no dynamodb client", None))
        }
    }
}

// helper method to build sns-client with tracing enabled
pub async fn build_sns_client() -> aws_sdk_sns::Client {
    //Get config from environment.
    let config = aws_config::load_from_env().await;
    //Create the SNS client.
    aws_sdk_sns::Client::new(&config)
}

// required to enable CloudWatch error logging by the runtime
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // this needs to be set to false, otherwise ANSI color codes will
        // show up in a confusing manner in CloudWatch logs.
        .with_ansi(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .json()
        .init();
}

impl From<SdkError<GetItemError>> for LibraryError {
    fn from(err: SdkError<GetItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<PutItemError>> for LibraryError {
    fn from(err: SdkError<PutItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<QueryError>> for LibraryError {
    fn from(err: SdkError<QueryError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<ScanError>> for LibraryError {
    fn from(err: SdkError<ScanError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

// a cancelled transaction is reported as 400 and surfaces as a version conflict
impl From<SdkError<TransactWriteItemsError>> for LibraryError {
    fn from(err: SdkError<TransactWriteItemsError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

fn retryable_sdk_error<T>(err: &SdkError<T>) -> (bool, Option<String>) {
    match err {
        SdkError::ConstructionFailure(_) => { (false, Some("ConstructionFailure".to_string())) }
        SdkError::TimeoutError(_) => { (true, Some("TimeoutError".to_string())) }
        SdkError::DispatchFailure(_) => { (true, Some("DispatchFailure".to_string())) }
        SdkError::ResponseError { .. } => { (true, Some("ResponseError".to_string())) }
        SdkError::ServiceError(ctx) => {
            (ctx.raw().http().status().is_server_error() || has_exceeded_limit(ctx.raw().http().body().bytes()), Some(ctx.raw().http().status().to_string()))
        }
        _ => { (true, Some("Unknown".to_string())) }
    }
}

// throughput errors such as ProvisionedThroughputExceeded are transient
fn has_exceeded_limit(opts: Option<&[u8]>) -> bool {
    if let Some(b) = opts {
        return b.windows(6).any(|w| w == b"ceeded");
    }
    false
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use aws_sdk_dynamodb::types::AttributeValue;
    use serde_json::json;
    use crate::utils::ddb::{build_expression, has_exceeded_limit, item_to_value, parse_item};

    #[tokio::test]
    async fn test_should_convert_item_both_ways() {
        let value = json!({"loan_id": "l1", "version": 3, "renewal_count": 0, "return_date": null, "active": true});
        let item = parse_item(value.clone()).expect("should parse");
        assert_eq!(Some(&AttributeValue::N("3".to_string())), item.get("version"));
        assert_eq!(value, item_to_value(&item));
    }

    #[tokio::test]
    async fn test_should_build_key_condition_and_filter() {
        let predicate = HashMap::from([
            ("item_id".to_string(), "i1".to_string()),
            ("patron_id".to_string(), "p1".to_string()),
            ("request_status:begins_with".to_string(), "open".to_string()),
        ]);
        let expr = build_expression(&predicate, Some("item_id"), Some("request_status"));
        assert_eq!(Some("#f0 = :v0 AND begins_with(#f2, :v2)".to_string()), expr.key_condition);
        assert_eq!(Some("#f1 = :v1".to_string()), expr.filter);
        assert_eq!(Some(&"request_status".to_string()), expr.names.get("#f2"));
        assert_eq!(3, expr.values.len());
    }

    #[tokio::test]
    async fn test_should_keep_sort_key_out_of_filter() {
        let predicate = HashMap::from([
            ("item_id".to_string(), "i1".to_string()),
            ("loan_status".to_string(), "open".to_string()),
        ]);
        let expr = build_expression(&predicate, Some("item_id"), Some("loan_status"));
        assert_eq!(Some("#f0 = :v0 AND #f1 = :v1".to_string()), expr.key_condition);
        assert_eq!(None, expr.filter);

        let predicate = HashMap::from([
            ("patron_id".to_string(), "p1".to_string()),
            ("fee_status:<>".to_string(), "closed".to_string()),
        ]);
        let expr = build_expression(&predicate, Some("patron_id"), Some("fee_status"));
        assert_eq!(None, expr.key_condition);
        assert_eq!(Some("#f0 <> :v0 AND #f1 = :v1".to_string()), expr.filter);
    }

    #[tokio::test]
    async fn test_should_build_filter_without_index() {
        let predicate = HashMap::from([
            ("due_date:<".to_string(), "2023-04-11T11:11:11".to_string()),
            ("loan_status".to_string(), "open".to_string()),
        ]);
        let expr = build_expression(&predicate, Some("item_id"), Some("loan_status"));
        assert_eq!(None, expr.key_condition);
        assert_eq!(Some("#f0 < :v0 AND #f1 = :v1".to_string()), expr.filter);
    }

    #[tokio::test]
    async fn test_should_detect_exceeded_limit() {
        assert!(has_exceeded_limit(Some(b"ProvisionedThroughputExceededException")));
        assert!(!has_exceeded_limit(Some(b"abc")));
        assert!(!has_exceeded_limit(None));
    }
}
