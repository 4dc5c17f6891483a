use std::collections::HashMap;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::core::library::{FeeStatus, FeeType, PaymentMethod};
use crate::fees::domain::model::{FeeEntity, PaymentEntity};
use crate::utils::date::{opt_serializer, serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct FeeDto {
    pub fee_id: String,
    pub version: i64,
    #[serde(rename = "user_id")]
    pub patron_id: String,
    pub item_id: Option<String>,
    pub loan_id: Option<String>,
    pub fee_type: FeeType,
    pub status: FeeStatus,
    pub amount: Decimal,
    pub remaining: Decimal,
    pub reason: String,
    pub description: Option<String>,
    #[serde(with = "opt_serializer", default)]
    pub due_date: Option<NaiveDateTime>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
}

impl From<&FeeEntity> for FeeDto {
    fn from(other: &FeeEntity) -> Self {
        Self {
            fee_id: other.fee_id.to_string(),
            version: other.version,
            patron_id: other.patron_id.to_string(),
            item_id: other.item_id.clone(),
            loan_id: other.loan_id.clone(),
            fee_type: other.fee_type,
            status: other.fee_status,
            amount: other.amount,
            remaining: other.remaining,
            reason: other.reason.to_string(),
            description: other.description.clone(),
            due_date: other.due_date,
            created_at: other.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PaymentDto {
    pub payment_id: String,
    pub fee_id: String,
    #[serde(rename = "user_id")]
    pub patron_id: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
    pub created_by: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
}

impl From<&PaymentEntity> for PaymentDto {
    fn from(other: &PaymentEntity) -> Self {
        Self {
            payment_id: other.payment_id.to_string(),
            fee_id: other.fee_id.to_string(),
            patron_id: other.patron_id.to_string(),
            amount: other.amount,
            payment_method: other.payment_method,
            note: other.note.clone(),
            created_by: other.created_by.clone(),
            created_at: other.created_at,
        }
    }
}

// FeeFilter narrows fee listings
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct FeeFilter {
    #[serde(default)]
    pub status: Option<FeeStatus>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub item_id: Option<String>,
}

impl FeeFilter {
    pub fn to_predicate(&self) -> HashMap<String, String> {
        let mut predicate = HashMap::new();
        if let Some(user_id) = &self.user_id {
            predicate.insert("patron_id".to_string(), user_id.to_string());
        }
        if let Some(item_id) = &self.item_id {
            predicate.insert("item_id".to_string(), item_id.to_string());
        }
        if let Some(status) = self.status {
            predicate.insert("fee_status".to_string(), status.to_string());
        }
        predicate
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use crate::core::library::{FeeStatus, FeeType};
    use crate::fees::domain::model::FeeEntity;
    use crate::fees::dto::{FeeDto, FeeFilter};

    #[tokio::test]
    async fn test_should_serialize_amounts_as_decimal_strings() {
        let fee = FeeEntity::new("p1", FeeType::Processing, dec!(2.50), "processing", None, Utc::now().naive_utc()).expect("fee");
        let json = serde_json::to_value(FeeDto::from(&fee)).expect("should serialize");
        assert_eq!("2.50", json["amount"]);
        assert_eq!("p1", json["user_id"]);
        assert_eq!("open", json["status"]);
        let parsed: FeeDto = serde_json::from_value(json).expect("should parse");
        assert_eq!(dec!(2.50), parsed.remaining);
    }

    #[tokio::test]
    async fn test_should_build_fee_predicate() {
        let filter = FeeFilter { status: Some(FeeStatus::Suspended), user_id: Some("p1".to_string()), item_id: None };
        let predicate = filter.to_predicate();
        assert_eq!(Some(&"suspended".to_string()), predicate.get("fee_status"));
        assert_eq!(Some(&"p1".to_string()), predicate.get("patron_id"));
        assert_eq!(2, predicate.len());
    }
}
