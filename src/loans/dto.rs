use std::collections::HashMap;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::library::LoanStatus;
use crate::loans::domain::model::LoanEntity;
use crate::utils::date::{format_date, opt_serializer, serializer};

// LoanDto is returned to callers of check-out, check-in, renew and loan listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LoanDto {
    pub loan_id: String,
    pub version: i64,
    pub item_id: String,
    #[serde(rename = "user_id")]
    pub patron_id: String,
    pub item_barcode: String,
    #[serde(rename = "user_barcode")]
    pub patron_barcode: String,
    #[serde(with = "serializer")]
    pub loan_date: NaiveDateTime,
    #[serde(with = "serializer")]
    pub due_date: NaiveDateTime,
    #[serde(with = "opt_serializer", default)]
    pub return_date: Option<NaiveDateTime>,
    pub status: LoanStatus,
    pub renewal_count: i64,
    pub max_renewals: i64,
    pub checkout_service_point_id: String,
    pub checkin_service_point_id: Option<String>,
}

impl From<&LoanEntity> for LoanDto {
    fn from(other: &LoanEntity) -> Self {
        Self {
            loan_id: other.loan_id.to_string(),
            version: other.version,
            item_id: other.item_id.to_string(),
            patron_id: other.patron_id.to_string(),
            item_barcode: other.item_barcode.to_string(),
            patron_barcode: other.patron_barcode.to_string(),
            loan_date: other.loan_date,
            due_date: other.due_date,
            return_date: other.return_date,
            status: other.loan_status,
            renewal_count: other.renewal_count,
            max_renewals: other.max_renewals,
            checkout_service_point_id: other.checkout_service_point_id.to_string(),
            checkin_service_point_id: other.checkin_service_point_id.clone(),
        }
    }
}

// LoanFilter narrows loan listings
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LoanFilter {
    #[serde(default)]
    pub status: Option<LoanStatus>,
    #[serde(default)]
    pub overdue_only: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub item_id: Option<String>,
}

impl LoanFilter {
    pub fn to_predicate(&self, now: NaiveDateTime) -> HashMap<String, String> {
        let mut predicate = HashMap::new();
        if let Some(item_id) = &self.item_id {
            predicate.insert("item_id".to_string(), item_id.to_string());
        }
        if let Some(user_id) = &self.user_id {
            predicate.insert("patron_id".to_string(), user_id.to_string());
        }
        if self.overdue_only {
            // only open loans can be overdue
            predicate.insert("loan_status".to_string(), LoanStatus::Open.to_string());
            predicate.insert("due_date:<".to_string(), format_date(now));
        } else if let Some(status) = self.status {
            predicate.insert("loan_status".to_string(), status.to_string());
        }
        predicate
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use crate::core::library::LoanStatus;
    use crate::loans::dto::LoanFilter;
    use crate::utils::date::format_date;

    #[tokio::test]
    async fn test_should_build_overdue_predicate() {
        let now = Utc::now().naive_utc();
        let filter = LoanFilter { status: Some(LoanStatus::Closed), overdue_only: true, user_id: Some("p1".to_string()), item_id: None };
        let predicate = filter.to_predicate(now);
        assert_eq!(Some(&"open".to_string()), predicate.get("loan_status"));
        assert_eq!(Some(&format_date(now)), predicate.get("due_date:<"));
        assert_eq!(Some(&"p1".to_string()), predicate.get("patron_id"));
        assert!(LoanFilter::default().to_predicate(now).is_empty());
    }
}
