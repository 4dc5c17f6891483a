use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::fees::dto::FeeDto;
use crate::loans::dto::LoanDto;
use crate::requests::dto::RequestDto;
use crate::utils::date::serializer;

// CheckOutResult is the new loan with the request it filled, if the patron picked up a hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CheckOutResult {
    pub loan: LoanDto,
    pub filled_request: Option<RequestDto>,
}

// CheckInResult is the closed loan with the fine and the request the item now waits for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CheckInResult {
    pub loan: LoanDto,
    pub was_overdue: bool,
    pub fine_amount: Option<Decimal>,
    pub fee_id: Option<String>,
    pub next_request: Option<RequestDto>,
}

impl CheckInResult {
    pub(crate) fn new(loan: LoanDto, fee: Option<FeeDto>, next_request: Option<RequestDto>) -> Self {
        let was_overdue = loan.return_date.map(|returned| returned > loan.due_date).unwrap_or(false);
        Self {
            loan,
            was_overdue,
            fine_amount: fee.as_ref().map(|f| f.amount),
            fee_id: fee.map(|f| f.fee_id),
            next_request,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RenewResult {
    pub loan_id: String,
    #[serde(with = "serializer")]
    pub previous_due_date: NaiveDateTime,
    #[serde(with = "serializer")]
    pub new_due_date: NaiveDateTime,
    pub renewal_count: i64,
    pub max_renewals: i64,
}

impl RenewResult {
    pub(crate) fn new(previous_due_date: NaiveDateTime, loan: &LoanDto) -> Self {
        Self {
            loan_id: loan.loan_id.to_string(),
            previous_due_date,
            new_due_date: loan.due_date,
            renewal_count: loan.renewal_count,
            max_renewals: loan.max_renewals,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use crate::circulation::dto::{CheckInResult, RenewResult};
    use crate::core::library::LoanStatus;
    use crate::loans::dto::LoanDto;

    fn loan(return_after_days: i64) -> LoanDto {
        let now = Utc::now().naive_utc();
        LoanDto {
            loan_id: "loan1".to_string(),
            version: 1,
            item_id: "item1".to_string(),
            patron_id: "patron1".to_string(),
            item_barcode: "IT-1".to_string(),
            patron_barcode: "PT-1".to_string(),
            loan_date: now,
            due_date: now + Duration::days(14),
            return_date: Some(now + Duration::days(return_after_days)),
            status: LoanStatus::Closed,
            renewal_count: 1,
            max_renewals: 3,
            checkout_service_point_id: "sp1".to_string(),
            checkin_service_point_id: Some("sp1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_should_flag_overdue_check_in() {
        assert!(CheckInResult::new(loan(15), None, None).was_overdue);
        let res = CheckInResult::new(loan(3), None, None);
        assert!(!res.was_overdue);
        assert_eq!(None, res.fine_amount);
    }

    #[tokio::test]
    async fn test_should_serialize_renew_result() {
        let loan = loan(3);
        let res = RenewResult::new(loan.loan_date, &loan);
        let json = serde_json::to_value(&res).expect("serialize");
        assert_eq!("loan1", json["loan_id"]);
        assert_eq!(1, json["renewal_count"]);
        assert_eq!(3, json["max_renewals"]);
    }
}
