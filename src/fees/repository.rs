use std::collections::HashMap;
use async_trait::async_trait;
use crate::core::library::{FeeStatus, LibraryResult};
use crate::core::repository::ddb_repository::DDBRepository;
use crate::core::repository::memory_repository::MemoryRepository;
use crate::core::repository::Repository;
use crate::fees::domain::model::{FeeEntity, PaymentEntity};

pub(crate) const FEES_TABLE: &str = "fees";
pub(crate) const FEES_KEY: &str = "fee_id";
pub(crate) const FEES_INDEX: &str = "fees_ndx";
pub(crate) const FEES_INDEX_PK: &str = "patron_id";
pub(crate) const FEES_INDEX_SK: &str = "fee_status";

pub(crate) const PAYMENTS_TABLE: &str = "payments";
pub(crate) const PAYMENTS_KEY: &str = "payment_id";
pub(crate) const PAYMENTS_INDEX: &str = "payments_ndx";
pub(crate) const PAYMENTS_INDEX_PK: &str = "fee_id";
pub(crate) const PAYMENTS_INDEX_SK: &str = "created_at";

#[async_trait]
pub(crate) trait FeeRepository: Repository<FeeEntity> {
    // open and suspended fees of a patron, one index query per status
    async fn find_unsettled_for_patron(&self, patron_id: &str) -> LibraryResult<Vec<FeeEntity>> {
        let mut fees = vec![];
        for status in [FeeStatus::Open, FeeStatus::Suspended] {
            fees.extend(self.query_all(&HashMap::from([
                ("patron_id".to_string(), patron_id.to_string()),
                ("fee_status".to_string(), status.to_string()),
            ])).await?);
        }
        Ok(fees)
    }
}

impl FeeRepository for DDBRepository<FeeEntity> {}

impl FeeRepository for MemoryRepository<FeeEntity> {}

// payments are listed by page, the balance of a fee is checked against FeeEntity::paid_total
pub(crate) trait PaymentRepository: Repository<PaymentEntity> {}

impl PaymentRepository for DDBRepository<PaymentEntity> {}

impl PaymentRepository for MemoryRepository<PaymentEntity> {}
