use crate::core::repository::ddb_repository::DDBRepository;
use crate::core::repository::memory_repository::MemoryRepository;
use crate::core::repository::Repository;
use crate::loans::domain::model::LoanEntity;

pub(crate) const LOANS_TABLE: &str = "loans";
pub(crate) const LOANS_KEY: &str = "loan_id";
pub(crate) const LOANS_INDEX: &str = "loans_ndx";
pub(crate) const LOANS_INDEX_PK: &str = "item_id";
pub(crate) const LOANS_INDEX_SK: &str = "loan_status";

// open loans are found through ItemEntity::open_loan_id, the index only serves listings
pub(crate) trait LoanRepository: Repository<LoanEntity> {}

impl LoanRepository for DDBRepository<LoanEntity> {}

impl LoanRepository for MemoryRepository<LoanEntity> {}
