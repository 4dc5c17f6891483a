pub mod apply_payment_cmd;
pub mod create_fee_cmd;
pub mod forgive_fee_cmd;
pub mod get_fee_cmd;
pub mod list_fees_cmd;
pub mod list_payments_cmd;
pub mod resume_fee_cmd;
pub mod suspend_fee_cmd;
pub mod waive_fee_cmd;
