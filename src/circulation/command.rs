pub mod cancel_request_cmd;
pub mod check_in_cmd;
pub mod check_out_cmd;
pub mod create_request_cmd;
pub mod expire_pickup_cmd;
pub mod item_queue_cmd;
pub mod list_loans_cmd;
pub mod list_requests_cmd;
pub mod receive_in_transit_cmd;
pub mod renew_cmd;
