pub mod ddb;
pub mod events;
pub mod logs;
pub mod sns;
pub mod factory;

// GatewayPublisherVia selects where domain events are handed off for notification delivery
#[derive(Debug, PartialEq, Clone, Copy)]
pub(crate) enum GatewayPublisherVia {
    Sns,
    LocalDynamoDB,
    Logs,
}
