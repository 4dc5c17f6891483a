use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable : Sync + Send {
    fn id(&self) -> String;
    fn version(&self) -> i64;
}

// Versioned is implemented by entities that are updated with optimistic concurrency,
// every committed update advances the version by one.
pub trait Versioned : Identifiable {
    fn advance_version(&mut self, now: NaiveDateTime);
}

// LoanPolicy defines loan period and renewal limit for a patron group
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub(crate) struct LoanPolicy {
    pub loan_period_days: i64,
    pub max_renewals: i64,
}

// Configuration abstracts config options for circulation
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub(crate) struct Configuration {
    pub branch_id: String,
    pub max_holds: i64,
    pub hold_shelf_days: i64,
    pub lock_timeout_ms: u64,
    pub daily_overdue_rate: Decimal,
    pub max_overdue_fine: Decimal,
    pub max_outstanding_balance: Option<Decimal>,
    pub recall_priority: bool,
    pub recall_return_days: Option<i64>,
    pub in_transit_routing: bool,
    pub default_loan_policy: LoanPolicy,
    pub loan_policies: HashMap<String, LoanPolicy>,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            max_holds: 4,
            hold_shelf_days: 10,
            lock_timeout_ms: 5000,
            daily_overdue_rate: Decimal::new(25, 2),
            max_overdue_fine: Decimal::new(1000, 2),
            max_outstanding_balance: None,
            recall_priority: false,
            recall_return_days: None,
            in_transit_routing: true,
            default_loan_policy: LoanPolicy { loan_period_days: 14, max_renewals: 3 },
            loan_policies: HashMap::new(),
        }
    }

    // from_env starts from defaults and overrides them with CIRCULATION_* variables
    pub fn from_env(branch_id: &str) -> Self {
        let mut config = Configuration::new(branch_id);
        config.max_holds = env_or("CIRCULATION_MAX_HOLDS", config.max_holds);
        config.hold_shelf_days = env_or("CIRCULATION_HOLD_SHELF_DAYS", config.hold_shelf_days);
        config.lock_timeout_ms = env_or("CIRCULATION_LOCK_TIMEOUT_MS", config.lock_timeout_ms);
        config.daily_overdue_rate = env_or("CIRCULATION_DAILY_OVERDUE_RATE", config.daily_overdue_rate);
        config.max_overdue_fine = env_or("CIRCULATION_MAX_OVERDUE_FINE", config.max_overdue_fine);
        config.max_outstanding_balance = env_opt("CIRCULATION_MAX_OUTSTANDING_BALANCE").or(config.max_outstanding_balance);
        config.recall_priority = env_or("CIRCULATION_RECALL_PRIORITY", config.recall_priority);
        config.recall_return_days = env_opt("CIRCULATION_RECALL_RETURN_DAYS").or(config.recall_return_days);
        config.in_transit_routing = env_or("CIRCULATION_IN_TRANSIT_ROUTING", config.in_transit_routing);
        config.default_loan_policy.loan_period_days = env_or("CIRCULATION_LOAN_PERIOD_DAYS", config.default_loan_policy.loan_period_days);
        config.default_loan_policy.max_renewals = env_or("CIRCULATION_MAX_RENEWALS", config.default_loan_policy.max_renewals);
        if let Ok(json) = env::var("CIRCULATION_LOAN_POLICIES") {
            match serde_json::from_str::<HashMap<String, LoanPolicy>>(json.as_str()) {
                Ok(policies) => config.loan_policies = policies,
                Err(err) => warn!("ignoring CIRCULATION_LOAN_POLICIES {:?}", err),
            }
        }
        config
    }

    pub fn with_loan_policy(mut self, patron_group: &str, policy: LoanPolicy) -> Self {
        self.loan_policies.insert(patron_group.to_string(), policy);
        self
    }

    pub fn loan_policy(&self, patron_group: &str) -> LoanPolicy {
        self.loan_policies.get(patron_group).copied().unwrap_or(self.default_loan_policy)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

fn env_opt<T: FromStr>(name: &str) -> Option<T> {
    let val = env::var(name).ok()?;
    match val.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("ignoring invalid value {} for {}", val, name);
            None
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env_opt(name).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use crate::core::domain::{Configuration, LoanPolicy};

    #[tokio::test]
    async fn test_should_build_config() {
        let config = Configuration::new("test");
        assert_eq!(4, config.max_holds);
        assert_eq!(10, config.hold_shelf_days);
        assert_eq!(14, config.default_loan_policy.loan_period_days);
        assert_eq!(dec!(0.25), config.daily_overdue_rate);
        assert_eq!(dec!(10.00), config.max_overdue_fine);
        assert!(!config.recall_priority);
    }

    #[tokio::test]
    async fn test_should_select_loan_policy_by_group() {
        let config = Configuration::new("test")
            .with_loan_policy("faculty", LoanPolicy { loan_period_days: 90, max_renewals: 5 });
        assert_eq!(90, config.loan_policy("faculty").loan_period_days);
        assert_eq!(14, config.loan_policy("undergrad").loan_period_days);
    }

    #[tokio::test]
    async fn test_should_read_config_from_env() {
        std::env::set_var("CIRCULATION_HOLD_SHELF_DAYS", "3");
        std::env::set_var("CIRCULATION_MAX_OUTSTANDING_BALANCE", "20.50");
        let config = Configuration::from_env("test");
        std::env::remove_var("CIRCULATION_HOLD_SHELF_DAYS");
        std::env::remove_var("CIRCULATION_MAX_OUTSTANDING_BALANCE");
        assert_eq!(3, config.hold_shelf_days);
        assert_eq!(Some(dec!(20.50)), config.max_outstanding_balance);
    }
}
