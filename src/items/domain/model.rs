use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::{Identifiable, Versioned};
use crate::utils::date::serializer;

// ItemEntity is a physical copy that circulates, identified by its barcode. It also points at
// the item's open loan and open requests; every circulation transaction of the item rewrites
// it with a version check, so decisions taken on an outdated item never commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ItemEntity {
    pub item_id: String,
    pub version: i64,
    pub barcode: String,
    pub title: String,
    // home service point of the item
    pub location_id: String,
    #[serde(default)]
    pub open_loan_id: Option<String>,
    #[serde(default)]
    pub request_ids: Vec<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl ItemEntity {
    pub fn new(barcode: &str, title: &str, location_id: &str) -> Self {
        Self {
            item_id: Uuid::new_v4().to_string(),
            version: 0,
            barcode: barcode.to_string(),
            title: title.to_string(),
            location_id: location_id.to_string(),
            open_loan_id: None,
            request_ids: vec![],
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for ItemEntity {
    fn id(&self) -> String {
        self.item_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Versioned for ItemEntity {
    fn advance_version(&mut self, now: NaiveDateTime) {
        self.version += 1;
        self.updated_at = now;
    }
}
