pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::core::transaction::ChangeSet;
use crate::items::dto::ItemDto;

// ItemService is the boundary to catalog/inventory, circulation only needs identity,
// barcode and the service point an item is shelved at.
#[async_trait]
pub(crate) trait ItemService: Sync + Send {
    async fn add_item(&self, item: &ItemDto) -> LibraryResult<ItemDto>;
    async fn find_item_by_id(&self, id: &str) -> LibraryResult<ItemDto>;
    async fn find_item_by_barcode(&self, barcode: &str) -> LibraryResult<ItemDto>;

    // stages the item's circulation pointers as a versioned update, `item` must have been read
    // by id under the item lock
    fn stage_circulation(&self, changes: &mut ChangeSet, item: &mut ItemDto) -> LibraryResult<()>;
}
