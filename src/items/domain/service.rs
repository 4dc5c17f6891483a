use async_trait::async_trait;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult, ReasonCode};
use crate::core::transaction::ChangeSet;
use crate::items::domain::ItemService;
use crate::items::domain::model::ItemEntity;
use crate::items::dto::ItemDto;
use crate::items::repository::{ITEMS_KEY, ITEMS_TABLE, ItemRepository};

pub(crate) struct ItemServiceImpl {
    item_repository: Box<dyn ItemRepository>,
}

impl ItemServiceImpl {
    pub(crate) fn new(_config: &Configuration, item_repository: Box<dyn ItemRepository>) -> Self {
        ItemServiceImpl {
            item_repository,
        }
    }
}

#[async_trait]
impl ItemService for ItemServiceImpl {
    async fn add_item(&self, item: &ItemDto) -> LibraryResult<ItemDto> {
        if item.barcode.is_empty() {
            return Err(LibraryError::validation("item barcode is required", None));
        }
        match self.item_repository.find_by_barcode(item.barcode.as_str()).await {
            Ok(_) => {
                return Err(LibraryError::conflict(
                    format!("item barcode {} already exists", item.barcode).as_str(), ReasonCode::VersionConflict));
            }
            Err(LibraryError::NotFound { .. }) => {}
            Err(err) => return Err(err),
        }
        // circulation pointers are only written by circulation
        let mut entity = ItemEntity::from(item);
        entity.open_loan_id = None;
        entity.request_ids = vec![];
        self.item_repository.create(&entity).await?;
        Ok(ItemDto::from(&entity))
    }

    async fn find_item_by_id(&self, id: &str) -> LibraryResult<ItemDto> {
        match self.item_repository.get(id).await {
            Ok(item) => Ok(ItemDto::from(&item)),
            Err(LibraryError::NotFound { .. }) => Err(LibraryError::not_found(
                format!("item not found for {}", id).as_str(), ReasonCode::ItemNotFound)),
            Err(err) => Err(err),
        }
    }

    async fn find_item_by_barcode(&self, barcode: &str) -> LibraryResult<ItemDto> {
        self.item_repository.find_by_barcode(barcode).await.map(|i| ItemDto::from(&i))
    }

    fn stage_circulation(&self, changes: &mut ChangeSet, item: &mut ItemDto) -> LibraryResult<()> {
        let mut entity = ItemEntity::from(&*item);
        changes.update(ITEMS_TABLE, ITEMS_KEY, &mut entity)?;
        *item = ItemDto::from(&entity);
        Ok(())
    }
}
