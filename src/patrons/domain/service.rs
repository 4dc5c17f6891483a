use async_trait::async_trait;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult, ReasonCode};
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::domain::PatronService;
use crate::patrons::dto::PatronDto;
use crate::patrons::repository::PatronRepository;

pub(crate) struct PatronServiceImpl {
    patron_repository: Box<dyn PatronRepository>,
}

impl PatronServiceImpl {
    pub(crate) fn new(_config: &Configuration, patron_repository: Box<dyn PatronRepository>) -> Self {
        PatronServiceImpl {
            patron_repository,
        }
    }
}

#[async_trait]
impl PatronService for PatronServiceImpl {
    async fn add_patron(&self, patron: &PatronDto) -> LibraryResult<PatronDto> {
        if patron.barcode.is_empty() {
            return Err(LibraryError::validation("patron barcode is required", None));
        }
        match self.patron_repository.find_by_barcode(patron.barcode.as_str()).await {
            Ok(_) => {
                return Err(LibraryError::conflict(
                    format!("patron barcode {} already exists", patron.barcode).as_str(), ReasonCode::VersionConflict));
            }
            Err(LibraryError::NotFound { .. }) => {}
            Err(err) => return Err(err),
        }
        self.patron_repository.create(&PatronEntity::from(patron)).await?;
        Ok(patron.clone())
    }

    async fn update_patron(&self, patron: &PatronDto) -> LibraryResult<PatronDto> {
        self.patron_repository.update(&PatronEntity::from(patron)).await?;
        self.find_patron_by_id(patron.patron_id.as_str()).await
    }

    async fn find_patron_by_id(&self, id: &str) -> LibraryResult<PatronDto> {
        match self.patron_repository.get(id).await {
            Ok(patron) => Ok(PatronDto::from(&patron)),
            Err(LibraryError::NotFound { .. }) => Err(LibraryError::not_found(
                format!("patron not found for {}", id).as_str(), ReasonCode::PatronNotFound)),
            Err(err) => Err(err),
        }
    }

    async fn find_patron_by_barcode(&self, barcode: &str) -> LibraryResult<PatronDto> {
        self.patron_repository.find_by_barcode(barcode).await.map(|p| PatronDto::from(&p))
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use uuid::Uuid;
    use crate::core::domain::Configuration;
    use crate::core::library::{LibraryError, ReasonCode};
    use crate::core::repository::RepositoryStore;
    use crate::patrons::domain::PatronService;
    use crate::patrons::dto::PatronDto;
    use crate::patrons::factory;

    lazy_static! {
        static ref SUT_SVC: AsyncOnce<Box<dyn PatronService>> = AsyncOnce::new(async {
                factory::create_patron_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("patron service")
            });
    }

    #[tokio::test]
    async fn test_should_add_patron() {
        let patron_svc = SUT_SVC.get().await;
        let patron = PatronDto::new(format!("PT-{}", Uuid::new_v4()).as_str(), "faculty");
        patron_svc.add_patron(&patron).await.expect("should add patron");

        let loaded = patron_svc.find_patron_by_barcode(patron.barcode.as_str()).await.expect("should return patron");
        assert_eq!(patron.patron_id, loaded.patron_id);
        assert_eq!("faculty", loaded.patron_group);
    }

    #[tokio::test]
    async fn test_should_deactivate_patron() {
        let patron_svc = SUT_SVC.get().await;
        let mut patron = PatronDto::new(format!("PT-{}", Uuid::new_v4()).as_str(), "staff");
        patron_svc.add_patron(&patron).await.expect("should add patron");

        patron.active = false;
        let updated = patron_svc.update_patron(&patron).await.expect("should update patron");
        assert!(!updated.active);
        assert_eq!(1, updated.version);
    }

    #[tokio::test]
    async fn test_should_not_find_unknown_patron() {
        let patron_svc = SUT_SVC.get().await;
        assert!(matches!(patron_svc.find_patron_by_barcode("missing").await,
            Err(LibraryError::NotFound { reason_code: ReasonCode::PatronNotFound, .. })));
        assert!(matches!(patron_svc.find_patron_by_id("missing").await,
            Err(LibraryError::NotFound { reason_code: ReasonCode::PatronNotFound, .. })));
    }
}
