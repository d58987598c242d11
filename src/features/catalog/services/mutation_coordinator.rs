use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::catalog::clients::CatalogRepository;
use crate::features::catalog::dtos::{CategoryFormDto, ServiceFormDto, TranslationFormDto};
use crate::features::catalog::models::{Category, OwnerKind, Service};
use crate::features::catalog::services::CatalogQuery;
use crate::modules::http::FileUpload;

/// Write actions tracked by a pending flag each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    CreateCategory,
    UpdateCategory,
    AddCategoryLanguage,
    CreateService,
    UpdateService,
    AddServiceLanguage,
    DeleteService,
    ImportServices,
}

impl MutationKind {
    const COUNT: usize = 8;

    fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            MutationKind::CreateCategory => "Creating a category",
            MutationKind::UpdateCategory => "Updating a category",
            MutationKind::AddCategoryLanguage => "Adding a category translation",
            MutationKind::CreateService => "Creating a service",
            MutationKind::UpdateService => "Updating a service",
            MutationKind::AddServiceLanguage => "Adding a service translation",
            MutationKind::DeleteService => "Deleting a service",
            MutationKind::ImportServices => "Importing services",
        }
    }
}

/// One in-flight flag per mutation kind
#[derive(Debug, Default)]
pub struct PendingFlags {
    flags: [AtomicBool; MutationKind::COUNT],
}

impl PendingFlags {
    /// Claim the flag for `kind`; a second claim while held is rejected.
    pub fn begin(&self, kind: MutationKind) -> Result<PendingGuard<'_>> {
        let flag = &self.flags[kind.index()];
        if flag.swap(true, Ordering::AcqRel) {
            return Err(AppError::Conflict(format!(
                "{} is already in progress",
                kind.label()
            )));
        }
        Ok(PendingGuard { flag })
    }

    pub fn is_pending(&self, kind: MutationKind) -> bool {
        self.flags[kind.index()].load(Ordering::Acquire)
    }
}

/// Clears its pending flag when dropped, on success and failure alike
pub struct PendingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Pending flags as the page renders them
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PendingStatus {
    pub is_creating_category: bool,
    pub is_updating_category: bool,
    pub is_adding_category_language: bool,
    pub is_creating_service: bool,
    pub is_updating_service: bool,
    pub is_adding_service_language: bool,
    pub is_deleting_service: bool,
    pub is_importing_services: bool,
}

/// Sequences one repository write, then one catalog refetch.
///
/// There is no optimistic update: the tree keeps showing the previous
/// snapshot until the refetch lands. Errors are returned untouched so the
/// page can keep the form open with the API's message.
pub struct MutationCoordinator {
    repository: Arc<dyn CatalogRepository>,
    query: Arc<CatalogQuery>,
    pending: PendingFlags,
}

impl MutationCoordinator {
    pub fn new(repository: Arc<dyn CatalogRepository>, query: Arc<CatalogQuery>) -> Self {
        Self {
            repository,
            query,
            pending: PendingFlags::default(),
        }
    }

    pub fn pending_status(&self) -> PendingStatus {
        let p = &self.pending;
        PendingStatus {
            is_creating_category: p.is_pending(MutationKind::CreateCategory),
            is_updating_category: p.is_pending(MutationKind::UpdateCategory),
            is_adding_category_language: p.is_pending(MutationKind::AddCategoryLanguage),
            is_creating_service: p.is_pending(MutationKind::CreateService),
            is_updating_service: p.is_pending(MutationKind::UpdateService),
            is_adding_service_language: p.is_pending(MutationKind::AddServiceLanguage),
            is_deleting_service: p.is_pending(MutationKind::DeleteService),
            is_importing_services: p.is_pending(MutationKind::ImportServices),
        }
    }

    /// Update when an id is given, create otherwise.
    pub async fn submit_category(
        &self,
        existing_id: Option<i64>,
        form: CategoryFormDto,
        icon: Option<FileUpload>,
    ) -> Result<Category> {
        form.validate()?;
        let payload = form.to_multipart(icon);
        tracing::debug!("Submitting category form (icon: {})", payload.has_file("icon"));

        let category = match existing_id {
            Some(id) => {
                let _guard = self.pending.begin(MutationKind::UpdateCategory)?;
                let updated = self.repository.update_category(id, payload).await?;
                tracing::info!("Category {} updated", id);
                self.refresh().await;
                updated
            }
            None => {
                let _guard = self.pending.begin(MutationKind::CreateCategory)?;
                let created = self.repository.create_category(payload).await?;
                tracing::info!("Category created: {:?}", created.key());
                self.refresh().await;
                created
            }
        };

        Ok(category)
    }

    /// Update when an id is given, create otherwise. A parent id links the
    /// service under that service, for new and edited services alike.
    pub async fn submit_service(
        &self,
        existing_id: Option<i64>,
        parent_service_id: Option<i64>,
        mut form: ServiceFormDto,
        icon: Option<FileUpload>,
    ) -> Result<Service> {
        form.validate()?;
        match parent_service_id {
            Some(parent_id) => {
                if let Some(category_id) = self.check_parent(existing_id, parent_id).await? {
                    form.category_id = Some(category_id);
                }
            }
            None if existing_id.is_none() => self.check_category(form.category_id).await?,
            None => {}
        }

        let mut payload = form.to_multipart(icon);
        tracing::debug!("Submitting service form (icon: {})", payload.has_file("icon"));
        if let Some(parent_id) = parent_service_id {
            payload.set_text("parentServiceId", parent_id.to_string());
        }

        let service = match existing_id {
            Some(id) => {
                let _guard = self.pending.begin(MutationKind::UpdateService)?;
                let updated = self.repository.update_service(id, payload).await?;
                tracing::info!("Service {} updated", id);
                self.refresh().await;
                updated
            }
            None => {
                let _guard = self.pending.begin(MutationKind::CreateService)?;
                let created = self.repository.create_service(payload).await?;
                tracing::info!(
                    "Service created: {:?} (parent: {:?})",
                    created.key(),
                    parent_service_id
                );
                self.refresh().await;
                created
            }
        };

        Ok(service)
    }

    /// Add (or overwrite) the translation of a category or service.
    pub async fn submit_translation(
        &self,
        owner: OwnerKind,
        owner_id: i64,
        translation: TranslationFormDto,
    ) -> Result<()> {
        translation.validate()?;
        let lang = translation.lang;

        match owner {
            OwnerKind::Category => {
                let _guard = self.pending.begin(MutationKind::AddCategoryLanguage)?;
                self.repository
                    .add_category_translation(owner_id, translation)
                    .await?;
                self.refresh().await;
            }
            OwnerKind::Service => {
                let _guard = self.pending.begin(MutationKind::AddServiceLanguage)?;
                self.repository
                    .add_service_translation(owner_id, translation)
                    .await?;
                self.refresh().await;
            }
        }

        tracing::info!("{} {} translated to {}", owner.label(), owner_id, lang);
        Ok(())
    }

    /// Delete a service by id. Not gated on the service being in the local
    /// tree; the server cascades to sub-services.
    pub async fn confirm_delete(&self, service_id: i64) -> Result<bool> {
        let _guard = self.pending.begin(MutationKind::DeleteService)?;
        let deleted = self.repository.delete_service(service_id).await?;
        tracing::info!("Service {} deleted", service_id);
        self.refresh().await;
        Ok(deleted)
    }

    /// Upload a spreadsheet of services for server-side batch creation.
    pub async fn import_services(&self, file: FileUpload) -> Result<bool> {
        let _guard = self.pending.begin(MutationKind::ImportServices)?;
        let imported = self.repository.bulk_import_services(file).await?;
        tracing::info!("Service import accepted: {}", imported);
        self.refresh().await;
        Ok(imported)
    }

    /// A top-level service must name a category that exists in the loaded tree.
    /// Sub-services inherit their root's category and are not re-checked.
    async fn check_category(&self, category_id: Option<i64>) -> Result<()> {
        let category_id = category_id
            .ok_or_else(|| AppError::Validation("Category is required".to_string()))?;

        let known = self
            .query
            .read(|tree| !tree.is_loaded() || tree.find_category(category_id).is_some())
            .await;
        if !known {
            return Err(AppError::Validation(format!(
                "Category {} does not exist",
                category_id
            )));
        }
        Ok(())
    }

    /// A parent must exist in the loaded tree and must not be the edited
    /// service or one of its descendants. Returns the parent's category,
    /// which the child inherits.
    async fn check_parent(&self, existing_id: Option<i64>, parent_id: i64) -> Result<Option<i64>> {
        self.query
            .read(|tree| {
                if !tree.is_loaded() {
                    return Ok(None);
                }
                let parent = tree.find_service(parent_id).ok_or_else(|| {
                    AppError::Validation(format!("Parent service {} does not exist", parent_id))
                })?;
                if existing_id.is_some_and(|id| tree.is_within(id, parent_id)) {
                    return Err(AppError::Validation(
                        "A service cannot be placed under itself or its own sub-services"
                            .to_string(),
                    ));
                }
                Ok(parent.category_id)
            })
            .await
    }

    /// Invalidate the catalog after a successful write. The write already
    /// happened, so a failed refetch is left to the tree's error state.
    async fn refresh(&self) {
        if let Err(e) = self.query.invalidate().await {
            tracing::warn!("Catalog refetch after mutation failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::models::Language;
    use crate::shared::test_helpers::{sample_catalog, FakeCatalogRepository};
    use rust_decimal::Decimal;

    async fn setup(
        categories: Vec<Category>,
    ) -> (Arc<FakeCatalogRepository>, Arc<CatalogQuery>, MutationCoordinator) {
        let repo = Arc::new(FakeCatalogRepository::with_catalog(categories));
        let query = Arc::new(CatalogQuery::new(repo.clone(), Language::English));
        query.ensure_loaded().await;
        let coordinator = MutationCoordinator::new(repo.clone(), query.clone());
        (repo, query, coordinator)
    }

    fn category_form(name: &str) -> CategoryFormDto {
        CategoryFormDto {
            name: name.to_string(),
            description: "Pipe work".to_string(),
            lang: Language::English,
            is_mobile_category: false,
        }
    }

    fn service_form(name: &str, category_id: Option<i64>) -> ServiceFormDto {
        ServiceFormDto {
            name: name.to_string(),
            description: String::new(),
            lang: Language::English,
            service_fee: Some(Decimal::new(15000, 2)),
            estimated_duration: Some("01:30".to_string()),
            category_id,
            parent_service_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_category_in_empty_catalog() {
        let (repo, query, coordinator) = setup(vec![]).await;

        coordinator
            .submit_category(None, category_form("Plumbing"), None)
            .await
            .unwrap();

        let (count, services) = query
            .read(|t| {
                (
                    t.categories().len(),
                    t.categories().first().map(|c| c.services.len()),
                )
            })
            .await;
        assert_eq!(count, 1);
        assert_eq!(services, Some(0));
        assert!(repo.calls().contains(&"create_category".to_string()));
    }

    #[tokio::test]
    async fn test_category_branching_update_vs_create() {
        let (repo, _query, coordinator) = setup(sample_catalog()).await;

        coordinator
            .submit_category(Some(1), category_form("Plumbing & Gas"), None)
            .await
            .unwrap();
        coordinator
            .submit_category(None, category_form("Cleaning"), None)
            .await
            .unwrap();

        let writes: Vec<String> = repo
            .calls()
            .into_iter()
            .filter(|c| !c.starts_with("list_nested_catalog"))
            .collect();
        assert_eq!(
            writes,
            vec!["update_category(1)".to_string(), "create_category".to_string()]
        );
    }

    #[tokio::test]
    async fn test_successful_mutation_refetches_catalog() {
        let (_repo, query, coordinator) = setup(sample_catalog()).await;
        let before = query.fetch_count();

        coordinator
            .submit_category(Some(1), category_form("Plumbing & Gas"), None)
            .await
            .unwrap();

        assert_eq!(query.fetch_count(), before + 1);
        let name = query
            .read(|t| t.find_category(1).map(|c| c.name.clone()))
            .await;
        assert_eq!(name, Some("Plumbing & Gas".to_string()));
    }

    #[tokio::test]
    async fn test_service_then_sub_service_nests_under_parent() {
        let mut plumbing = crate::shared::test_helpers::category(1, "Plumbing");
        plumbing.services.clear();
        let (repo, query, coordinator) = setup(vec![plumbing]).await;

        let leak = coordinator
            .submit_service(None, None, service_form("Leak Repair", Some(1)), None)
            .await
            .unwrap();
        let leak_id = leak.key().unwrap();

        coordinator
            .submit_service(
                None,
                Some(leak_id),
                service_form("Pipe Replacement", None),
                None,
            )
            .await
            .unwrap();

        let nested = query
            .read(|t| t.categories()[0].services[0].services[0].name.clone())
            .await;
        assert_eq!(nested, "Pipe Replacement");

        let payload = repo.last_service_payload().unwrap();
        assert_eq!(
            payload.text_value("parentServiceId"),
            Some(leak_id.to_string().as_str())
        );
    }

    #[tokio::test]
    async fn test_edit_can_move_service_under_picked_parent() {
        let (repo, _query, coordinator) = setup(sample_catalog()).await;

        coordinator
            .submit_service(Some(20), Some(10), service_form("Wiring", Some(2)), None)
            .await
            .unwrap();

        let payload = repo.last_service_payload().unwrap();
        assert_eq!(payload.text_value("parentServiceId"), Some("10"));
        // Children follow their parent's category
        assert_eq!(payload.text_value("categoryId"), Some("1"));
        assert!(repo.calls().contains(&"update_service(20)".to_string()));
    }

    #[tokio::test]
    async fn test_parent_must_exist_and_not_descend_from_edited_service() {
        let (repo, _query, coordinator) = setup(sample_catalog()).await;

        let err = coordinator
            .submit_service(None, Some(999), service_form("Orphan", None), None)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Parent service 999 does not exist");

        let err = coordinator
            .submit_service(Some(10), Some(12), service_form("Leak Repair", Some(1)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = coordinator
            .submit_service(Some(10), Some(10), service_form("Leak Repair", Some(1)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert!(!repo
            .calls()
            .iter()
            .any(|c| c.starts_with("create_service") || c.starts_with("update_service")));
    }

    #[tokio::test]
    async fn test_top_level_service_requires_known_category() {
        let (repo, _query, coordinator) = setup(sample_catalog()).await;

        let err = coordinator
            .submit_service(None, None, service_form("Orphan", Some(404)), None)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Category 404 does not exist");

        let err = coordinator
            .submit_service(None, None, service_form("Orphan", None), None)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Category is required");
        assert!(!repo.calls().iter().any(|c| c.starts_with("create_service")));
    }

    #[tokio::test]
    async fn test_service_update_never_creates() {
        let (repo, _query, coordinator) = setup(sample_catalog()).await;

        coordinator
            .submit_service(Some(10), None, service_form("Leak Fix", Some(1)), None)
            .await
            .unwrap();

        let calls = repo.calls();
        assert!(calls.contains(&"update_service(10)".to_string()));
        assert!(!calls.iter().any(|c| c.starts_with("create_service")));
    }

    #[tokio::test]
    async fn test_translation_adds_language_and_keeps_existing() {
        let (_repo, query, coordinator) = setup(sample_catalog()).await;

        coordinator
            .submit_translation(
                OwnerKind::Service,
                10,
                TranslationFormDto {
                    name: "ፍሳሽ ጥገና".to_string(),
                    description: String::new(),
                    lang: Language::Amharic,
                },
            )
            .await
            .unwrap();

        let (english, amharic) = query
            .read(|t| {
                let s = t.find_service(10).unwrap();
                (
                    s.translation(Language::English).map(|x| x.name.clone()),
                    s.translation(Language::Amharic).map(|x| x.name.clone()),
                )
            })
            .await;
        assert_eq!(english, Some("Leak Repair".to_string()));
        assert_eq!(amharic, Some("ፍሳሽ ጥገና".to_string()));
    }

    #[tokio::test]
    async fn test_category_translation_dispatches_to_category_endpoint() {
        let (repo, _query, coordinator) = setup(sample_catalog()).await;

        coordinator
            .submit_translation(
                OwnerKind::Category,
                2,
                TranslationFormDto {
                    name: "Elektrika".to_string(),
                    description: String::new(),
                    lang: Language::Oromo,
                },
            )
            .await
            .unwrap();

        assert!(repo
            .calls()
            .contains(&"add_category_translation(2, OROMO)".to_string()));
    }

    #[tokio::test]
    async fn test_delete_not_gated_on_local_presence() {
        let (repo, query, coordinator) = setup(sample_catalog()).await;
        assert!(query.read(|t| t.find_service(555).is_none()).await);

        coordinator.confirm_delete(555).await.unwrap();

        assert!(repo.calls().contains(&"delete_service(555)".to_string()));
    }

    #[tokio::test]
    async fn test_delete_cascades_server_side() {
        let (_repo, query, coordinator) = setup(sample_catalog()).await;

        coordinator.confirm_delete(10).await.unwrap();

        let remaining = query
            .read(|t| (t.find_service(10).is_none(), t.find_service(11).is_none()))
            .await;
        assert_eq!(remaining, (true, true));
    }

    #[tokio::test]
    async fn test_rejected_delete_keeps_tree_and_surfaces_message() {
        let (repo, query, coordinator) = setup(sample_catalog()).await;
        let before = query.fetch_count();
        repo.fail_next(AppError::api(
            Some(200),
            Some("Service has active bookings".to_string()),
            None,
        ));

        let err = coordinator.confirm_delete(42).await.unwrap_err();

        assert_eq!(err.user_message(), "Service has active bookings");
        assert_eq!(query.fetch_count(), before);
        assert!(query.read(|t| t.find_service(10).is_some()).await);
        assert!(!coordinator.pending.is_pending(MutationKind::DeleteService));
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_repository() {
        let (repo, _query, coordinator) = setup(sample_catalog()).await;

        let err = coordinator
            .submit_category(None, category_form(""), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!repo.calls().contains(&"create_category".to_string()));
    }

    #[test]
    fn test_pending_flag_rejects_duplicate_and_clears_on_drop() {
        let flags = PendingFlags::default();

        let guard = flags.begin(MutationKind::CreateCategory).unwrap();
        assert!(flags.is_pending(MutationKind::CreateCategory));
        assert!(matches!(
            flags.begin(MutationKind::CreateCategory),
            Err(AppError::Conflict(_))
        ));
        // Other actions are independent
        assert!(flags.begin(MutationKind::UpdateCategory).is_ok());

        drop(guard);
        assert!(!flags.is_pending(MutationKind::CreateCategory));
        assert!(flags.begin(MutationKind::CreateCategory).is_ok());
    }

    #[tokio::test]
    async fn test_import_refetches_catalog() {
        let (repo, query, coordinator) = setup(sample_catalog()).await;
        let before = query.fetch_count();

        let imported = coordinator
            .import_services(FileUpload {
                file_name: "services.xlsx".to_string(),
                content_type: "application/vnd.ms-excel".to_string(),
                bytes: vec![1, 2, 3],
            })
            .await
            .unwrap();

        assert!(imported);
        assert_eq!(query.fetch_count(), before + 1);
        assert!(repo
            .calls()
            .contains(&"bulk_import_services(services.xlsx)".to_string()));
    }
}
