use async_trait::async_trait;
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::catalog::dtos::TranslationFormDto;
use crate::features::catalog::models::{Category, Language, Service};
use crate::modules::http::{ApiClient, FileUpload, MultipartForm};

/// Typed access to the catalog endpoints of the marketplace API.
///
/// Every operation maps to exactly one HTTP call. Nothing is cached or
/// retried here.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Flat category list
    async fn list_categories(&self, lang: Option<Language>) -> Result<Vec<Category>>;

    async fn get_category(&self, id: i64, lang: Option<Language>) -> Result<Category>;

    /// Categories with embedded services and sub-services, in one call
    async fn list_nested_catalog(&self, lang: Option<Language>) -> Result<Vec<Category>>;

    async fn create_category(&self, form: MultipartForm) -> Result<Category>;

    async fn update_category(&self, id: i64, form: MultipartForm) -> Result<Category>;

    async fn add_category_translation(
        &self,
        id: i64,
        translation: TranslationFormDto,
    ) -> Result<Category>;

    /// Flat service list
    async fn list_services(&self, lang: Option<Language>) -> Result<Vec<Service>>;

    async fn get_service(&self, id: i64, lang: Option<Language>) -> Result<Service>;

    async fn create_service(&self, form: MultipartForm) -> Result<Service>;

    async fn update_service(&self, id: i64, form: MultipartForm) -> Result<Service>;

    async fn add_service_translation(
        &self,
        id: i64,
        translation: TranslationFormDto,
    ) -> Result<Service>;

    /// The server removes descendants along with the service
    async fn delete_service(&self, id: i64) -> Result<bool>;

    /// Upload a spreadsheet; the server creates the services in bulk
    async fn bulk_import_services(&self, file: FileUpload) -> Result<bool>;
}

/// `CatalogRepository` backed by the marketplace REST API
pub struct HttpCatalogRepository {
    client: Arc<ApiClient>,
}

impl HttpCatalogRepository {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn lang_query(lang: Option<Language>) -> Vec<(&'static str, String)> {
        lang.map(|l| vec![("lang", l.as_str().to_string())])
            .unwrap_or_default()
    }
}

#[async_trait]
impl CatalogRepository for HttpCatalogRepository {
    async fn list_categories(&self, lang: Option<Language>) -> Result<Vec<Category>> {
        self.client
            .get("/service-categories", &Self::lang_query(lang))
            .await
    }

    async fn get_category(&self, id: i64, lang: Option<Language>) -> Result<Category> {
        self.client
            .get(
                &format!("/service-categories/{}", id),
                &Self::lang_query(lang),
            )
            .await
    }

    async fn list_nested_catalog(&self, lang: Option<Language>) -> Result<Vec<Category>> {
        self.client
            .get("/admin/services", &Self::lang_query(lang))
            .await
    }

    async fn create_category(&self, form: MultipartForm) -> Result<Category> {
        self.client
            .post_multipart("/admin/service-categories", form)
            .await
    }

    async fn update_category(&self, id: i64, form: MultipartForm) -> Result<Category> {
        self.client
            .put_multipart(&format!("/admin/service-categories/{}", id), form)
            .await
    }

    async fn add_category_translation(
        &self,
        id: i64,
        translation: TranslationFormDto,
    ) -> Result<Category> {
        self.client
            .post_json(
                &format!("/admin/service-categories/{}/language", id),
                &translation,
            )
            .await
    }

    async fn list_services(&self, lang: Option<Language>) -> Result<Vec<Service>> {
        self.client.get("/services", &Self::lang_query(lang)).await
    }

    async fn get_service(&self, id: i64, lang: Option<Language>) -> Result<Service> {
        self.client
            .get(&format!("/admin/services/{}", id), &Self::lang_query(lang))
            .await
    }

    async fn create_service(&self, form: MultipartForm) -> Result<Service> {
        self.client.post_multipart("/admin/services", form).await
    }

    async fn update_service(&self, id: i64, form: MultipartForm) -> Result<Service> {
        self.client
            .put_multipart(&format!("/admin/services/{}", id), form)
            .await
    }

    async fn add_service_translation(
        &self,
        id: i64,
        translation: TranslationFormDto,
    ) -> Result<Service> {
        self.client
            .post_json(&format!("/admin/services/{}/language", id), &translation)
            .await
    }

    async fn delete_service(&self, id: i64) -> Result<bool> {
        // Singular "service" is what the API exposes for deletion.
        self.client
            .delete_ack(&format!("/admin/service/{}", id))
            .await
    }

    async fn bulk_import_services(&self, file: FileUpload) -> Result<bool> {
        let form = MultipartForm::new().file("file", file);
        self.client
            .post_multipart_ack("/admin/services/upload", form)
            .await
    }
}
