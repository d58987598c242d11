//! Test fixtures: sample catalog builders and an in-memory marketplace API.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Mutex;

use crate::core::error::{AppError, Result};
use crate::features::catalog::clients::CatalogRepository;
use crate::features::catalog::dtos::TranslationFormDto;
use crate::features::catalog::models::{Category, Language, Service, TranslationText};
use crate::modules::http::{FileUpload, MultipartForm};

fn english(name: &str, description: &str) -> BTreeMap<String, TranslationText> {
    let mut map = BTreeMap::new();
    map.insert(
        Language::English.as_str().to_string(),
        TranslationText {
            name: name.to_string(),
            description: description.to_string(),
        },
    );
    map
}

pub fn category(id: i64, name: &str) -> Category {
    Category {
        id: Some(id),
        category_id: None,
        name: name.to_string(),
        description: String::new(),
        icon: String::new(),
        is_mobile_category: false,
        translations: Some(english(name, "")),
        services: vec![],
    }
}

pub fn service(id: i64, name: &str, category_id: i64) -> Service {
    Service {
        id: Some(id),
        service_id: None,
        name: name.to_string(),
        description: String::new(),
        icon: String::new(),
        document: None,
        service_fee: None,
        estimated_duration: None,
        category_id: Some(category_id),
        technician_count: None,
        booking_count: None,
        translations: Some(english(name, "")),
        services: vec![],
    }
}

/// Plumbing(1) > Leak Repair(10) > Pipe Replacement(11) > Copper Pipe(12),
/// Electrical(2) > Wiring(20)
pub fn sample_catalog() -> Vec<Category> {
    let mut copper = service(12, "Copper Pipe", 1);
    copper.icon = "https://cdn.example.com/copper.png".to_string();

    let mut pipe = service(11, "Pipe Replacement", 1);
    pipe.services.push(copper);

    let mut leak = service(10, "Leak Repair", 1);
    leak.service_fee = Some(Decimal::new(25000, 2));
    leak.estimated_duration = Some("01:30".to_string());
    leak.icon = "uploads/leak.png".to_string();
    leak.services.push(pipe);

    let mut plumbing = category(1, "Plumbing");
    plumbing.description = "Pipe work".to_string();
    plumbing.services.push(leak);

    let mut electrical = category(2, "Electrical");
    electrical.services.push(service(20, "Wiring", 2));

    vec![plumbing, electrical]
}

#[derive(Default)]
struct FakeState {
    categories: Vec<Category>,
    next_id: i64,
    calls: Vec<String>,
    fail_next: Option<AppError>,
    last_service_payload: Option<MultipartForm>,
}

/// In-memory stand-in for the marketplace API with server-side semantics:
/// id assignment, translation upsert, cascading delete.
pub struct FakeCatalogRepository {
    state: Mutex<FakeState>,
}

impl FakeCatalogRepository {
    pub fn with_catalog(categories: Vec<Category>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                categories,
                next_id: 100,
                ..Default::default()
            }),
        }
    }

    /// Make the next repository call fail with `error`
    pub fn fail_next(&self, error: AppError) {
        self.state.lock().unwrap().fail_next = Some(error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_service_payload(&self) -> Option<MultipartForm> {
        self.state.lock().unwrap().last_service_payload.clone()
    }

    fn record(&self, call: String) -> Result<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

fn find_service_mut(services: &mut [Service], id: i64) -> Option<&mut Service> {
    for service in services.iter_mut() {
        if service.matches(id) {
            return Some(service);
        }
        if let Some(found) = find_service_mut(&mut service.services, id) {
            return Some(found);
        }
    }
    None
}

fn remove_service(services: &mut Vec<Service>, id: i64) -> bool {
    if let Some(pos) = services.iter().position(|s| s.matches(id)) {
        services.remove(pos);
        return true;
    }
    services
        .iter_mut()
        .any(|s| remove_service(&mut s.services, id))
}

fn all_services(categories: &[Category]) -> Vec<Service> {
    fn walk(services: &[Service], out: &mut Vec<Service>) {
        for s in services {
            out.push(s.clone());
            walk(&s.services, out);
        }
    }
    let mut out = Vec::new();
    for c in categories {
        walk(&c.services, &mut out);
    }
    out
}

fn upsert_translation(
    translations: &mut Option<BTreeMap<String, TranslationText>>,
    lang: &str,
    name: &str,
    description: &str,
) {
    translations.get_or_insert_with(BTreeMap::new).insert(
        lang.to_string(),
        TranslationText {
            name: name.to_string(),
            description: description.to_string(),
        },
    );
}

fn not_found(what: &str, id: i64) -> AppError {
    AppError::api(Some(404), Some(format!("{} {} not found", what, id)), None)
}

#[async_trait]
impl CatalogRepository for FakeCatalogRepository {
    async fn list_categories(&self, _lang: Option<Language>) -> Result<Vec<Category>> {
        let state = self.record("list_categories".to_string())?;
        Ok(state
            .categories
            .iter()
            .map(|c| Category {
                services: vec![],
                ..c.clone()
            })
            .collect())
    }

    async fn get_category(&self, id: i64, _lang: Option<Language>) -> Result<Category> {
        let state = self.record(format!("get_category({})", id))?;
        state
            .categories
            .iter()
            .find(|c| c.matches(id))
            .cloned()
            .ok_or_else(|| not_found("Category", id))
    }

    async fn list_nested_catalog(&self, lang: Option<Language>) -> Result<Vec<Category>> {
        let state = self.record(format!(
            "list_nested_catalog({})",
            lang.map(|l| l.as_str()).unwrap_or("-")
        ))?;
        Ok(state.categories.clone())
    }

    async fn create_category(&self, form: MultipartForm) -> Result<Category> {
        let mut state = self.record("create_category".to_string())?;
        state.next_id += 1;
        let name = form.text_value("name").unwrap_or_default();
        let description = form.text_value("description").unwrap_or_default();
        let lang = form.text_value("lang").unwrap_or("ENGLISH");

        let mut created = category(state.next_id, name);
        created.description = description.to_string();
        created.is_mobile_category = form.text_value("isMobileCategory") == Some("true");
        created.translations = None;
        upsert_translation(&mut created.translations, lang, name, description);
        state.categories.push(created.clone());
        Ok(created)
    }

    async fn update_category(&self, id: i64, form: MultipartForm) -> Result<Category> {
        let mut state = self.record(format!("update_category({})", id))?;
        let existing = state
            .categories
            .iter_mut()
            .find(|c| c.matches(id))
            .ok_or_else(|| not_found("Category", id))?;
        if let Some(name) = form.text_value("name") {
            existing.name = name.to_string();
        }
        if let Some(description) = form.text_value("description") {
            existing.description = description.to_string();
        }
        existing.is_mobile_category = form.text_value("isMobileCategory") == Some("true");
        Ok(existing.clone())
    }

    async fn add_category_translation(
        &self,
        id: i64,
        translation: TranslationFormDto,
    ) -> Result<Category> {
        let mut state = self.record(format!(
            "add_category_translation({}, {})",
            id, translation.lang
        ))?;
        let existing = state
            .categories
            .iter_mut()
            .find(|c| c.matches(id))
            .ok_or_else(|| not_found("Category", id))?;
        upsert_translation(
            &mut existing.translations,
            translation.lang.as_str(),
            &translation.name,
            &translation.description,
        );
        Ok(existing.clone())
    }

    async fn list_services(&self, _lang: Option<Language>) -> Result<Vec<Service>> {
        let state = self.record("list_services".to_string())?;
        Ok(all_services(&state.categories))
    }

    async fn get_service(&self, id: i64, _lang: Option<Language>) -> Result<Service> {
        let state = self.record(format!("get_service({})", id))?;
        all_services(&state.categories)
            .into_iter()
            .find(|s| s.matches(id))
            .ok_or_else(|| not_found("Service", id))
    }

    async fn create_service(&self, form: MultipartForm) -> Result<Service> {
        let mut state = self.record("create_service".to_string())?;
        state.last_service_payload = Some(form.clone());
        state.next_id += 1;
        let id = state.next_id;

        let name = form.text_value("name").unwrap_or_default();
        let description = form.text_value("description").unwrap_or_default();
        let lang = form.text_value("lang").unwrap_or("ENGLISH");
        let parent_id = form
            .text_value("parentServiceId")
            .and_then(|v| v.parse::<i64>().ok());
        let category_id = form
            .text_value("categoryId")
            .and_then(|v| v.parse::<i64>().ok());

        let mut created = service(id, name, category_id.unwrap_or_default());
        created.description = description.to_string();
        created.service_fee = form
            .text_value("serviceFee")
            .and_then(|v| Decimal::from_str(v).ok());
        created.estimated_duration = form.text_value("estimatedDuration").map(str::to_string);
        created.translations = None;
        upsert_translation(&mut created.translations, lang, name, description);

        match parent_id {
            Some(parent_id) => {
                let parent = state
                    .categories
                    .iter_mut()
                    .find_map(|c| find_service_mut(&mut c.services, parent_id))
                    .ok_or_else(|| not_found("Service", parent_id))?;
                created.category_id = parent.category_id;
                parent.services.push(created.clone());
            }
            None => {
                let owner = category_id.unwrap_or_default();
                let category = state
                    .categories
                    .iter_mut()
                    .find(|c| c.matches(owner))
                    .ok_or_else(|| not_found("Category", owner))?;
                category.services.push(created.clone());
            }
        }
        Ok(created)
    }

    async fn update_service(&self, id: i64, form: MultipartForm) -> Result<Service> {
        let mut state = self.record(format!("update_service({})", id))?;
        state.last_service_payload = Some(form.clone());
        let existing = state
            .categories
            .iter_mut()
            .find_map(|c| find_service_mut(&mut c.services, id))
            .ok_or_else(|| not_found("Service", id))?;
        if let Some(name) = form.text_value("name") {
            existing.name = name.to_string();
        }
        if let Some(description) = form.text_value("description") {
            existing.description = description.to_string();
        }
        Ok(existing.clone())
    }

    async fn add_service_translation(
        &self,
        id: i64,
        translation: TranslationFormDto,
    ) -> Result<Service> {
        let mut state = self.record(format!(
            "add_service_translation({}, {})",
            id, translation.lang
        ))?;
        let existing = state
            .categories
            .iter_mut()
            .find_map(|c| find_service_mut(&mut c.services, id))
            .ok_or_else(|| not_found("Service", id))?;
        upsert_translation(
            &mut existing.translations,
            translation.lang.as_str(),
            &translation.name,
            &translation.description,
        );
        Ok(existing.clone())
    }

    async fn delete_service(&self, id: i64) -> Result<bool> {
        let mut state = self.record(format!("delete_service({})", id))?;
        Ok(state
            .categories
            .iter_mut()
            .any(|c| remove_service(&mut c.services, id)))
    }

    async fn bulk_import_services(&self, file: FileUpload) -> Result<bool> {
        let _state = self.record(format!("bulk_import_services({})", file.file_name))?;
        Ok(true)
    }
}
