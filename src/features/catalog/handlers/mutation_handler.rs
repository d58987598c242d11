use axum::{
    extract::{Form, Multipart, State},
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::catalog::dashboard::CatalogDashboard;
use crate::features::catalog::dtos::{
    CategoryFormDto, FormFields, ServiceFormDto, TranslationFormDto,
};
use crate::features::catalog::models::OwnerKind;
use crate::features::catalog::views::Modal;
use crate::modules::http::FileUpload;
use crate::shared::constants::{
    ALLOWED_ICON_MIME_TYPES, ALLOWED_IMPORT_MIME_TYPES, MAX_ICON_SIZE, MAX_IMPORT_FILE_SIZE,
};

/// Size and type limits for one kind of uploaded file
struct UploadRules {
    label: &'static str,
    max_size: usize,
    allowed_types: &'static [&'static str],
}

const ICON_UPLOAD: UploadRules = UploadRules {
    label: "Icon",
    max_size: MAX_ICON_SIZE,
    allowed_types: ALLOWED_ICON_MIME_TYPES,
};

const IMPORT_UPLOAD: UploadRules = UploadRules {
    label: "Import file",
    max_size: MAX_IMPORT_FILE_SIZE,
    allowed_types: ALLOWED_IMPORT_MIME_TYPES,
};

/// Split a multipart submission into its text fields and the optional file
/// under `file_field`. A file input left empty arrives as a nameless, empty
/// part and is treated as absent. The file is not checked here.
async fn read_multipart(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<(FormFields, Option<FileUpload>)> {
    let mut fields = FormFields::new();
    let mut file: Option<FileUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == file_field {
            let file_name = field.file_name().unwrap_or("").to_string();
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let data = field.bytes().await.map_err(|e| {
                debug!("Failed to read file bytes: {}", e);
                AppError::BadRequest(format!("Failed to read file data: {}", e))
            })?;

            if file_name.is_empty() && data.is_empty() {
                continue;
            }
            file = Some(FileUpload {
                file_name: if file_name.is_empty() {
                    "unnamed".to_string()
                } else {
                    file_name
                },
                content_type,
                bytes: data.to_vec(),
            });
        } else {
            let text = field.text().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read {} field: {}", field_name, e))
            })?;
            fields.insert(field_name, text);
        }
    }

    Ok((fields, file))
}

fn check_upload(upload: &FileUpload, rules: &UploadRules) -> Result<()> {
    if upload.bytes.len() > rules.max_size {
        return Err(AppError::Validation(format!(
            "{} too large. Maximum size is {} MB",
            rules.label,
            rules.max_size / 1024 / 1024
        )));
    }

    let content_type = upload.content_type.to_lowercase();
    if !rules
        .allowed_types
        .iter()
        .any(|allowed| content_type.starts_with(allowed))
    {
        return Err(AppError::Validation(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            upload.content_type,
            rules.allowed_types.join(", ")
        )));
    }
    Ok(())
}

/// Create or update a category from the open category dialog
pub async fn submit_category(
    State(dashboard): State<Arc<CatalogDashboard>>,
    multipart: Multipart,
) -> Response {
    let editing = match dashboard.page().lock().await.modal() {
        Some(Modal::Category { editing, .. }) => *editing,
        _ => None,
    };

    match category_submission(&dashboard, multipart, editing).await {
        Ok(()) if editing.is_some() => dashboard.finish("Category updated successfully").await,
        Ok(()) => dashboard.finish("Category created successfully").await,
        Err(e) => dashboard.fail(e).await,
    }
}

async fn category_submission(
    dashboard: &CatalogDashboard,
    multipart: Multipart,
    editing: Option<i64>,
) -> Result<()> {
    let (fields, icon) = read_multipart(multipart, "icon").await?;
    dashboard.page().lock().await.record_category_input(&fields);

    if let Some(icon) = &icon {
        check_upload(icon, &ICON_UPLOAD)?;
    }
    let form = CategoryFormDto::from_fields(&fields)?;
    dashboard
        .coordinator()
        .submit_category(editing, form, icon)
        .await?;
    Ok(())
}

/// Create, update or nest a service from the open service dialog.
///
/// A parent fixed by the dialog ("Add Sub-Service") wins over the parent
/// picked in the form.
pub async fn submit_service(
    State(dashboard): State<Arc<CatalogDashboard>>,
    multipart: Multipart,
) -> Response {
    let (editing, parent_service_id) = match dashboard.page().lock().await.modal() {
        Some(Modal::Service {
            editing,
            parent_service_id,
            ..
        }) => (*editing, *parent_service_id),
        _ => (None, None),
    };

    match service_submission(&dashboard, multipart, editing, parent_service_id).await {
        Ok(()) if editing.is_some() => dashboard.finish("Service updated successfully").await,
        Ok(()) => dashboard.finish("Service created successfully").await,
        Err(e) => dashboard.fail(e).await,
    }
}

async fn service_submission(
    dashboard: &CatalogDashboard,
    multipart: Multipart,
    editing: Option<i64>,
    parent_service_id: Option<i64>,
) -> Result<()> {
    let (fields, icon) = read_multipart(multipart, "icon").await?;
    dashboard.page().lock().await.record_service_input(&fields);

    if let Some(icon) = &icon {
        check_upload(icon, &ICON_UPLOAD)?;
    }
    let form = ServiceFormDto::from_fields(&fields)?;
    let parent_service_id = parent_service_id.or(form.parent_service_id);
    dashboard
        .coordinator()
        .submit_service(editing, parent_service_id, form, icon)
        .await?;
    Ok(())
}

/// Save the translation typed into the open translation dialog
pub async fn submit_translation(
    State(dashboard): State<Arc<CatalogDashboard>>,
    Form(raw): Form<HashMap<String, String>>,
) -> Response {
    let target = match dashboard.page().lock().await.modal() {
        Some(Modal::Translation {
            owner, owner_id, ..
        }) => Some((*owner, *owner_id)),
        _ => None,
    };
    let Some((owner, owner_id)) = target else {
        return dashboard
            .fail(AppError::BadRequest(
                "No translation form is open".to_string(),
            ))
            .await;
    };

    match translation_submission(&dashboard, raw, owner, owner_id).await {
        Ok(()) => dashboard.finish("Translation added successfully").await,
        Err(e) => dashboard.fail(e).await,
    }
}

async fn translation_submission(
    dashboard: &CatalogDashboard,
    raw: HashMap<String, String>,
    owner: OwnerKind,
    owner_id: i64,
) -> Result<()> {
    let fields = FormFields::from(raw);
    dashboard.page().lock().await.record_translation_input(&fields);

    let translation = TranslationFormDto::from_fields(&fields)?;
    dashboard
        .coordinator()
        .submit_translation(owner, owner_id, translation)
        .await
}

/// Delete the service named by the open confirmation dialog
pub async fn confirm_delete(State(dashboard): State<Arc<CatalogDashboard>>) -> Response {
    let target = match dashboard.page().lock().await.modal() {
        Some(Modal::ConfirmDelete { service_id, .. }) => Some(*service_id),
        _ => None,
    };
    let Some(service_id) = target else {
        return dashboard
            .fail(AppError::BadRequest("No deletion is pending".to_string()))
            .await;
    };

    match dashboard.coordinator().confirm_delete(service_id).await {
        Ok(_) => dashboard.finish("Service deleted successfully").await,
        Err(e) => dashboard.fail(e).await,
    }
}

/// Upload a spreadsheet of services
pub async fn import_services(
    State(dashboard): State<Arc<CatalogDashboard>>,
    multipart: Multipart,
) -> Response {
    match import_submission(&dashboard, multipart).await {
        Ok(()) => dashboard.finish("Services imported successfully").await,
        Err(e) => dashboard.fail(e).await,
    }
}

async fn import_submission(dashboard: &CatalogDashboard, multipart: Multipart) -> Result<()> {
    let (_, file) = read_multipart(multipart, "file").await?;
    let file = file.ok_or_else(|| AppError::Validation("File is required".to_string()))?;
    check_upload(&file, &IMPORT_UPLOAD)?;
    dashboard.coordinator().import_services(file).await?;
    Ok(())
}
