/// Marketplace API used when `API_URL` is not set
pub const DEFAULT_API_URL: &str = "https://hulumoya.zapto.org";

/// Path the dashboard lives under
pub const CATALOG_PAGE_PATH: &str = "/catalog";

/// Maximum icon upload size (2MB)
pub const MAX_ICON_SIZE: usize = 2 * 1024 * 1024;

/// Maximum spreadsheet size accepted for bulk import (10MB)
pub const MAX_IMPORT_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Icon content types the API accepts
pub const ALLOWED_ICON_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// Spreadsheet content types accepted for bulk import
pub const ALLOWED_IMPORT_MIME_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "text/csv",
    "application/octet-stream",
];

/// Horizontal indentation per service depth level, in rem
pub const INDENT_REM_PER_LEVEL: f32 = 1.5;
