use reqwest::multipart::{Form, Part};

use crate::core::error::{AppError, Result};

/// File attached to a multipart submission
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MultipartField {
    Text { name: String, value: String },
    File { name: String, file: FileUpload },
}

/// Ordered multipart payload, built before it is handed to the transport.
///
/// Unlike `reqwest::multipart::Form` it can be inspected and cloned, which
/// the coordinator needs to inject linkage fields before submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    fields: Vec<MultipartField>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_text(name, value);
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: FileUpload) -> Self {
        self.fields.push(MultipartField::File {
            name: name.into(),
            file,
        });
        self
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(MultipartField::Text {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Set a text field, replacing any earlier value under the same name
    pub fn set_text(&mut self, name: &str, value: impl Into<String>) {
        self.fields
            .retain(|f| !matches!(f, MultipartField::Text { name: n, .. } if n == name));
        self.push_text(name, value);
    }

    /// First text value under `name`
    #[cfg(test)]
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            MultipartField::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.fields
            .iter()
            .any(|f| matches!(f, MultipartField::File { name: n, .. } if n == name))
    }

    /// Convert into the reqwest representation sent on the wire
    pub fn into_reqwest(self) -> Result<Form> {
        let mut form = Form::new();
        for field in self.fields {
            form = match field {
                MultipartField::Text { name, value } => form.text(name, value),
                MultipartField::File { name, file } => {
                    let part = Part::bytes(file.bytes)
                        .file_name(file.file_name)
                        .mime_str(&file.content_type)
                        .map_err(|e| {
                            AppError::BadRequest(format!(
                                "Invalid content type '{}': {}",
                                file.content_type, e
                            ))
                        })?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}
