//! Collects a `multipart/form-data` body into plain text fields and uploaded
//! files, so that form handlers can treat it much like an urlencoded form.

use std::collections::HashMap;

use axum::extract::Multipart;
use hypertext::prelude::*;

use crate::util_resp::FailureResponse;

fn malformed() -> FailureResponse {
    FailureResponse::BadRequest(
        maud! {
            p { "The submitted form could not be read. Please try again." }
        }
        .render(),
    )
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, FailureResponse> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::debug!("malformed multipart body: {e}");
            malformed()
        })? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await.map_err(|e| {
                        tracing::debug!("failed to read upload {name}: {e}");
                        malformed()
                    })?;
                    // Browsers submit an empty part for file inputs that were
                    // left blank.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        UploadedFile {
                            file_name,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    let text = field.text().await.map_err(|e| {
                        tracing::debug!("failed to read field {name}: {e}");
                        malformed()
                    })?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// The value of a text field, or `""` if it was not submitted.
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }
}
