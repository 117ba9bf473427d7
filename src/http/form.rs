//! Multipart product forms.

use axum::extract::Multipart;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use crate::domain::ImageUpload;
use crate::{CatalogError, Result};

const IMAGE_FIELD: &str = "image";

#[derive(Debug, Default)]
pub struct ProductForm {
    fields: HashMap<String, String>,
    images: Vec<ImageUpload>,
}

impl ProductForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(|e| CatalogError::Validation(format!("Invalid multipart request: {e}")))? {
            let name = field.name().unwrap_or_default().to_string();
            if name == IMAGE_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| CatalogError::Validation(format!("Multipart error: {e}")))?;
                // browsers send an empty part when no file was picked
                if !bytes.is_empty() {
                    form.images.push(ImageUpload::new(file_name, bytes.to_vec()));
                }
            } else {
                let value = field.text().await.map_err(|e| CatalogError::Validation(format!("Multipart error: {e}")))?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> String { self.fields.get(name).cloned().unwrap_or_default() }

    pub fn decimal(&self, name: &str) -> Result<Decimal> { self.required(name) }

    pub fn int(&self, name: &str) -> Result<i32> { self.required(name) }

    /// A missing or blank field is rejected rather than defaulted.
    fn required<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
            .ok_or_else(|| CatalogError::Validation(format!("Missing field '{name}'")))?;
        raw.parse().map_err(|e| CatalogError::Validation(format!("Invalid {name} '{raw}': {e}")))
    }

    pub fn take_image(&mut self) -> Option<ImageUpload> {
        if self.images.is_empty() { None } else { Some(self.images.remove(0)) }
    }

    pub fn into_images(self) -> Vec<ImageUpload> { self.images }
}
