//! Multipart admin form decoding.
//!
//! Text fields may repeat; list fields also accept one JSON array value.
//! File parts become `ImageUpload`s in submission order.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;
use giftdesk_core::ImageUpload;

use crate::error::AppError;

const FILE_FIELDS: [&str; 2] = ["images", "image"];

#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    pub images: Vec<ImageUpload>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);

            if file_name.is_some() || FILE_FIELDS.contains(&name.as_str()) {
                let file_name = file_name.unwrap_or_default();
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&file_name)
                            .first_or_octet_stream()
                            .to_string()
                    });
                let bytes = field.bytes().await?;
                // Browsers submit an empty part for an untouched file input.
                if bytes.is_empty() && file_name.is_empty() {
                    continue;
                }
                form.images
                    .push(ImageUpload::new(file_name, content_type, bytes.to_vec()));
            } else {
                let value = field.text().await?;
                form.fields.entry(name).or_default().push(value);
            }
        }
        Ok(form)
    }

    /// First non-blank value of `name`, trimmed.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)?
            .iter()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }

    /// First non-blank value among `names`.
    pub fn text_any(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.text(name))
    }

    pub fn text_or_default(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_string()
    }

    pub fn required<T: FromStr>(&self, name: &str) -> Result<T, AppError> {
        self.parse(name)?
            .ok_or_else(|| AppError::BadRequest(format!("{name} is required")))
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        self.text(name)
            .map(|raw| {
                raw.parse()
                    .map_err(|_| AppError::BadRequest(format!("{name} has an invalid value: {raw}")))
            })
            .transpose()
    }

    /// All values of a list field.
    pub fn list(&self, name: &str) -> Result<Vec<String>, AppError> {
        let mut entries = Vec::new();
        for value in self.fields.get(name).into_iter().flatten() {
            let trimmed = value.trim();
            if trimmed.starts_with('[') {
                let parsed: Vec<String> = serde_json::from_str(trimmed).map_err(|e| {
                    AppError::BadRequest(format!("{name} must be a JSON array of strings: {e}"))
                })?;
                entries.extend(parsed);
            } else {
                entries.push(value.clone());
            }
        }
        Ok(entries)
    }

    /// Like [`FormData::list`], but `None` when the field was not sent at all.
    /// An explicit empty JSON array yields `Some(vec![])`.
    pub fn optional_list(&self, name: &str) -> Result<Option<Vec<String>>, AppError> {
        if self.fields.contains_key(name) {
            self.list(name).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FormData;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        let mut form = FormData::default();
        for (name, value) in pairs {
            form.fields
                .entry((*name).to_string())
                .or_default()
                .push((*value).to_string());
        }
        form
    }

    #[test]
    fn list_accepts_repeated_fields_and_json_arrays() {
        let form = form(&[
            ("highlights", "Hand made"),
            ("highlights", r#"["Gift wrap", "Free card"]"#),
        ]);
        assert_eq!(
            form.list("highlights").unwrap(),
            vec!["Hand made", "Gift wrap", "Free card"]
        );
        assert!(form.list("availableOffers").unwrap().is_empty());
    }

    #[test]
    fn optional_list_tells_absent_from_empty() {
        let form = form(&[("existingImages", "[]")]);
        assert_eq!(form.optional_list("existingImages").unwrap(), Some(Vec::new()));
        assert_eq!(form.optional_list("highlights").unwrap(), None);
    }

    #[test]
    fn parse_reports_field_name() {
        let form = form(&[("amount", "abc"), ("discount", " 15 ")]);
        let err = form.parse::<f64>("amount").unwrap_err();
        assert!(err.to_string().contains("amount"));
        assert_eq!(form.required::<u8>("discount").unwrap(), 15);
        assert!(form.required::<u8>("missing").is_err());
    }

    #[test]
    fn text_any_prefers_first_present_name() {
        let form = form(&[("priceLabel", "Starting at 499"), ("label", " ")]);
        assert_eq!(
            form.text_any(&["label", "discountLabel", "priceLabel"]),
            Some("Starting at 499")
        );
    }
}
