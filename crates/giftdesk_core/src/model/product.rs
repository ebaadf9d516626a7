//! Product record.
//!
//! # Invariants
//! - `amount` is finite and strictly positive.
//! - `discount` is a percentage in `0..=100`.
//! - A stored product carries between `PRODUCT_MIN_IMAGES` and
//!   `PRODUCT_MAX_IMAGES` image URLs.
//! - List fields never contain blank entries.

use super::{
    normalize_entries, require_image_count, require_text, DocumentId, RecordStatus,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PRODUCT_NAME_MAX_CHARS: usize = 160;
pub const PRODUCT_MIN_IMAGES: usize = 2;
pub const PRODUCT_MAX_IMAGES: usize = 4;
pub const PRODUCT_MAX_HIGHLIGHTS: usize = 10;

/// Stored product document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: DocumentId,
    pub name: String,
    /// List price before discount.
    pub amount: f64,
    /// Discount percentage applied to `amount`.
    pub discount: u8,
    pub images: Vec<String>,
    pub available_offers: Vec<String>,
    pub highlights: Vec<String>,
    pub status: RecordStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Product {
    pub fn new(input: &ProductInput, images: Vec<String>) -> Self {
        let mut product = Self {
            id: Uuid::new_v4(),
            name: String::new(),
            amount: 0.0,
            discount: 0,
            images,
            available_offers: Vec::new(),
            highlights: Vec::new(),
            status: RecordStatus::Active,
            created_at: 0,
            updated_at: 0,
        };
        product.apply(input);
        product
    }

    /// Replaces editable fields from form input. Images are managed separately.
    pub fn apply(&mut self, input: &ProductInput) {
        self.name = input.name.trim().to_string();
        self.amount = input.amount;
        self.discount = input.discount;
        self.available_offers = normalize_entries(&input.available_offers);
        self.highlights = normalize_entries(&input.highlights);
        self.status = input.status;
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(
            &self.name,
            self.amount,
            self.discount,
            self.highlights.len(),
        )?;
        require_image_count(self.images.len(), PRODUCT_MIN_IMAGES, PRODUCT_MAX_IMAGES)
    }
}

/// Editable product fields submitted by the admin form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub discount: u8,
    #[serde(default)]
    pub available_offers: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub status: RecordStatus,
}

impl ProductInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let highlight_count = self
            .highlights
            .iter()
            .filter(|entry| !entry.trim().is_empty())
            .count();
        validate_fields(&self.name, self.amount, self.discount, highlight_count)
    }
}

fn validate_fields(
    name: &str,
    amount: f64,
    discount: u8,
    highlight_count: usize,
) -> Result<(), ValidationError> {
    require_text("name", name, PRODUCT_NAME_MAX_CHARS)?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "amount",
            expected: "greater than 0",
        });
    }
    if discount > 100 {
        return Err(ValidationError::OutOfRange {
            field: "discount",
            expected: "between 0 and 100",
        });
    }
    if highlight_count > PRODUCT_MAX_HIGHLIGHTS {
        return Err(ValidationError::TooManyEntries {
            field: "highlights",
            max: PRODUCT_MAX_HIGHLIGHTS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Product, ProductInput};
    use crate::model::ValidationError;

    fn input() -> ProductInput {
        ProductInput {
            name: "Hamper".to_string(),
            amount: 1250.0,
            discount: 20,
            available_offers: vec![" 10% bank offer ".to_string(), " ".to_string()],
            highlights: vec!["Handmade".to_string()],
            ..ProductInput::default()
        }
    }

    #[test]
    fn product_needs_between_two_and_four_images() {
        let one = Product::new(&input(), vec!["a".to_string()]);
        assert!(matches!(
            one.validate(),
            Err(ValidationError::ImageCount {
                min: 2,
                max: 4,
                actual: 1
            })
        ));

        let five = Product::new(&input(), vec!["a".to_string(); 5]);
        assert!(five.validate().is_err());

        let two = Product::new(&input(), vec!["a".to_string(), "b".to_string()]);
        assert!(two.validate().is_ok());
    }

    #[test]
    fn apply_normalizes_list_fields() {
        let product = Product::new(&input(), Vec::new());
        assert_eq!(product.available_offers, vec!["10% bank offer"]);
    }

    #[test]
    fn amount_and_discount_ranges_are_enforced() {
        let mut bad_amount = input();
        bad_amount.amount = 0.0;
        assert!(matches!(
            bad_amount.validate(),
            Err(ValidationError::OutOfRange {
                field: "amount",
                ..
            })
        ));

        let mut bad_discount = input();
        bad_discount.discount = 101;
        assert!(matches!(
            bad_discount.validate(),
            Err(ValidationError::OutOfRange {
                field: "discount",
                ..
            })
        ));
    }
}
