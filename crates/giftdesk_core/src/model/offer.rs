//! Offer record.
//!
//! # Invariants
//! - `category_id` references a stored category at write time.
//! - `label` is the discount label for percentage offers and the price label
//!   for flat offers.
//! - Percentage offers keep `value` in `1..=100`; flat offers keep it above 0.
//! - At most `OFFER_MAX_IMAGES` images.

use super::{require_image_count, require_text, DocumentId, RecordStatus, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const OFFER_LABEL_MAX_CHARS: usize = 80;
pub const OFFER_MAX_IMAGES: usize = 3;

/// How an offer's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `value` is a percentage off.
    Percentage,
    /// `value` is a fixed price.
    Flat,
}

impl DiscountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Flat => "flat",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" => Some(Self::Percentage),
            "flat" | "price" => Some(Self::Flat),
            _ => None,
        }
    }

    /// Name of the label field for this type, as shown on the admin form.
    pub fn label_field(self) -> &'static str {
        match self {
            Self::Percentage => "discountLabel",
            Self::Flat => "priceLabel",
        }
    }
}

/// Stored offer document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: DocumentId,
    pub category_id: DocumentId,
    pub discount_type: DiscountType,
    pub label: String,
    pub value: f64,
    pub images: Vec<String>,
    pub status: RecordStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Offer {
    pub fn new(input: &OfferInput, images: Vec<String>) -> Self {
        let mut offer = Self {
            id: Uuid::new_v4(),
            category_id: input.category_id,
            discount_type: input.discount_type,
            label: String::new(),
            value: 0.0,
            images,
            status: RecordStatus::Active,
            created_at: 0,
            updated_at: 0,
        };
        offer.apply(input);
        offer
    }

    pub fn apply(&mut self, input: &OfferInput) {
        self.category_id = input.category_id;
        self.discount_type = input.discount_type;
        self.label = input.label.trim().to_string();
        self.value = input.value;
        self.status = input.status;
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(self.discount_type, &self.label, self.value)?;
        require_image_count(self.images.len(), 0, OFFER_MAX_IMAGES)
    }
}

/// Editable offer fields submitted by the admin form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferInput {
    pub category_id: DocumentId,
    pub discount_type: DiscountType,
    pub label: String,
    pub value: f64,
    #[serde(default)]
    pub status: RecordStatus,
}

impl OfferInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(self.discount_type, &self.label, self.value)
    }
}

fn validate_fields(
    discount_type: DiscountType,
    label: &str,
    value: f64,
) -> Result<(), ValidationError> {
    require_text(discount_type.label_field(), label, OFFER_LABEL_MAX_CHARS)?;
    let in_range = match discount_type {
        DiscountType::Percentage => value.is_finite() && (1.0..=100.0).contains(&value),
        DiscountType::Flat => value.is_finite() && value > 0.0,
    };
    if !in_range {
        return Err(ValidationError::OutOfRange {
            field: "value",
            expected: match discount_type {
                DiscountType::Percentage => "between 1 and 100 for percentage offers",
                DiscountType::Flat => "greater than 0 for flat offers",
            },
        });
    }
    Ok(())
}
