//! Shirt records and their mutation inputs.
//!
//! [`Shirt`] serializes with the wire field names clients already consume
//! (`imageURL`, `priceInCents`, `personId`). Absent optional values
//! serialize as explicit `null`s, matching the store's row shape.

use serde::{Deserialize, Serialize};

/// A cataloged shirt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shirt {
    /// Store-assigned numeric identifier.
    pub id: i64,
    /// Shirt title.
    pub title: String,
    /// External link to the shirt, if any.
    pub link: Option<String>,
    /// Stored image filename, if an image was uploaded.
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    /// Size in US units (e.g. `"XL"`).
    pub size: Option<String>,
    /// Price in cents, if known.
    pub price_in_cents: Option<i64>,
    /// Owning person's identifier.
    pub person_id: String,
    /// Selection status.
    pub status: i64,
}

/// Input for creating a shirt. `status` starts at the store default.
#[derive(Clone, Debug, Default)]
pub struct NewShirt {
    /// Shirt title (required).
    pub title: String,
    /// External link.
    pub link: Option<String>,
    /// Stored image filename.
    pub image_url: Option<String>,
    /// Size in US units.
    pub size: Option<String>,
    /// Price in cents.
    pub price_in_cents: Option<i64>,
    /// Owning person's identifier (required).
    pub person_id: String,
}

/// Partial update for a shirt. `None` leaves the field unchanged.
#[derive(Clone, Debug, Default)]
pub struct ShirtPatch {
    /// New title.
    pub title: Option<String>,
    /// New external link.
    pub link: Option<String>,
    /// Replacement stored image filename.
    pub image_url: Option<String>,
    /// New size.
    pub size: Option<String>,
    /// New price in cents.
    pub price_in_cents: Option<i64>,
    /// New owning person.
    pub person_id: Option<String>,
    /// New selection status.
    pub status: Option<i64>,
}

impl ShirtPatch {
    /// True when no field is set; the store treats this as a read.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.link.is_none()
            && self.image_url.is_none()
            && self.size.is_none()
            && self.price_in_cents.is_none()
            && self.person_id.is_none()
            && self.status.is_none()
    }
}
