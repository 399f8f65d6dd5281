use std::collections::BTreeSet;

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Listing – one row of the cleaned table
// ---------------------------------------------------------------------------

/// A single rental listing. Every field is present after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: i64,
    pub name: String,
    pub host_id: i64,
    /// Source flag `t`/`f`; rows with no flag are read as `f`.
    #[serde(serialize_with = "superhost_flag")]
    pub host_is_superhost: bool,
    pub neighbourhood: String,
    pub latitude: f64,
    pub longitude: f64,
    pub property_type: String,
    pub room_type: String,
    pub accommodates: i64,
    /// Free-form, e.g. "1.5 shared baths".
    pub bathrooms_text: String,
    pub bedrooms: f64,
    pub beds: f64,
    /// Nightly price in the dataset's native currency units.
    pub price: f64,
    pub number_of_reviews: i64,
    pub review_scores_rating: f64,
}

fn superhost_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "t" } else { "f" })
}

// ---------------------------------------------------------------------------
// CleanedDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full cleaned dataset with pre-computed categorical indices.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedDataset {
    /// All listings, in source order.
    pub listings: Vec<Listing>,
    /// Sorted distinct `neighbourhood` values.
    pub neighbourhoods: BTreeSet<String>,
    /// Sorted distinct `room_type` values.
    pub room_types: BTreeSet<String>,
    /// Source rows discarded because a kept column was empty.
    pub dropped_rows: usize,
}

impl CleanedDataset {
    /// Build categorical indices from the cleaned listings.
    pub fn from_listings(listings: Vec<Listing>, dropped_rows: usize) -> Self {
        let mut neighbourhoods = BTreeSet::new();
        let mut room_types = BTreeSet::new();

        for listing in &listings {
            neighbourhoods.insert(listing.neighbourhood.clone());
            room_types.insert(listing.room_type.clone());
        }

        CleanedDataset {
            listings,
            neighbourhoods,
            room_types,
            dropped_rows,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
