use std::collections::BTreeSet;

use super::model::{CleanedDataset, Listing};

// ---------------------------------------------------------------------------
// Filter criteria: one per user interaction
// ---------------------------------------------------------------------------

/// The user's current selection. Price bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub neighbourhoods: BTreeSet<String>,
    pub room_types: BTreeSet<String>,
    pub min_price: f64,
    pub max_price: f64,
}

impl FilterCriteria {
    /// First-render selection: preferred neighbourhoods, every room type and
    /// the full default price range.
    pub fn defaults(dataset: &CleanedDataset, preferred: &[String], quantile: f64) -> Self {
        let bounds = PriceBounds::from_dataset(dataset, quantile);
        FilterCriteria {
            neighbourhoods: default_neighbourhoods(dataset, preferred),
            room_types: dataset.room_types.clone(),
            min_price: bounds.min,
            max_price: bounds.max,
        }
    }

    /// Whether a single listing passes every criterion.
    pub fn matches(&self, listing: &Listing) -> bool {
        self.neighbourhoods.contains(&listing.neighbourhood)
            && self.room_types.contains(&listing.room_type)
            && listing.price >= self.min_price
            && listing.price <= self.max_price
    }
}

/// Preferred neighbourhoods present in the dataset, falling back to the
/// first three in lexicographic order.
pub fn default_neighbourhoods(dataset: &CleanedDataset, preferred: &[String]) -> BTreeSet<String> {
    let present: BTreeSet<String> = preferred
        .iter()
        .filter(|n| dataset.neighbourhoods.contains(*n))
        .cloned()
        .collect();
    if !present.is_empty() {
        return present;
    }
    dataset.neighbourhoods.iter().take(3).cloned().collect()
}

// ---------------------------------------------------------------------------
// Price bounds for the range control
// ---------------------------------------------------------------------------

/// Default price range: the cheapest listing up to a high quantile, so the
/// top outliers do not stretch the slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

impl PriceBounds {
    /// `min` is the lowest price, `max` the `quantile` (e.g. `0.99`) price.
    /// An empty dataset yields `0..=0`.
    pub fn from_dataset(dataset: &CleanedDataset, quantile: f64) -> Self {
        let mut prices: Vec<f64> = dataset.listings.iter().map(|l| l.price).collect();
        if prices.is_empty() {
            return PriceBounds { min: 0.0, max: 0.0 };
        }
        prices.sort_by(f64::total_cmp);
        PriceBounds {
            min: prices[0],
            max: percentile(&prices, quantile),
        }
    }
}

/// Linear interpolation between the closest ranks of a sorted slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = idx - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

// ---------------------------------------------------------------------------
// Filtered view: matching rows plus aggregates
// ---------------------------------------------------------------------------

/// Rows of the dataset that match a [`FilterCriteria`], in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    /// Indices into `CleanedDataset::listings`.
    pub indices: Vec<usize>,
    pub count: usize,
    /// Mean nightly price; `0.0` for an empty view.
    pub mean_price: f64,
}

impl FilteredView {
    /// Iterate the matching listings.
    pub fn rows<'a>(&'a self, dataset: &'a CleanedDataset) -> impl Iterator<Item = &'a Listing> {
        self.indices.iter().map(move |&i| &dataset.listings[i])
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Return indices of listings that pass all criteria.
///
/// An empty neighbourhood or room-type selection means the user deselected
/// everything, so nothing passes regardless of the price range.
pub fn filtered_indices(dataset: &CleanedDataset, criteria: &FilterCriteria) -> Vec<usize> {
    if criteria.neighbourhoods.is_empty() || criteria.room_types.is_empty() {
        return Vec::new();
    }
    dataset
        .listings
        .iter()
        .enumerate()
        .filter(|(_, listing)| criteria.matches(listing))
        .map(|(i, _)| i)
        .collect()
}

/// Filter the dataset and compute the view's aggregates.
pub fn apply(dataset: &CleanedDataset, criteria: &FilterCriteria) -> FilteredView {
    let indices = filtered_indices(dataset, criteria);
    let count = indices.len();
    let mean_price = if count == 0 {
        0.0
    } else {
        indices.iter().map(|&i| dataset.listings[i].price).sum::<f64>() / count as f64
    };

    FilteredView {
        indices,
        count,
        mean_price,
    }
}
