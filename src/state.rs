use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::load_listings;
use crate::data::filter::{apply, FilterCriteria, FilteredView, PriceBounds};
use crate::data::model::{CleanedDataset, Listing};

/// The two categorical filter controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Neighbourhood,
    RoomType,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Every filter control goes through one of the mutators below, each of
/// which recomputes the [`FilteredView`] only when the criteria changed.
pub struct AppState {
    pub config: DashboardConfig,

    /// Path of the dataset currently shown (or that failed to load).
    pub data_path: PathBuf,

    /// Shared cleaned dataset (None until a load succeeds).
    pub dataset: Option<Arc<CleanedDataset>>,

    /// Default slider range derived from the dataset.
    pub bounds: PriceBounds,

    /// This session's selection.
    pub criteria: FilterCriteria,

    /// Listings matching `criteria` plus aggregates.
    pub view: FilteredView,

    /// Room type → marker colour.
    pub color_map: Option<ColorMap>,

    /// Blocking load failure shown instead of the dashboard.
    pub load_error: Option<String>,

    /// Non-blocking status line (exports).
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            data_path: config.data_path.clone(),
            config,
            dataset: None,
            bounds: PriceBounds { min: 0.0, max: 0.0 },
            criteria: FilterCriteria {
                neighbourhoods: Default::default(),
                room_types: Default::default(),
                min_price: 0.0,
                max_price: 0.0,
            },
            view: FilteredView::default(),
            color_map: None,
            load_error: None,
            status_message: None,
        }
    }

    /// Load (or fetch from the memo cache) the listings at `path`.
    pub fn load(&mut self, path: PathBuf) {
        match load_listings(&path) {
            Ok(dataset) => {
                log::info!(
                    "Showing {} listings across {} neighbourhoods",
                    dataset.len(),
                    dataset.neighbourhoods.len()
                );
                if dataset.is_empty() {
                    log::warn!("{} contains no complete listings", path.display());
                }
                self.data_path = path;
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load listings: {e}");
                self.load_error = Some(format!("Could not load {}: {e}", path.display()));
                self.data_path = path;
                self.dataset = None;
                self.view = FilteredView::default();
            }
        }
    }

    /// Ingest a dataset and reset the criteria to their defaults.
    pub fn set_dataset(&mut self, dataset: Arc<CleanedDataset>) {
        self.bounds = PriceBounds::from_dataset(&dataset, self.config.price_quantile);
        self.criteria = FilterCriteria::defaults(
            &dataset,
            &self.config.preferred_neighbourhoods,
            self.config.price_quantile,
        );
        self.color_map = Some(ColorMap::new(&dataset.room_types));
        self.view = apply(&dataset, &self.criteria);
        self.dataset = Some(dataset);
        self.load_error = None;
        self.status_message = None;
    }

    /// Recompute `view` after a criteria change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.view = apply(ds, &self.criteria);
            log::debug!(
                "{} listings match, mean price {:.2}",
                self.view.count,
                self.view.mean_price
            );
        }
    }

    /// All distinct values of a facet.
    pub fn options(&self, facet: Facet) -> Vec<String> {
        match (&self.dataset, facet) {
            (Some(ds), Facet::Neighbourhood) => ds.neighbourhoods.iter().cloned().collect(),
            (Some(ds), Facet::RoomType) => ds.room_types.iter().cloned().collect(),
            (None, _) => Vec::new(),
        }
    }

    pub fn is_selected(&self, facet: Facet, value: &str) -> bool {
        match facet {
            Facet::Neighbourhood => self.criteria.neighbourhoods.contains(value),
            Facet::RoomType => self.criteria.room_types.contains(value),
        }
    }

    /// Toggle a single value of a facet.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let selected = match facet {
            Facet::Neighbourhood => &mut self.criteria.neighbourhoods,
            Facet::RoomType => &mut self.criteria.room_types,
        };
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select every value of a facet.
    pub fn select_all(&mut self, facet: Facet) {
        let all = self.options(facet).into_iter().collect();
        match facet {
            Facet::Neighbourhood => self.criteria.neighbourhoods = all,
            Facet::RoomType => self.criteria.room_types = all,
        }
        self.refilter();
    }

    /// Deselect every value of a facet.
    pub fn select_none(&mut self, facet: Facet) {
        match facet {
            Facet::Neighbourhood => self.criteria.neighbourhoods.clear(),
            Facet::RoomType => self.criteria.room_types.clear(),
        }
        self.refilter();
    }

    /// Set the inclusive price range. A reversed range is swapped.
    pub fn set_price_range(&mut self, min: f64, max: f64) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        if min == self.criteria.min_price && max == self.criteria.max_price {
            return;
        }
        self.criteria.min_price = min;
        self.criteria.max_price = max;
        self.refilter();
    }

    /// The first `table_row_limit` matching listings.
    pub fn table_rows(&self) -> Vec<&Listing> {
        match &self.dataset {
            Some(ds) => self
                .view
                .rows(ds)
                .take(self.config.table_row_limit)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Write every matching listing to `path` as CSV. Returns the row count.
    pub fn export_filtered(&self, path: &Path) -> anyhow::Result<usize> {
        let ds = self.dataset.as_ref().context("no dataset loaded")?;
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        for listing in self.view.rows(ds) {
            writer.serialize(listing).context("writing listing")?;
        }
        writer.flush().context("flushing export")?;
        Ok(self.view.count)
    }
}
