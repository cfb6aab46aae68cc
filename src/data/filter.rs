use std::collections::BTreeSet;

use crate::config::{DEFAULT_PRICE_RANGE, EXCLUDED_DEALER_GROUP, PRICE_BOUNDS};

use super::model::{Category, VehicleSaleRecord};

// ---------------------------------------------------------------------------
// Price window
// ---------------------------------------------------------------------------

/// Inclusive price window. `min > max` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_RANGE.0, DEFAULT_PRICE_RANGE.1)
    }
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp both ends into the slider bounds.
    pub fn clamped(self) -> Self {
        let (lo, hi) = PRICE_BOUNDS;
        Self {
            min: self.min.clamp(lo, hi),
            max: self.max.clamp(lo, hi),
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

// ---------------------------------------------------------------------------
// Set filters: `None` means unrestricted
// ---------------------------------------------------------------------------

/// Optional membership filter. `None` lets every value through.
pub type SetFilter<T> = Option<BTreeSet<T>>;

/// Turn a widget selection into a filter: selecting nothing selects all.
pub fn set_filter<T: Ord + Clone>(selection: &BTreeSet<T>) -> SetFilter<T> {
    if selection.is_empty() {
        None
    } else {
        Some(selection.clone())
    }
}

fn passes<T: Ord + ?Sized, U: Ord + std::borrow::Borrow<T>>(
    filter: &Option<BTreeSet<U>>,
    value: &T,
) -> bool {
    filter.as_ref().map_or(true, |set| set.contains(value))
}

/// Case-insensitive substring match on the excluded dealer group.
pub fn dealer_excluded(dealer_name: &str) -> bool {
    dealer_name
        .to_lowercase()
        .contains(&EXCLUDED_DEALER_GROUP.to_lowercase())
}

// ---------------------------------------------------------------------------
// Widget state -> effective criteria
// ---------------------------------------------------------------------------

/// What the filter panel widgets currently hold. Kept even while the panel
/// is hidden so the selections reappear when it is shown again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPanel {
    pub stock_types: BTreeSet<String>,
    pub engines: BTreeSet<String>,
    pub drivetrains: BTreeSet<String>,
    pub makes: BTreeSet<String>,
    pub price: PriceRange,
    pub exclude_autocanada: bool,
}

impl FilterPanel {
    pub fn selection_mut(&mut self, category: Category) -> &mut BTreeSet<String> {
        match category {
            Category::StockType => &mut self.stock_types,
            Category::Engine => &mut self.engines,
            Category::Drivetrain => &mut self.drivetrains,
            Category::Make => &mut self.makes,
        }
    }
}

/// Effective filter applied to the dataset. All conditions are conjunctive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub price: PriceRange,
    pub clusters: SetFilter<u32>,
    pub stock_types: SetFilter<String>,
    pub engines: SetFilter<String>,
    pub drivetrains: SetFilter<String>,
    pub makes: SetFilter<String>,
    pub exclude_autocanada: bool,
}

impl FilterCriteria {
    /// Build the criteria the dashboard applies.
    ///
    /// With the panel hidden only the default price window and the cluster
    /// selection apply; stale widget selections are ignored.
    pub fn from_panel(
        panel: &FilterPanel,
        panel_visible: bool,
        selected_clusters: &BTreeSet<u32>,
    ) -> Self {
        let clusters = set_filter(selected_clusters);
        if !panel_visible {
            return Self {
                clusters,
                ..Self::default()
            };
        }
        Self {
            price: panel.price.clamped(),
            clusters,
            stock_types: set_filter(&panel.stock_types),
            engines: set_filter(&panel.engines),
            drivetrains: set_filter(&panel.drivetrains),
            makes: set_filter(&panel.makes),
            exclude_autocanada: panel.exclude_autocanada,
        }
    }

    /// Same criteria with the cluster restriction lifted.
    pub fn without_clusters(&self) -> Self {
        Self {
            clusters: None,
            ..self.clone()
        }
    }

    fn category(&self, category: Category) -> &SetFilter<String> {
        match category {
            Category::StockType => &self.stock_types,
            Category::Engine => &self.engines,
            Category::Drivetrain => &self.drivetrains,
            Category::Make => &self.makes,
        }
    }

    /// Whether a single record passes every condition.
    pub fn matches(&self, record: &VehicleSaleRecord) -> bool {
        self.price.contains(record.price)
            && passes(&self.clusters, &record.cluster)
            && Category::ALL
                .iter()
                .all(|&c| passes(self.category(c), c.value_of(record)))
            && !(self.exclude_autocanada && dealer_excluded(&record.dealer_name))
    }
}

/// Return the records that pass `criteria`, in input order.
pub fn apply<'a>(
    records: &'a [VehicleSaleRecord],
    criteria: &FilterCriteria,
) -> Vec<&'a VehicleSaleRecord> {
    records.iter().filter(|r| criteria.matches(r)).collect()
}
