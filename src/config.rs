//! Fixed dashboard settings. Nothing here is read from the environment.

/// Remote CSV with the clustered vehicle sales.
pub const DATASET_URL: &str =
    "https://drive.google.com/uc?export=download&id=1ELFg0FB42MzAHAgWkERFuvn45d8S-pBh";

/// Embedded BI report, handed to the user untouched.
pub const BI_EMBED_URL: &str = "https://app.powerbi.com/reportEmbed?reportId=760b6d9f-a087-4501-8d7a-64e28f840607&autoAuth=true&ctid=2ba011f1-f50a-44f3-a200-db3ea74e29b7";

/// Default price window applied when nothing else is chosen.
pub const DEFAULT_PRICE_RANGE: (f64, f64) = (10_000.0, 80_000.0);

/// Slider bounds for the price window.
pub const PRICE_BOUNDS: (f64, f64) = (5_000.0, 100_000.0);

/// Dealer group hidden by the exclusion toggle (matched case-insensitively).
pub const EXCLUDED_DEALER_GROUP: &str = "AutoCanada";

/// Placeholder for mode aggregates over empty groups.
pub const NOT_AVAILABLE: &str = "N/A";

/// Rows kept in the top dealer / top model tables.
pub const TOP_N: usize = 10;

/// Map centre (latitude, longitude): downtown Edmonton.
pub const MAP_CENTER: (f64, f64) = (53.5461, -113.4938);
