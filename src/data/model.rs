use std::collections::BTreeSet;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// VehicleSaleRecord – one row of the sales table
// ---------------------------------------------------------------------------

/// A single sold vehicle with its pre-assigned cluster and region context.
///
/// Field names follow the exported dataframe columns, so the same struct
/// reads CSV headers and JSON record keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSaleRecord {
    pub vehicle_id: String,
    pub make: String,
    pub model: String,
    pub stock_type: String,
    #[serde(rename = "engine_from_vin")]
    pub engine: String,
    #[serde(rename = "drivetrain_from_vin")]
    pub drivetrain: String,
    pub dealer_name: String,
    pub price: f64,
    #[serde(deserialize_with = "whole_number")]
    pub mileage: u64,
    #[serde(rename = "Cluster", deserialize_with = "whole_number")]
    pub cluster: u32,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "FSA_Latitude")]
    pub latitude: f64,
    #[serde(rename = "FSA_Longitude")]
    pub longitude: f64,
    #[serde(rename = "Region_dealerships", deserialize_with = "whole_number")]
    pub region_dealerships: u32,
    #[serde(rename = "Top_performing_dealerships")]
    pub top_performing_dealer: String,
    #[serde(rename = "Average_mileage")]
    pub average_mileage: f64,
}

/// Any numeric spelling a dataframe export may produce for an integer cell.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumericCell {
    Int(u64),
    Float(f64),
    Text(String),
}

/// Accept `42`, `42.0` and `"42"` for integer columns; reject fractions and
/// negatives.
fn whole_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let value = match NumericCell::deserialize(deserializer)? {
        NumericCell::Int(i) => i,
        NumericCell::Float(f) => float_to_whole(f).map_err(D::Error::custom)?,
        NumericCell::Text(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(i) => i,
                Err(_) => {
                    let f = s
                        .parse::<f64>()
                        .map_err(|_| D::Error::custom(format!("'{s}' is not a number")))?;
                    float_to_whole(f).map_err(D::Error::custom)?
                }
            }
        }
    };
    T::try_from(value).map_err(|_| D::Error::custom(format!("{value} is out of range")))
}

pub(crate) fn float_to_whole(f: f64) -> Result<u64, String> {
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Ok(f as u64)
    } else {
        Err(format!("{f} is not a whole non-negative number"))
    }
}

// ---------------------------------------------------------------------------
// Category – the multi-select columns
// ---------------------------------------------------------------------------

/// Categorical columns exposed as multi-select filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    StockType,
    Engine,
    Drivetrain,
    Make,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::StockType,
        Category::Engine,
        Category::Drivetrain,
        Category::Make,
    ];

    /// The record's value for this column.
    pub fn value_of(self, record: &VehicleSaleRecord) -> &str {
        match self {
            Category::StockType => &record.stock_type,
            Category::Engine => &record.engine,
            Category::Drivetrain => &record.drivetrain,
            Category::Make => &record.make,
        }
    }

    /// Widget label.
    pub fn label(self) -> &'static str {
        match self {
            Category::StockType => "Type",
            Category::Engine => "Engine",
            Category::Drivetrain => "Drivetrain",
            Category::Make => "Make",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Sorted distinct values per categorical column, used to populate widgets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryOptions {
    pub stock_types: BTreeSet<String>,
    pub engines: BTreeSet<String>,
    pub drivetrains: BTreeSet<String>,
    pub makes: BTreeSet<String>,
}

impl CategoryOptions {
    pub fn values(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::StockType => &self.stock_types,
            Category::Engine => &self.engines,
            Category::Drivetrain => &self.drivetrains,
            Category::Make => &self.makes,
        }
    }
}

/// The full parsed dataset with pre-computed widget options.
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    /// All sales (rows), in file order.
    pub records: Vec<VehicleSaleRecord>,
    /// Distinct values for the selection widgets.
    pub options: CategoryOptions,
}

impl SalesDataset {
    /// Build widget options from the loaded records.
    pub fn from_records(records: Vec<VehicleSaleRecord>) -> Self {
        let mut options = CategoryOptions::default();
        for r in &records {
            options.stock_types.insert(r.stock_type.clone());
            options.engines.insert(r.engine.clone());
            options.drivetrains.insert(r.drivetrain.clone());
            options.makes.insert(r.make.clone());
        }
        SalesDataset { records, options }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builder-style fixture shared by the pipeline tests.
    pub(crate) fn record(cluster: u32, make: &str, model: &str) -> VehicleSaleRecord {
        VehicleSaleRecord {
            vehicle_id: format!("{cluster}-{make}-{model}"),
            make: make.to_string(),
            model: model.to_string(),
            stock_type: "Used".to_string(),
            engine: "2.0L".to_string(),
            drivetrain: "AWD".to_string(),
            dealer_name: "Acme Motors".to_string(),
            price: 25_000.0,
            mileage: 40_000,
            cluster,
            region: "North".to_string(),
            latitude: 53.6,
            longitude: -113.5,
            region_dealerships: 4,
            top_performing_dealer: "Acme Motors".to_string(),
            average_mileage: 41_000.0,
        }
    }

    #[test]
    fn from_records_collects_sorted_options() {
        let mut a = record(3, "Toyota", "RAV4");
        a.engine = "3.5L".to_string();
        let b = record(1, "Honda", "Civic");
        let ds = SalesDataset::from_records(vec![a, b]);

        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.options.makes.iter().collect::<Vec<_>>(),
            vec!["Honda", "Toyota"]
        );
        assert_eq!(ds.options.values(Category::Engine).len(), 2);
    }

    #[test]
    fn category_reads_matching_field() {
        let r = record(0, "Ford", "F-150");
        assert_eq!(Category::Make.value_of(&r), "Ford");
        assert_eq!(Category::Drivetrain.value_of(&r), "AWD");
        assert_eq!(Category::StockType.to_string(), "Type");
    }

    #[test]
    fn float_to_whole_rejects_fractions() {
        assert_eq!(float_to_whole(42.0), Ok(42));
        assert!(float_to_whole(42.5).is_err());
        assert!(float_to_whole(-1.0).is_err());
        assert!(float_to_whole(f64::NAN).is_err());
    }
}
