//! Writes a synthetic clustered sales dataset as `sample_sales.csv`,
//! `sample_sales.json` and `sample_sales.parquet`, for running the dashboard
//! without network access.

use std::collections::BTreeMap;
use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// One output row, column names as the dashboard expects them.
#[derive(Serialize)]
struct Row {
    vehicle_id: String,
    make: String,
    model: String,
    stock_type: String,
    engine_from_vin: String,
    drivetrain_from_vin: String,
    dealer_name: String,
    price: f64,
    mileage: u64,
    #[serde(rename = "Cluster")]
    cluster: u32,
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "FSA_Latitude")]
    latitude: f64,
    #[serde(rename = "FSA_Longitude")]
    longitude: f64,
    #[serde(rename = "Region_dealerships")]
    region_dealerships: u32,
    #[serde(rename = "Top_performing_dealerships")]
    top_performing_dealer: String,
    #[serde(rename = "Average_mileage")]
    average_mileage: f64,
}

// (region, latitude, longitude, dealers)
const REGIONS: &[(&str, f64, f64, &[&str])] = &[
    ("Central", 53.5461, -113.4938, &["Downtown Motors", "AutoCanada Central"]),
    ("North", 53.6030, -113.4950, &["Northgate Auto", "Castle Downs Cars"]),
    ("South", 53.4680, -113.4900, &["Southside Honda", "Acme AutoCanada South"]),
    ("West", 53.5220, -113.6230, &["West End Toyota", "Jasper Place Auto"]),
    ("Mill Woods", 53.4550, -113.4260, &["Mill Woods Mazda"]),
    ("Sherwood Park", 53.5410, -113.2950, &["Sherwood Ford", "Park Kia"]),
    ("St. Albert", 53.6300, -113.6260, &["St. Albert Chevrolet"]),
];

const VEHICLES: &[(&str, &[&str])] = &[
    ("Ford", &["F-150", "Escape", "Explorer"]),
    ("Toyota", &["RAV4", "Corolla", "Tacoma"]),
    ("Honda", &["Civic", "CR-V"]),
    ("Chevrolet", &["Silverado", "Equinox"]),
    ("Kia", &["Sorento", "Soul"]),
    ("Mazda", &["CX-5", "Mazda3"]),
];

const ENGINES: &[&str] = &["1.5L", "2.0L", "2.5L", "3.5L", "5.0L"];
const DRIVETRAINS: &[&str] = &["FWD", "AWD", "4WD", "RWD"];
const STOCK_TYPES: &[&str] = &["New", "Used"];

fn generate(n: usize, rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows: Vec<Row> = (0..n)
        .map(|i| {
            let region_idx = (rng.next_u64() % REGIONS.len() as u64) as usize;
            let (region, lat, lon, dealers) = REGIONS[region_idx];
            let (make, models) = *rng.pick(VEHICLES);
            let stock_type = *rng.pick(STOCK_TYPES);
            let mileage = if stock_type == "New" {
                rng.uniform(0.0, 500.0)
            } else {
                rng.uniform(5_000.0, 220_000.0)
            };
            let price = (rng.uniform(8_000.0, 95_000.0) / 100.0).round() * 100.0;
            // Clusters loosely follow region and price band.
            let band = if price < 30_000.0 { 0 } else { 1 };
            let cluster = ((region_idx * 2 + band) % 10) as u32;

            Row {
                vehicle_id: format!("VIN{i:06}"),
                make: make.to_string(),
                model: rng.pick(models).to_string(),
                stock_type: stock_type.to_string(),
                engine_from_vin: rng.pick(ENGINES).to_string(),
                drivetrain_from_vin: rng.pick(DRIVETRAINS).to_string(),
                dealer_name: rng.pick(dealers).to_string(),
                price,
                mileage: mileage.round() as u64,
                cluster,
                region: region.to_string(),
                latitude: lat,
                longitude: lon,
                region_dealerships: dealers.len() as u32,
                top_performing_dealer: dealers[0].to_string(),
                average_mileage: 0.0,
            }
        })
        .collect();

    // Per-region average mileage, repeated on every row of the region.
    let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for r in &rows {
        let e = totals.entry(r.region.clone()).or_default();
        e.0 += r.mileage as f64;
        e.1 += 1;
    }
    for r in &mut rows {
        if let Some((sum, n)) = totals.get(&r.region) {
            r.average_mileage = (sum / *n as f64).round();
        }
    }
    rows
}

fn to_batch(rows: &[Row]) -> Result<RecordBatch> {
    let strings = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let floats = |f: fn(&Row) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let ints = |f: fn(&Row) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("vehicle_id", strings(|r| r.vehicle_id.as_str())),
        ("make", strings(|r| r.make.as_str())),
        ("model", strings(|r| r.model.as_str())),
        ("stock_type", strings(|r| r.stock_type.as_str())),
        ("engine_from_vin", strings(|r| r.engine_from_vin.as_str())),
        ("drivetrain_from_vin", strings(|r| r.drivetrain_from_vin.as_str())),
        ("dealer_name", strings(|r| r.dealer_name.as_str())),
        ("price", floats(|r| r.price)),
        ("mileage", ints(|r| r.mileage as i64)),
        ("Cluster", ints(|r| i64::from(r.cluster))),
        ("Region", strings(|r| r.region.as_str())),
        ("FSA_Latitude", floats(|r| r.latitude)),
        ("FSA_Longitude", floats(|r| r.longitude)),
        ("Region_dealerships", ints(|r| i64::from(r.region_dealerships))),
        ("Top_performing_dealerships", strings(|r| r.top_performing_dealer.as_str())),
        ("Average_mileage", floats(|r| r.average_mileage)),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, arr)| Field::new(*name, arr.data_type().clone(), false))
            .collect::<Vec<Field>>(),
    ));
    let arrays = columns.into_iter().map(|(_, a)| a).collect();
    RecordBatch::try_new(schema, arrays).context("building record batch")
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(2_000, &mut rng);

    let csv_path = "sample_sales.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating CSV file")?;
    for row in &rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;

    let json_path = "sample_sales.json";
    let file = File::create(json_path).context("creating JSON file")?;
    serde_json::to_writer(file, &rows).context("writing JSON records")?;

    let batch = to_batch(&rows)?;
    let parquet_path = "sample_sales.parquet";
    let file = File::create(parquet_path).context("creating parquet file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {} sales to {csv_path}, {json_path} and {parquet_path}",
        rows.len()
    );
    Ok(())
}
