use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use arrow::array::{Array, AsArray, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use thiserror::Error;

use super::model::{float_to_whole, SalesDataset, VehicleSaleRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("downloading dataset: {0}")]
    Http(#[from] reqwest::Error),

    #[error("downloading {url}: server answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("reading dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV row {row}: {source}")]
    Csv { row: usize, source: csv::Error },

    #[error("parsing JSON records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reading parquet: {0}")]
    Parquet(#[from] ParquetError),

    #[error("decoding parquet columns: {0}")]
    Arrow(#[from] ArrowError),

    #[error("dataset is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("row {row}, column '{column}': {reason}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        reason: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Download the CSV at `url` with a blocking GET and parse it.
///
/// No retry: a failed download is reported to the caller as-is.
pub fn fetch_url(url: &str) -> Result<SalesDataset, LoadError> {
    log::info!("Downloading dataset from {url}");
    let response = reqwest::blocking::get(url)?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status,
        });
    }
    let body = response.bytes()?;
    log::debug!("Downloaded {} bytes", body.len());
    read_csv(body.as_ref())
}

/// Load a dataset from a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the exported sales table with a header row
/// * `.json`    – `[{ "vehicle_id": ..., "make": ..., ... }, ...]`
/// * `.parquet` – same columns; numeric columns may use any numeric type
pub fn load_file(path: &Path) -> Result<SalesDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => read_csv(File::open(path)?),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse a CSV document with a header row. Columns beyond the known set are
/// ignored; a missing known column fails on the first row.
pub fn read_csv<R: Read>(reader: R) -> Result<SalesDataset, LoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (row, result) in reader.deserialize::<VehicleSaleRecord>().enumerate() {
        let record = result.map_err(|source| LoadError::Csv { row, source })?;
        records.push(record);
    }

    Ok(SalesDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as written by `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<SalesDataset, LoadError> {
    let file = File::open(path)?;
    let records: Vec<VehicleSaleRecord> = serde_json::from_reader(BufReader::new(file))?;
    Ok(SalesDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

fn load_parquet(path: &Path) -> Result<SalesDataset, LoadError> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        let offset = records.len();
        records.extend(records_from_batch(&batch, offset)?);
    }

    Ok(SalesDataset::from_records(records))
}

/// Convert one record batch into records. `offset` is the global index of
/// the batch's first row, used in error messages.
fn records_from_batch(
    batch: &RecordBatch,
    offset: usize,
) -> Result<Vec<VehicleSaleRecord>, LoadError> {
    let vehicle_id = string_column(batch, "vehicle_id")?;
    let make = string_column(batch, "make")?;
    let model = string_column(batch, "model")?;
    let stock_type = string_column(batch, "stock_type")?;
    let engine = string_column(batch, "engine_from_vin")?;
    let drivetrain = string_column(batch, "drivetrain_from_vin")?;
    let dealer_name = string_column(batch, "dealer_name")?;
    let price = float_column(batch, "price")?;
    let mileage = float_column(batch, "mileage")?;
    let cluster = float_column(batch, "Cluster")?;
    let region = string_column(batch, "Region")?;
    let latitude = float_column(batch, "FSA_Latitude")?;
    let longitude = float_column(batch, "FSA_Longitude")?;
    let region_dealerships = float_column(batch, "Region_dealerships")?;
    let top_dealer = string_column(batch, "Top_performing_dealerships")?;
    let average_mileage = float_column(batch, "Average_mileage")?;

    (0..batch.num_rows())
        .map(|i| {
            let row = offset + i;
            Ok(VehicleSaleRecord {
                vehicle_id: text(&vehicle_id, i),
                make: text(&make, i),
                model: text(&model, i),
                stock_type: text(&stock_type, i),
                engine: text(&engine, i),
                drivetrain: text(&drivetrain, i),
                dealer_name: text(&dealer_name, i),
                price: float(&price, i),
                mileage: whole(&mileage, i, row, "mileage")?,
                cluster: whole(&cluster, i, row, "Cluster")?,
                region: text(&region, i),
                latitude: float(&latitude, i),
                longitude: float(&longitude, i),
                region_dealerships: whole(&region_dealerships, i, row, "Region_dealerships")?,
                top_performing_dealer: text(&top_dealer, i),
                average_mileage: float(&average_mileage, i),
            })
        })
        .collect()
}

// -- Arrow helpers --

fn string_column(batch: &RecordBatch, name: &'static str) -> Result<StringArray, LoadError> {
    let col = batch
        .column_by_name(name)
        .ok_or(LoadError::MissingColumn(name))?;
    let casted = cast(col, &DataType::Utf8)?;
    Ok(casted.as_string::<i32>().clone())
}

fn float_column(batch: &RecordBatch, name: &'static str) -> Result<Float64Array, LoadError> {
    let col = batch
        .column_by_name(name)
        .ok_or(LoadError::MissingColumn(name))?;
    let casted = cast(col, &DataType::Float64)?;
    Ok(casted.as_primitive::<Float64Type>().clone())
}

/// Null strings read as empty.
fn text(col: &StringArray, i: usize) -> String {
    if col.is_null(i) {
        String::new()
    } else {
        col.value(i).to_string()
    }
}

/// Null floats read as NaN, the dataframe convention.
fn float(col: &Float64Array, i: usize) -> f64 {
    if col.is_null(i) {
        f64::NAN
    } else {
        col.value(i)
    }
}

fn whole<T: TryFrom<u64>>(
    col: &Float64Array,
    i: usize,
    row: usize,
    column: &'static str,
) -> Result<T, LoadError> {
    let invalid = |reason: String| LoadError::InvalidValue { row, column, reason };
    if col.is_null(i) {
        return Err(invalid("missing value".to_string()));
    }
    let value = float_to_whole(col.value(i)).map_err(invalid)?;
    T::try_from(value).map_err(|_| invalid(format!("{value} is out of range")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str = "vehicle_id,make,model,stock_type,engine_from_vin,drivetrain_from_vin,dealer_name,price,mileage,Cluster,Region,FSA_Latitude,FSA_Longitude,Region_dealerships,Top_performing_dealerships,Average_mileage,extra";

    fn csv_text(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn read_csv_parses_rows_and_ignores_extra_columns() {
        let text = csv_text(&[
            "V1,Ford,F-150,Used,3.5L,4WD,AutoCanada Edmonton,35000,62000,2,North,53.6,-113.5,7,Dealer X,58000.5,ignored",
            "V2,Honda,Civic,New,2.0L,FWD,Acme,24000.5,15.0,0.0,South,53.4,-113.5,3,Dealer Y,12000,ignored",
        ]);
        let ds = read_csv(text.as_bytes()).unwrap();

        assert_eq!(ds.len(), 2);
        let first = &ds.records[0];
        assert_eq!(first.engine, "3.5L");
        assert_eq!(first.cluster, 2);
        assert_eq!(first.region_dealerships, 7);
        assert_eq!(first.average_mileage, 58000.5);

        // Integer columns written as floats still load.
        let second = &ds.records[1];
        assert_eq!(second.mileage, 15);
        assert_eq!(second.cluster, 0);
        assert_eq!(second.price, 24000.5);
        assert!(ds.options.makes.contains("Honda"));
    }

    #[test]
    fn read_csv_rejects_fractional_cluster() {
        let text = csv_text(&[
            "V1,Ford,F-150,Used,3.5L,4WD,Acme,35000,62000,2.5,North,53.6,-113.5,7,Dealer X,58000,",
        ]);
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Csv { row: 0, .. }), "{err}");
    }

    #[test]
    fn read_csv_fails_on_missing_column() {
        let text = "vehicle_id,make\nV1,Ford\n";
        assert!(matches!(
            read_csv(text.as_bytes()),
            Err(LoadError::Csv { .. })
        ));
    }

    #[test]
    fn load_file_rejects_unknown_extension() {
        let err = load_file(Path::new("sales.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ref e) if e == "xlsx"));
    }

    #[test]
    fn load_file_reads_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("sales.csv");
        std::fs::write(
            &csv_path,
            csv_text(&[
                "V1,Kia,Soul,Used,2.0L,FWD,Acme,18000,30000,1,West,53.5,-113.6,2,Dealer Z,31000,",
            ]),
        )
        .unwrap();
        let ds = load_file(&csv_path).unwrap();
        assert_eq!(ds.records[0].model, "Soul");

        let json_path = dir.path().join("sales.json");
        let mut file = File::create(&json_path).unwrap();
        write!(
            file,
            r#"[{{"vehicle_id":"V9","make":"Kia","model":"Rio","stock_type":"New",
                "engine_from_vin":"1.6L","drivetrain_from_vin":"FWD","dealer_name":"Acme",
                "price":17000.0,"mileage":10.0,"Cluster":4,"Region":"East",
                "FSA_Latitude":53.55,"FSA_Longitude":-113.4,"Region_dealerships":5,
                "Top_performing_dealerships":"Acme","Average_mileage":9000.0}}]"#
        )
        .unwrap();
        drop(file);
        let ds = load_file(&json_path).unwrap();
        assert_eq!(ds.records[0].cluster, 4);
        assert_eq!(ds.records[0].mileage, 10);
    }

    #[test]
    fn load_file_reads_parquet_with_integer_columns() {
        let strings = |v: &str| -> ArrayRef { Arc::new(StringArray::from(vec![v, v])) };
        let floats = |a: f64, b: f64| -> ArrayRef { Arc::new(Float64Array::from(vec![a, b])) };
        let ints = |a: i64, b: i64| -> ArrayRef { Arc::new(Int64Array::from(vec![a, b])) };

        let columns: Vec<(&str, ArrayRef)> = vec![
            ("vehicle_id", strings("V")),
            ("make", strings("Mazda")),
            ("model", strings("CX-5")),
            ("stock_type", strings("Used")),
            ("engine_from_vin", strings("2.5L")),
            ("drivetrain_from_vin", strings("AWD")),
            ("dealer_name", strings("Acme")),
            ("price", floats(30000.0, 31000.0)),
            ("mileage", ints(1000, 2000)),
            ("Cluster", ints(7, 12)),
            ("Region", strings("Central")),
            ("FSA_Latitude", floats(53.54, 53.54)),
            ("FSA_Longitude", floats(-113.49, -113.49)),
            ("Region_dealerships", ints(9, 9)),
            ("Top_performing_dealerships", strings("Acme")),
            ("Average_mileage", floats(1500.0, 1500.0)),
        ];
        let schema = Arc::new(Schema::new(
            columns
                .iter()
                .map(|(name, arr)| Field::new(*name, arr.data_type().clone(), false))
                .collect::<Vec<_>>(),
        ));
        let batch =
            RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, a)| a).collect())
                .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.parquet");
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[1].cluster, 12);
        assert_eq!(ds.records[1].mileage, 2000);
        assert_eq!(ds.records[0].region_dealerships, 9);
        assert_eq!(ds.records[0].make, "Mazda");
    }
}
