use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use flate2::read::MultiGzDecoder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::{DataError, Result};
use super::model::{CleanedDataset, Listing};

// ---------------------------------------------------------------------------
// Kept columns
// ---------------------------------------------------------------------------

/// A column of the cleaned table and the source headers it may be read from,
/// in order of preference.
struct KeptColumn {
    name: &'static str,
    sources: &'static [&'static str],
}

macro_rules! kept {
    ($name:literal) => {
        KeptColumn {
            name: $name,
            sources: &[$name],
        }
    };
}

/// Every column the cleaned table keeps. All others are ignored on read.
const KEPT_COLUMNS: [KeptColumn; 16] = [
    kept!("id"),
    kept!("name"),
    kept!("host_id"),
    kept!("host_is_superhost"),
    KeptColumn {
        name: "neighbourhood",
        sources: &["neighbourhood_cleansed", "neighbourhood"],
    },
    kept!("latitude"),
    kept!("longitude"),
    kept!("property_type"),
    kept!("room_type"),
    kept!("accommodates"),
    kept!("bathrooms_text"),
    kept!("bedrooms"),
    kept!("beds"),
    kept!("price"),
    kept!("number_of_reviews"),
    kept!("review_scores_rating"),
];

const SUPERHOST: usize = 3;

/// Cell texts read as missing, the same set dataframe CSV readers treat as
/// NA by default.
const NA_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    NA_MARKERS.contains(&cell)
}

/// One projected source row; `None` marks a missing cell.
type RawRow = [Option<String>; KEPT_COLUMNS.len()];

/// Resolve the source position of every kept column, given a header lookup.
fn project<F>(position_of: F) -> Result<[usize; KEPT_COLUMNS.len()]>
where
    F: Fn(&str) -> Option<usize>,
{
    let mut positions = [0; KEPT_COLUMNS.len()];
    for (slot, column) in positions.iter_mut().zip(KEPT_COLUMNS.iter()) {
        *slot = column
            .sources
            .iter()
            .find_map(|source| position_of(*source))
            .ok_or(DataError::MissingColumn(column.name))?;
    }
    Ok(positions)
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and clean a listings file. Dispatch by file name.
///
/// Supported formats:
/// * `.csv.gz` / `.gz` – gzip-compressed CSV (the public listings export)
/// * `.csv`            – plain CSV
/// * `.parquet` / `.pq` – Parquet with the same column names
pub fn load_file(path: &Path) -> Result<CleanedDataset> {
    if !path.is_file() {
        return Err(DataError::DataSourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    log::info!("Loading listings from {}", path.display());

    let dataset = match ext.as_str() {
        "gz" => {
            let decoder = MultiGzDecoder::new(BufReader::new(open(path)?));
            clean_rows(csv_rows(decoder)?)
        }
        "csv" => clean_rows(csv_rows(open(path)?)?),
        "parquet" | "pq" => clean_rows(parquet_rows(open(path)?)?.into_iter().map(Ok)),
        other => Err(DataError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!(
        "Loaded {} listings from {} ({} incomplete rows dropped)",
        dataset.len(),
        path.display(),
        dataset.dropped_rows
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        log::error!("Cannot open {}: {e}", path.display());
        DataError::DataSourceNotFound {
            path: path.to_path_buf(),
        }
    })
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

/// Turn projected source rows into a [`CleanedDataset`].
///
/// Missing superhost flags become `f` first; any row still holding a
/// missing cell is then dropped whole. Malformed numbers fail the load.
fn clean_rows<I>(rows: I) -> Result<CleanedDataset>
where
    I: IntoIterator<Item = Result<RawRow>>,
{
    let mut listings = Vec::new();
    let mut dropped = 0;

    for (row_no, raw) in rows.into_iter().enumerate() {
        match clean_row(row_no, raw?)? {
            Some(listing) => listings.push(listing),
            None => {
                log::debug!("Dropping row {row_no}: missing value in a kept column");
                dropped += 1;
            }
        }
    }

    Ok(CleanedDataset::from_listings(listings, dropped))
}

fn clean_row(row: usize, mut raw: RawRow) -> Result<Option<Listing>> {
    if raw[SUPERHOST].is_none() {
        raw[SUPERHOST] = Some("f".to_string());
    }
    if raw.iter().any(Option::is_none) {
        return Ok(None);
    }

    let [id, name, host_id, host_is_superhost, neighbourhood, latitude, longitude, property_type, room_type, accommodates, bathrooms_text, bedrooms, beds, price, number_of_reviews, review_scores_rating] =
        raw.map(Option::unwrap_or_default);

    let price =
        normalize_price(&price).ok_or_else(|| parse_error(row, "price", &price, "a price"))?;

    Ok(Some(Listing {
        id: parse_int(row, "id", &id)?,
        name,
        host_id: parse_int(row, "host_id", &host_id)?,
        host_is_superhost: parse_flag(row, &host_is_superhost)?,
        neighbourhood,
        latitude: parse_float(row, "latitude", &latitude)?,
        longitude: parse_float(row, "longitude", &longitude)?,
        property_type,
        room_type,
        accommodates: parse_int(row, "accommodates", &accommodates)?,
        bathrooms_text,
        bedrooms: parse_float(row, "bedrooms", &bedrooms)?,
        beds: parse_float(row, "beds", &beds)?,
        price,
        number_of_reviews: parse_int(row, "number_of_reviews", &number_of_reviews)?,
        review_scores_rating: parse_float(row, "review_scores_rating", &review_scores_rating)?,
    }))
}

/// Strip the currency symbol and thousands separators from a price, e.g.
/// `"$1,234.50"` → `1234.5`. Returns `None` for anything non-numeric.
pub fn normalize_price(text: &str) -> Option<f64> {
    let digits: String = text.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    digits
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
}

fn parse_error(
    row: usize,
    column: &'static str,
    value: &str,
    expected: &'static str,
) -> DataError {
    DataError::Parse {
        row,
        column,
        value: value.to_string(),
        expected,
    }
}

fn parse_float(row: usize, column: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| parse_error(row, column, value, "a number"))
}

/// Integers may arrive as `"3"` or, from float-typed exports, `"3.0"`.
/// Floats outside the `i64` range are rejected rather than saturated.
fn parse_int(row: usize, column: &'static str, value: &str) -> Result<i64> {
    let trimmed = value.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(i);
    }
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    let in_range = |f: f64| f >= i64::MIN as f64 && f < i64::MAX as f64;
    match trimmed.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && in_range(f) => Ok(f as i64),
        _ => Err(parse_error(row, column, value, "an integer")),
    }
}

fn parse_flag(row: usize, value: &str) -> Result<bool> {
    match value.trim() {
        "t" | "true" => Ok(true),
        "f" | "false" => Ok(false),
        _ => Err(parse_error(row, "host_is_superhost", value, "a t/f flag")),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Project CSV records onto the kept columns. Empty and NA-marker cells are
/// missing.
fn csv_rows<R: Read>(reader: R) -> Result<impl Iterator<Item = Result<RawRow>>> {
    let mut reader = csv::ReaderBuilder::new().from_reader(reader);
    let headers = reader.headers()?.clone();
    let positions = project(|name| headers.iter().position(|h| h == name))?;

    Ok(reader.into_records().map(move |record| {
        let record = record?;
        Ok(std::array::from_fn(|c| {
            record
                .get(positions[c])
                .filter(|cell| !is_missing(cell))
                .map(str::to_string)
        }))
    }))
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Project every Parquet record batch onto the kept columns.
///
/// Nulls, NA-marker strings and NaN floats are missing; other cells are read as
/// text so they go through the same cleaning as CSV input.
fn parquet_rows(file: File) -> Result<Vec<RawRow>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let mut rows = Vec::new();

    for batch in reader {
        let batch = batch?;
        let schema = batch.schema();
        let positions = project(|name| schema.index_of(name).ok())?;
        let columns: Vec<&ArrayRef> = positions.iter().map(|&i| batch.column(i)).collect();

        for row in 0..batch.num_rows() {
            let mut raw: RawRow = Default::default();
            for (cell, col) in raw.iter_mut().zip(&columns) {
                *cell = cell_text(col, row)?;
            }
            rows.push(raw);
        }
    }

    Ok(rows)
}

fn cell_text(col: &ArrayRef, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let text = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row).to_string(),
        DataType::Float32 => {
            let v = col.as_primitive::<Float32Type>().value(row);
            if v.is_nan() {
                return Ok(None);
            }
            v.to_string()
        }
        DataType::Float64 => {
            let v = col.as_primitive::<Float64Type>().value(row);
            if v.is_nan() {
                return Ok(None);
            }
            v.to_string()
        }
        DataType::Boolean => {
            let flag = if col.as_boolean().value(row) { "t" } else { "f" };
            flag.to_string()
        }
        _ => array_value_to_string(col.as_ref(), row)?,
    };
    Ok(Some(text).filter(|t| !is_missing(t)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    const HEADER: &str = "id,listing_url,name,host_id,host_is_superhost,neighbourhood,\
neighbourhood_cleansed,latitude,longitude,property_type,room_type,accommodates,\
bathrooms_text,bedrooms,beds,price,number_of_reviews,review_scores_rating";

    fn row(id: i64, superhost: &str, hood: &str, room: &str, price: &str, beds: &str) -> String {
        format!(
            "{id},https://example.com/{id},\"Flat {id}, bright\",{},{superhost},\"Madrid, Spain\",\
{hood},40.41,-3.70,Entire rental unit,{room},2,1 bath,1,{beds},\"{price}\",12,4.75",
            500 + id
        )
    }

    fn write_gz(dir: &TempDir, name: &str, lines: &[String]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let file = File::create(&path).unwrap();
        let mut enc = GzEncoder::new(file, Compression::default());
        writeln!(enc, "{HEADER}").unwrap();
        for line in lines {
            writeln!(enc, "{line}").unwrap();
        }
        enc.finish().unwrap();
        path
    }

    #[test]
    fn test_normalize_price() {
        assert_eq!(normalize_price("$1,234.50"), Some(1234.50));
        assert_eq!(normalize_price("$99.00"), Some(99.0));
        assert_eq!(normalize_price("$12,000,000.00"), Some(12_000_000.0));
        assert_eq!(normalize_price("80"), Some(80.0));
        assert_eq!(normalize_price("$abc"), None);
        assert_eq!(normalize_price("$"), None);
        assert_eq!(normalize_price("NaN"), None);
    }

    #[test]
    fn test_parse_int_accepts_integral_floats() {
        assert_eq!(parse_int(0, "beds", "3").unwrap(), 3);
        assert_eq!(parse_int(0, "beds", "3.0").unwrap(), 3);
        assert!(parse_int(0, "beds", "3.5").is_err());
        assert!(parse_int(0, "beds", "three").is_err());
        assert!(parse_int(0, "id", "1e30").is_err());
        assert!(parse_int(0, "id", "-1e30").is_err());
        assert!(parse_int(0, "id", "9223372036854775808.0").is_err());
        assert_eq!(parse_int(0, "id", "-9223372036854775808.0").unwrap(), i64::MIN);
    }

    #[test]
    fn test_na_markers_are_missing() {
        for marker in ["", "NA", "N/A", "NaN", "nan", "NULL", "null", "None", "#N/A", "<NA>"] {
            assert!(is_missing(marker), "{marker:?} should be missing");
        }
        assert!(!is_missing("Nano"));
        assert!(!is_missing("0"));
        assert!(!is_missing(" NA"));
    }

    #[test]
    fn test_load_gzip_csv() {
        let dir = TempDir::new().unwrap();
        let path = write_gz(
            &dir,
            "listings.csv.gz",
            &[
                row(1, "t", "Centro", "Entire home/apt", "$1,234.50", "2"),
                row(2, "f", "Salamanca", "Private room", "$99.00", "1"),
            ],
        );

        let ds = load_file(&path).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.dropped_rows, 0);
        let first = &ds.listings[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.name, "Flat 1, bright");
        assert_eq!(first.host_id, 501);
        assert!(first.host_is_superhost);
        // neighbourhood_cleansed wins over the free-text neighbourhood column
        assert_eq!(first.neighbourhood, "Centro");
        assert_eq!(first.price, 1234.50);
        assert_eq!(first.accommodates, 2);
        assert_eq!(first.review_scores_rating, 4.75);
        assert_eq!(ds.listings[1].price, 99.0);
    }

    #[test]
    fn test_missing_superhost_defaults_to_f() {
        let dir = TempDir::new().unwrap();
        let path = write_gz(
            &dir,
            "listings.csv.gz",
            &[row(1, "", "Centro", "Private room", "$40.00", "1")],
        );

        let ds = load_file(&path).unwrap();

        assert_eq!(ds.len(), 1);
        assert!(!ds.listings[0].host_is_superhost);
    }

    #[test]
    fn test_rows_with_missing_values_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = write_gz(
            &dir,
            "listings.csv.gz",
            &[
                row(1, "t", "Centro", "Entire home/apt", "$100.00", ""),
                row(2, "f", "Centro", "Private room", "", "1"),
                row(3, "f", "Retiro", "Private room", "$55.00", "1"),
            ],
        );

        let ds = load_file(&path).unwrap();

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.dropped_rows, 2);
        assert_eq!(ds.listings[0].id, 3);
    }

    #[test]
    fn test_malformed_price_fails_load() {
        let dir = TempDir::new().unwrap();
        let path = write_gz(
            &dir,
            "listings.csv.gz",
            &[
                row(1, "t", "Centro", "Entire home/apt", "$100.00", "1"),
                row(2, "f", "Centro", "Private room", "ask host", "1"),
            ],
        );

        match load_file(&path) {
            Err(DataError::Parse {
                row, column, value, ..
            }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "price");
                assert_eq!(value, "ask host");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_latitude_fails_load() {
        let dir = TempDir::new().unwrap();
        let bad = row(2, "f", "Centro", "Private room", "$50.00", "1").replace("40.41", "abc");
        let path = write_gz(
            &dir,
            "listings.csv.gz",
            &[row(1, "t", "Centro", "Entire home/apt", "$100.00", "1"), bad],
        );

        match load_file(&path) {
            Err(DataError::Parse {
                row,
                column,
                value,
                expected,
            }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "latitude");
                assert_eq!(value, "abc");
                assert_eq!(expected, "a number");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_superhost_flag_fails_load() {
        let dir = TempDir::new().unwrap();
        let path = write_gz(
            &dir,
            "listings.csv.gz",
            &[row(1, "maybe", "Centro", "Private room", "$40.00", "1")],
        );

        let err = load_file(&path).unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse error at row 0, column 'host_is_superhost': 'maybe' cannot be parsed as a t/f flag"
        );
    }

    #[test]
    fn test_na_marker_cells_are_missing() {
        let dir = TempDir::new().unwrap();
        let path = write_gz(
            &dir,
            "listings.csv.gz",
            &[
                row(1, "t", "Centro", "Entire home/apt", "$100.00", "NaN"),
                row(2, "f", "Centro", "Private room", "$60.00", "1").replace("1 bath", "N/A"),
                row(3, "NA", "Retiro", "Private room", "$55.00", "1"),
            ],
        );

        let ds = load_file(&path).unwrap();

        assert_eq!(ds.dropped_rows, 2);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.listings[0].id, 3);
        assert!(!ds.listings[0].host_is_superhost);
    }

    #[test]
    fn test_corrupt_gzip_is_csv_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listings.csv.gz");
        let plain = format!(
            "{HEADER}\n{}\n",
            row(1, "t", "Centro", "Private room", "$40.00", "1")
        );
        std::fs::write(&path, plain).unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, DataError::Csv(_)), "got {err:?}");
    }

    #[test]
    fn test_missing_file_is_data_source_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listings.csv.gz");

        let err = load_file(&path).unwrap_err();

        assert!(matches!(err, DataError::DataSourceNotFound { .. }));
    }

    #[test]
    fn test_missing_required_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listings.csv");
        std::fs::write(&path, "id,name,price\n1,Flat,$10.00\n").unwrap();

        let err = load_file(&path).unwrap_err();

        assert!(matches!(err, DataError::MissingColumn("host_id")));
    }

    #[test]
    fn test_plain_csv_and_neighbourhood_fallback() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listings.csv");
        let header = HEADER.replace("neighbourhood_cleansed,", "district,");
        let body = row(9, "f", "Centro", "Hotel room", "$75.00", "1");
        std::fs::write(&path, format!("{header}\n{body}\n")).unwrap();

        let ds = load_file(&path).unwrap();

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.listings[0].neighbourhood, "Madrid, Spain");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listings.xlsx");
        std::fs::write(&path, b"not a table").unwrap();

        let err = load_file(&path).unwrap_err();

        assert!(matches!(err, DataError::UnsupportedFormat(ref e) if e == "xlsx"));
    }

    #[test]
    fn test_load_parquet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listings.parquet");

        let text = |v: Vec<Option<&str>>| Arc::new(StringArray::from(v)) as ArrayRef;
        let ints = |v: Vec<Option<i64>>| Arc::new(Int64Array::from(v)) as ArrayRef;
        let floats = |v: Vec<Option<f64>>| Arc::new(Float64Array::from(v)) as ArrayRef;

        let columns: Vec<(&str, ArrayRef)> = vec![
            ("id", ints(vec![Some(1), Some(2), Some(3)])),
            ("name", text(vec![Some("A"), Some("B"), Some("C")])),
            ("host_id", ints(vec![Some(10), Some(20), Some(30)])),
            (
                "host_is_superhost",
                Arc::new(BooleanArray::from(vec![Some(true), None, Some(false)])) as ArrayRef,
            ),
            (
                "neighbourhood_cleansed",
                text(vec![Some("Centro"), Some("Retiro"), Some("Centro")]),
            ),
            ("latitude", floats(vec![Some(40.4), Some(40.41), Some(40.42)])),
            ("longitude", floats(vec![Some(-3.7), Some(-3.69), Some(-3.71)])),
            ("property_type", text(vec![Some("Loft"), Some("Loft"), Some("Loft")])),
            (
                "room_type",
                text(vec![Some("Entire home/apt"), Some("Private room"), Some("Private room")]),
            ),
            ("accommodates", ints(vec![Some(2), Some(1), Some(1)])),
            ("bathrooms_text", text(vec![Some("1 bath"), Some("1 bath"), Some("1 bath")])),
            ("bedrooms", floats(vec![Some(1.0), Some(1.0), Some(1.0)])),
            ("beds", floats(vec![Some(1.0), Some(1.0), Some(f64::NAN)])),
            ("price", text(vec![Some("$1,050.00"), Some("$60.00"), Some("$45.00")])),
            ("number_of_reviews", ints(vec![Some(3), Some(0), Some(8)])),
            ("review_scores_rating", floats(vec![Some(4.9), Some(4.1), Some(4.5)])),
        ];
        let schema = Arc::new(Schema::new(
            columns
                .iter()
                .map(|(name, arr)| Field::new(*name, arr.data_type().clone(), true))
                .collect::<Vec<_>>(),
        ));
        let batch =
            RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, a)| a).collect())
                .unwrap();
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();

        // Row 3 has a NaN bed count and is dropped.
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.dropped_rows, 1);
        assert_eq!(ds.listings[0].price, 1050.0);
        assert!(ds.listings[0].host_is_superhost);
        assert!(!ds.listings[1].host_is_superhost);
        assert_eq!(ds.listings[1].neighbourhood, "Retiro");
    }
}
