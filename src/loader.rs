use crate::error::LoadError;
use crate::sku::SkuResolver;
use crate::store::RecordStore;
use crate::types::{RawRow, Record};
use crate::util::{normalize_sku_token, normalize_text, parse_timestamp_safe, UNKNOWN};
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;

pub const REQUIRED_COLUMNS: [&str; 3] = ["Reject datetime", "Source", "Reject reason"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub unreadable_rows: usize,
    pub invalid_timestamps: usize,
    pub unknown_periods: usize,
    pub skus_resolved: usize,
    pub skus_present: usize,
}

pub fn load_and_clean(
    path: &Path,
    skus: &dyn SkuResolver,
) -> Result<(RecordStore, LoadReport), LoadError> {
    let rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    clean_from(rdr, skus)
}

/// Same as [`load_and_clean`] for an already-open source (tests, stdin).
pub fn load_from_reader<R: Read>(
    reader: R,
    skus: &dyn SkuResolver,
) -> Result<(RecordStore, LoadReport), LoadError> {
    let rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);
    clean_from(rdr, skus)
}

fn clean_from<R: Read>(
    mut rdr: csv::Reader<R>,
    skus: &dyn SkuResolver,
) -> Result<(RecordStore, LoadReport), LoadError> {
    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let mut report = LoadReport::default();
    let mut records: Vec<Record> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::debug!("Skipping unreadable row {}: {}", report.total_rows, e);
                report.unreadable_rows += 1;
                continue;
            }
        };

        let reject_datetime = parse_timestamp_safe(row.reject_datetime.as_deref());
        if reject_datetime.is_none() {
            report.invalid_timestamps += 1;
        }

        let sku_token = normalize_sku_token(&normalize_text(row.sku.as_deref()));
        let sku = match skus.resolve(&sku_token) {
            Some(description) => {
                report.skus_resolved += 1;
                description.to_string()
            }
            None => sku_token,
        };
        if sku != UNKNOWN {
            report.skus_present += 1;
        }

        let record = Record {
            reject_datetime,
            source: normalize_text(row.source.as_deref()),
            reject_reason: normalize_text(row.reject_reason.as_deref()),
            lpn: normalize_text(row.lpn.as_deref()),
            sku,
            log_text: normalize_text(row.log_text.as_deref()),
            quantity: 1,
        };
        if record.period() == UNKNOWN {
            report.unknown_periods += 1;
        }
        records.push(record);
    }

    log::info!(
        "Successfully mapped {} out of {} SKU records to descriptions",
        report.skus_resolved,
        report.skus_present
    );

    Ok((RecordStore::new(records), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sku::SkuMaster;
    use std::io::Write;

    const EXPORT: &str = "\
Reject datetime,Source,Reject reason,Lpn,Sku,Log text
2025-01-10 08:15:00,EOL01,Height out of tolerance,LPN1,1001.0,ok
garbage,IBC01_SHAPE,Duplicated LPN detected,,2002,
2026-03-01 10:00:00,,,LPN3,nan,note
";

    #[test]
    fn cleans_rows_and_resolves_skus() {
        let master = SkuMaster::from_pairs([("1001", "Aquafina 24pk")]);
        let (store, report) = load_from_reader(EXPORT.as_bytes(), &master).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.invalid_timestamps, 1);
        assert_eq!(report.unknown_periods, 2);
        assert_eq!(report.skus_resolved, 1);
        assert_eq!(report.skus_present, 2);

        let recs = store.records();
        assert_eq!(recs[0].sku, "Aquafina 24pk");
        assert_eq!(recs[0].period(), "Period 1");
        assert_eq!(recs[1].reject_datetime, None);
        assert_eq!(recs[1].lpn, "Unknown");
        assert_eq!(recs[1].sku, "2002");
        assert_eq!(recs[2].source, "Unknown");
        assert_eq!(recs[2].reject_reason, "Unknown");
        assert_eq!(recs[2].sku, "Unknown");
        assert!(recs.iter().all(|r| r.quantity == 1));
    }

    #[test]
    fn missing_required_columns_is_an_error() {
        let data = "Reject datetime,Lpn\n2025-01-10,LPN1\n";
        let err = load_from_reader(data.as_bytes(), &SkuMaster::default()).unwrap_err();
        match err {
            LoadError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["Source".to_string(), "Reject reason".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn padded_headers_still_map_to_fields() {
        let data = "Reject datetime, Source , Reject reason\n2025-01-10 08:00:00,EOL01,Height out of tolerance\n";
        let (store, _) = load_from_reader(data.as_bytes(), &SkuMaster::default()).unwrap();
        let rec = &store.records()[0];
        assert_eq!(rec.source, "EOL01");
        assert_eq!(rec.reject_reason, "Height out of tolerance");
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let data = "Reject datetime,Source,Reject reason\n2025-02-01 00:00:00,EOL02,Label missing\n";
        let (store, _) = load_from_reader(data.as_bytes(), &SkuMaster::default()).unwrap();
        assert_eq!(store.records()[0].sku, "Unknown");
        assert_eq!(store.records()[0].log_text, "Unknown");
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();
        file.flush().unwrap();
        let (store, _) = load_and_clean(file.path(), &SkuMaster::default()).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn unopenable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_and_clean(&dir.path().join("missing.csv"), &SkuMaster::default());
        assert!(matches!(err, Err(LoadError::Open { .. })));
    }
}
