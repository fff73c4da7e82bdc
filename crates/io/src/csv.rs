// Semicolon-delimited export of purchase records

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use salesgrid_engine::{PurchaseRecord, SalesError};

pub const HEADER: [&str; 4] = ["Customer", "Age", "Item", "Quantity"];
pub const DELIMITER: u8 = b';';

/// Render records as CSV bytes: header row, then one row per record.
/// Quantities are whole numbers; the output depends only on the records.
pub fn to_csv_bytes(records: &[PurchaseRecord]) -> Result<Vec<u8>, SalesError> {
    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADER).map_err(|e| SalesError::Io(e.to_string()))?;
    for r in records {
        writer
            .write_record([
                r.customer_id.to_string(),
                r.age.to_string(),
                r.item_name.clone(),
                r.total_quantity.to_string(),
            ])
            .map_err(|e| SalesError::Io(e.to_string()))?;
    }
    writer.into_inner().map_err(|e| SalesError::Io(e.to_string()))
}

/// Write records to `path` via a sibling temp file and a rename, so a
/// failed write never leaves a truncated file at `path`.
pub fn write_purchases(path: &Path, records: &[PurchaseRecord]) -> Result<(), SalesError> {
    write_purchase_files(&[(path, records)])
}

/// Write several exports as one unit. Every file is staged next to its
/// target and renamed into place only after all staged writes succeeded.
/// On any failure the staged files and the targets already renamed are
/// removed.
pub fn write_purchase_files(files: &[(&Path, &[PurchaseRecord])]) -> Result<(), SalesError> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());
    for &(path, records) in files {
        let tmp = temp_path(path);
        let written = to_csv_bytes(records).and_then(|bytes| {
            fs::write(&tmp, bytes).map_err(|e| SalesError::Io(format!("cannot write {}: {e}", path.display())))
        });
        if let Err(e) = written {
            discard(std::iter::once(tmp.as_path()));
            discard(staged.iter().map(|(tmp, _)| tmp.as_path()));
            return Err(e);
        }
        staged.push((tmp, path));
    }

    for (idx, (tmp, path)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(tmp, path) {
            discard(staged[..idx].iter().map(|&(_, path)| path));
            discard(staged[idx..].iter().map(|(tmp, _)| tmp.as_path()));
            return Err(SalesError::Io(format!("cannot write {}: {e}", path.display())));
        }
    }

    for &(path, records) in files {
        log::info!("wrote {} records to {}", records.len(), path.display());
    }
    Ok(())
}

fn discard<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            log::debug!("cleanup of {} skipped: {e}", path.display());
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export.csv".into());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Read a file previously produced by [`write_purchases`].
pub fn read_purchases(path: &Path) -> Result<Vec<PurchaseRecord>, SalesError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .from_path(path)
        .map_err(|e| SalesError::Io(format!("cannot read {}: {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| SalesError::Io(format!("{}: {e}", path.display())))?
        .clone();
    if headers.iter().ne(HEADER.iter().copied()) {
        return Err(SalesError::Io(format!(
            "{}: expected header '{}', found '{}'",
            path.display(),
            HEADER.join(";"),
            headers.iter().collect::<Vec<_>>().join(";")
        )));
    }

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // header is line 1
        let line = idx + 2;
        let record = result.map_err(|e| SalesError::Io(format!("{}: {e}", path.display())))?;
        let field = |i: usize| record.get(i).unwrap_or("");
        let number = |i: usize| -> Result<i64, SalesError> {
            field(i).trim().parse::<i64>().map_err(|_| {
                SalesError::Io(format!(
                    "{}:{line}: {} is not a whole number: '{}'",
                    path.display(),
                    HEADER[i],
                    field(i)
                ))
            })
        };
        records.push(PurchaseRecord {
            customer_id: number(0)?,
            age: number(1)?,
            item_name: field(2).to_string(),
            total_quantity: number(3)?,
        });
    }
    Ok(records)
}

/// SHA-256 of a file, lowercase hex.
pub fn fingerprint(path: &Path) -> Result<String, SalesError> {
    let bytes = fs::read(path).map_err(|e| SalesError::Io(format!("cannot read {}: {e}", path.display())))?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<PurchaseRecord> {
        vec![
            PurchaseRecord::new(1, 21, "x", 10),
            PurchaseRecord::new(2, 23, "semi;colon", 1),
        ]
    }

    #[test]
    fn header_and_rows() {
        let text = String::from_utf8(to_csv_bytes(&sample()).unwrap()).unwrap();
        assert_eq!(text, "Customer;Age;Item;Quantity\n1;21;x;10\n2;23;\"semi;colon\";1\n");
    }

    #[test]
    fn empty_result_still_has_header() {
        let text = String::from_utf8(to_csv_bytes(&[]).unwrap()).unwrap();
        assert_eq!(text, "Customer;Age;Item;Quantity\n");
    }

    #[test]
    fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_purchases(&path, &sample()).unwrap();
        assert_eq!(read_purchases(&path).unwrap(), sample());
        assert!(!dir.path().join(".out.csv.tmp").exists());
    }

    #[test]
    fn rewriting_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_purchases(&path, &sample()).unwrap();
        let first = fingerprint(&path).unwrap();
        write_purchases(&path, &sample()).unwrap();
        assert_eq!(first, fingerprint(&path).unwrap());
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn write_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_purchases(&path, &sample()).unwrap_err();
        assert!(matches!(err, SalesError::Io(_)));
        assert!(!path.exists());
    }

    #[test]
    fn file_set_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("sql_a.csv");
        let second = dir.path().join("frame_a.csv");
        // a directory in the way makes the second rename fail
        fs::create_dir(&second).unwrap();

        let records = sample();
        let err = write_purchase_files(&[(first.as_path(), records.as_slice()), (second.as_path(), records.as_slice())])
            .unwrap_err();

        assert!(matches!(err, SalesError::Io(_)), "{err:?}");
        assert!(!first.exists());
        assert!(!dir.path().join(".sql_a.csv.tmp").exists());
        assert!(!dir.path().join(".frame_a.csv.tmp").exists());
    }

    #[test]
    fn file_set_writes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("sql_a.csv");
        let second = dir.path().join("frame_a.csv");
        let records = sample();
        let none: Vec<PurchaseRecord> = Vec::new();
        write_purchase_files(&[(first.as_path(), records.as_slice()), (second.as_path(), none.as_slice())]).unwrap();
        assert_eq!(read_purchases(&first).unwrap(), records);
        assert!(read_purchases(&second).unwrap().is_empty());
    }

    #[test]
    fn read_rejects_wrong_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "a;b;c;d\n1;2;x;3\n").unwrap();
        assert!(matches!(read_purchases(&path), Err(SalesError::Io(_))));
    }

    #[test]
    fn read_rejects_decimal_quantity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dec.csv");
        fs::write(&path, "Customer;Age;Item;Quantity\n1;21;x;10.0\n").unwrap();
        let err = read_purchases(&path).unwrap_err().to_string();
        assert!(err.contains(":2: Quantity"), "{err}");
    }
}
