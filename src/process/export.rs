use csv::{Writer, WriterBuilder};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::ExportError;
use crate::schema::{canonical_columns, CanonicalRecord};

/// Write a CSV next to `path` and rename it into place once complete, so a
/// reader never sees a half-written file. Parent directories are created.
pub fn write_csv_atomic<F>(path: &Path, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut Writer<BufWriter<&File>>) -> csv::Result<()>,
{
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(tmp.as_file()));
        write(&mut wtr).map_err(csv_err)?;
        wtr.flush().map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Write the processed artifact: canonical header, then one row per record.
#[tracing::instrument(level = "info", skip(records, path), fields(path = %path.as_ref().display()))]
pub fn export_csv<P: AsRef<Path>>(records: &[CanonicalRecord], path: P) -> Result<(), ExportError> {
    let path = path.as_ref();
    write_csv_atomic(path, |wtr| {
        wtr.write_record(canonical_columns())?;
        for record in records {
            wtr.serialize(record)?;
        }
        Ok(())
    })?;
    info!(rows = records.len(), "exported processed CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::record::fixtures::record;
    use tempfile::tempdir;

    #[test]
    fn writes_header_even_without_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("processed").join("empty.csv");
        export_csv(&[], &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let header: Vec<&str> = text.trim_end().split(',').collect();
        assert_eq!(header, canonical_columns().collect::<Vec<_>>());
    }

    #[test]
    fn overwrites_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale").unwrap();

        let rows = vec![record(1, "2023-01-05", "South", "Furniture", 10.0)];
        export_csv(&rows, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("row_id,order_id,order_date,"));
        assert!(text.contains("2023-01-05"));
        assert_eq!(text.lines().count(), 2);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
