use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};

use super::RecordStore;
use crate::errors::{PanelError, PanelResult};
use crate::models::Sheet;

#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordStore for CsvStore {
    fn read_all(&self) -> PanelResult<Sheet> {
        let file = fs::File::open(&self.path).map_err(|error| {
            PanelError::SourceUnavailable(format!("cannot open {}: {error}", self.path.display()))
        })?;
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);

        let columns = reader
            .headers()
            .map_err(map_csv_error)?
            .iter()
            .map(ToString::to_string)
            .collect();
        let mut sheet = Sheet::new(columns);
        for record in reader.records() {
            let record = record.map_err(map_csv_error)?;
            sheet
                .rows
                .push(record.iter().map(ToString::to_string).collect());
        }
        Ok(sheet)
    }

    fn write_all(&self, sheet: &Sheet) -> PanelResult<()> {
        if sheet.columns.is_empty() {
            return Err(PanelError::SourceRejected(
                "refusing to write a sheet with no columns".to_string(),
            ));
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Writes land in a sibling temp file that a rename swaps in; a
        // failure anywhere along the way must not leave that file behind.
        let tmp_path = self.path.with_extension("tmp");
        if let Err(error) = write_sheet(&tmp_path, sheet)
            .and_then(|()| Ok(fs::rename(&tmp_path, &self.path)?))
        {
            let _ = fs::remove_file(&tmp_path);
            return Err(error);
        }
        Ok(())
    }
}

fn write_sheet(path: &Path, sheet: &Sheet) -> PanelResult<()> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(map_csv_error)?;
    writer.write_record(&sheet.columns).map_err(map_csv_error)?;
    for row in &sheet.rows {
        writer.write_record(row).map_err(map_csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

fn map_csv_error(error: csv::Error) -> PanelError {
    if error.is_io_error() {
        PanelError::SourceUnavailable(error.to_string())
    } else {
        PanelError::SourceRejected(error.to_string())
    }
}
