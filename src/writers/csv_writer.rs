use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ProcessingError, Result};
use crate::models::ClassifiedRecord;
use crate::processors::Dataset;
use crate::utils::constants::{TEST_FILE, TRAINING_FILE};

/// Writes classified records as delimited text with a header row
pub struct ClassifiedRecordWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ClassifiedRecordWriter<W> {
    pub fn new(output: W, delimiter: u8) -> Result<Self> {
        if delimiter != b',' && delimiter != b'\t' {
            return Err(ProcessingError::Config(format!(
                "unsupported output delimiter {:?}",
                delimiter as char
            )));
        }
        let writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_writer(output);
        Ok(Self { writer })
    }

    pub fn write(&mut self, record: &ClassifiedRecord) -> Result<()> {
        self.writer.serialize(record)?;
        Ok(())
    }

    pub fn write_all<'a, I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a ClassifiedRecord>,
    {
        let mut written = 0;
        for record in records {
            self.write(record)?;
            written += 1;
        }
        Ok(written)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| ProcessingError::Io(e.into_error()))
    }
}

impl ClassifiedRecordWriter<File> {
    pub fn create(path: &Path, delimiter: u8) -> Result<Self> {
        Self::new(File::create(path)?, delimiter)
    }
}

/// Paths of the files written for a dataset
#[derive(Debug, Clone)]
pub struct DatasetFiles {
    pub training: PathBuf,
    pub test: PathBuf,
}

/// Write `training.csv` and `test.csv` into `dir`, replacing earlier files
pub fn write_dataset(dataset: &Dataset, dir: &Path, delimiter: u8) -> Result<DatasetFiles> {
    fs::create_dir_all(dir)?;

    let files = DatasetFiles {
        training: dir.join(TRAINING_FILE),
        test: dir.join(TEST_FILE),
    };

    for (path, records) in [(&files.training, &dataset.training), (&files.test, &dataset.test)] {
        let mut writer = ClassifiedRecordWriter::create(path, delimiter)?;
        writer.write_all(records)?;
        writer.flush()?;
    }

    Ok(files)
}
