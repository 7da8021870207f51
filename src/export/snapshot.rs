//! Snapshot file holding a complete assigned cell table.
//!
//! Snapshots are written to a sibling temp file, synced, and renamed over
//! the target so a reader never sees a partial table.

#[cfg(feature = "snapshot")]
use crate::error::ReefError;
use crate::error::Result;
use crate::table::{AssignedCells, CellRecord};
use std::fs::{File, OpenOptions};
#[cfg(feature = "snapshot")]
use std::io::Read;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "snapshot")]
const SNAPSHOT_MAGIC: &[u8] = b"REEFMATCH_CELLS";
#[cfg(feature = "snapshot")]
const SNAPSHOT_VERSION: u8 = 1;

/// On-disk encoding of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotFormat {
    /// Pretty-printed JSON array of cell records.
    #[default]
    Json,
    /// Magic header, version byte, then bincode-encoded records.
    #[cfg(feature = "snapshot")]
    Binary,
}

pub struct CellTableFile {
    path: PathBuf,
    format: SnapshotFormat,
}

impl CellTableFile {
    pub fn new<P: AsRef<Path>>(path: P, format: SnapshotFormat) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
        }
    }

    pub fn json<P: AsRef<Path>>(path: P) -> Self {
        Self::new(path, SnapshotFormat::Json)
    }

    #[cfg(feature = "snapshot")]
    pub fn binary<P: AsRef<Path>>(path: P) -> Self {
        Self::new(path, SnapshotFormat::Binary)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> SnapshotFormat {
        self.format
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the table back. Returns `None` if the file is missing or empty.
    pub fn load(&self) -> Result<Option<AssignedCells>> {
        if !self.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        if file.metadata()?.len() == 0 {
            return Ok(None);
        }

        let mut reader = BufReader::new(file);
        let records: Vec<CellRecord> = match self.format {
            SnapshotFormat::Json => serde_json::from_reader(reader)?,
            #[cfg(feature = "snapshot")]
            SnapshotFormat::Binary => {
                let mut magic = vec![0u8; SNAPSHOT_MAGIC.len()];
                reader.read_exact(&mut magic)?;
                if magic != SNAPSHOT_MAGIC {
                    return Err(ReefError::InvalidFormat);
                }

                let mut version = [0u8; 1];
                reader.read_exact(&mut version)?;
                if version[0] != SNAPSHOT_VERSION {
                    return Err(ReefError::InvalidFormat);
                }

                let mut payload = Vec::new();
                reader.read_to_end(&mut payload)?;
                bincode::deserialize(&payload)?
            }
        };

        let table = AssignedCells::from_records(&records)?;
        log::debug!("Loaded {} cells from {}", table.len(), self.path.display());
        Ok(Some(table))
    }

    /// Atomically replace the file with `table`.
    ///
    /// On failure the previous file is left as it was and the temp file is
    /// removed.
    pub fn save(&self, table: &AssignedCells) -> Result<()> {
        let records = table.records();
        let temp_path = self.temp_path();

        let written = self
            .write_temp(&temp_path, &records)
            .and_then(|()| std::fs::rename(&temp_path, &self.path).map_err(Into::into));
        if let Err(e) = written {
            if let Err(cleanup) = std::fs::remove_file(&temp_path) {
                log::warn!(
                    "Failed to remove {} after a failed save: {}",
                    temp_path.display(),
                    cleanup
                );
            }
            return Err(e);
        }
        self.sync_parent_dir()?;

        log::debug!("Wrote {} cells to {}", records.len(), self.path.display());
        Ok(())
    }

    fn write_temp(&self, temp_path: &Path, records: &[CellRecord]) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;

        let mut writer = BufWriter::new(file);

        match self.format {
            SnapshotFormat::Json => serde_json::to_writer_pretty(&mut writer, records)?,
            #[cfg(feature = "snapshot")]
            SnapshotFormat::Binary => {
                writer.write_all(SNAPSHOT_MAGIC)?;
                writer.write_all(&[SNAPSHOT_VERSION])?;
                let payload = bincode::serialize(records)?;
                writer.write_all(&payload)?;
            }
        }

        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        if let Some(name) = temp.file_name() {
            let mut new_name = name.to_string_lossy().into_owned();
            new_name.push_str(".tmp");
            temp.set_file_name(new_name);
        }
        temp
    }

    fn sync_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
        Ok(())
    }
}
