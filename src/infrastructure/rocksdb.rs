use crate::domain::ports::PreferenceStore;
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding client preferences.
pub const CF_PREFERENCES: &str = "preferences";

/// A persistent preference store backed by RocksDB.
///
/// Values are stored as UTF-8 strings under their key. `Clone` shares the
/// underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBPreferenceStore {
    db: Arc<DB>,
}

impl RocksDBPreferenceStore {
    /// Opens or creates a RocksDB instance at `path`, creating the preferences column family.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf = ColumnFamilyDescriptor::new(CF_PREFERENCES, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn missing_cf() -> BookingError {
        BookingError::Io(std::io::Error::other(
            "Preferences column family not found",
        ))
    }
}

#[async_trait]
impl PreferenceStore for RocksDBPreferenceStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let cf = self
            .db
            .cf_handle(CF_PREFERENCES)
            .ok_or_else(Self::missing_cf)?;

        match self.db.get_cf(&cf, key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|e| {
                BookingError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("Stored preference is not UTF-8: {}", e),
                ))
            }),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        let cf = self
            .db
            .cf_handle(CF_PREFERENCES)
            .ok_or_else(Self::missing_cf)?;

        self.db.put_cf(&cf, key.as_bytes(), value.as_bytes())?;
        Ok(())
    }
}
