//! Bookkeeping values in the meta database.

use lumeos_types::PollId;

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

const NEXT_POLL_ID_KEY: &[u8] = b"next_poll_id";
const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

fn read_u64(bytes: &[u8], key: &str) -> Result<u64, LmdbError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Corruption(format!("meta key '{key}' is {} bytes", bytes.len())))?;
    Ok(u64::from_be_bytes(raw))
}

impl LmdbEnvironment {
    /// Hand out the next poll id and advance the stored counter in one
    /// write transaction.
    pub(crate) fn reserve_poll_id(&self) -> Result<PollId, LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        let current = match self.meta_db.get(&wtxn, NEXT_POLL_ID_KEY)? {
            Some(bytes) => PollId::new(read_u64(bytes, "next_poll_id")?),
            None => PollId::FIRST,
        };
        let next = current
            .checked_next()
            .ok_or_else(|| LmdbError::Corruption("poll id counter exhausted".into()))?;
        self.meta_db
            .put(&mut wtxn, NEXT_POLL_ID_KEY, &next.value().to_be_bytes())?;
        wtxn.commit()?;
        Ok(current)
    }

    /// The id the next creation would get, without reserving it.
    pub fn peek_next_poll_id(&self) -> Result<PollId, LmdbError> {
        let rtxn = self.env.read_txn()?;
        match self.meta_db.get(&rtxn, NEXT_POLL_ID_KEY)? {
            Some(bytes) => Ok(PollId::new(read_u64(bytes, "next_poll_id")?)),
            None => Ok(PollId::FIRST),
        }
    }

    /// Stored schema version; 0 for a fresh environment.
    pub fn schema_version(&self) -> Result<u32, LmdbError> {
        let rtxn = self.env.read_txn()?;
        match self.meta_db.get(&rtxn, SCHEMA_VERSION_KEY)? {
            Some(bytes) => {
                let raw: [u8; 4] = bytes.try_into().map_err(|_| {
                    LmdbError::Corruption(format!("schema_version is {} bytes", bytes.len()))
                })?;
                Ok(u32::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }

    pub(crate) fn set_schema_version(&self, version: u32) -> Result<(), LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        self.meta_db
            .put(&mut wtxn, SCHEMA_VERSION_KEY, &version.to_be_bytes())?;
        wtxn.commit()?;
        Ok(())
    }
}
