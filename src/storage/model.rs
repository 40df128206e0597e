//! Persisted model layout.
//!
//! A model is a named list of pools, each mapping tokens to counts. The
//! corpus is stored like any other pool under a reserved name. Two encodings
//! are supported:
//!
//! - binary: magic `BAYP`, format version, save timestamp, then per pool its
//!   name, token count and `(token, count)` pairs as varint-prefixed
//!   strings and varints, followed by a CRC32 of everything before it;
//! - JSON: [`ModelSnapshot`] as serialized by serde.
//!
//! Probabilities are never stored; they are recomputed from the counts.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use log::debug;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::{BayesError, Result};
use crate::storage::structured::{StructReader, StructWriter};

/// Magic bytes opening a binary model.
pub const MODEL_MAGIC: [u8; 4] = *b"BAYP";

/// Current model format version.
pub const MODEL_VERSION: u32 = 1;

/// Token counts of one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecord {
    pub name: String,
    #[serde(deserialize_with = "deserialize_unique_tokens")]
    pub tokens: BTreeMap<String, u64>,
}

/// Token counts where a repeated token is an error rather than an overwrite.
fn deserialize_unique_tokens<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TokenCountsVisitor;

    impl<'de> Visitor<'de> for TokenCountsVisitor {
        type Value = BTreeMap<String, u64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map from token to count")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut tokens = BTreeMap::new();
            while let Some((token, count)) = map.next_entry::<String, u64>()? {
                match tokens.entry(token) {
                    Entry::Occupied(entry) => {
                        return Err(de::Error::custom(format!(
                            "duplicate token '{}'",
                            entry.key()
                        )));
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(count);
                    }
                }
            }
            Ok(tokens)
        }
    }

    deserializer.deserialize_map(TokenCountsVisitor)
}

/// Everything a model file holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub pools: Vec<PoolRecord>,
}

impl ModelSnapshot {
    /// Create a snapshot stamped with the current time.
    pub fn new(pools: Vec<PoolRecord>) -> Self {
        ModelSnapshot {
            version: MODEL_VERSION,
            saved_at: Utc::now(),
            pools,
        }
    }

    /// Encode in the binary layout.
    pub fn write_binary<W: Write>(&self, writer: W) -> Result<W> {
        let mut writer = StructWriter::new(writer);
        writer.write_raw(&MODEL_MAGIC)?;
        writer.write_u32(self.version)?;
        writer.write_i64(self.saved_at.timestamp_millis())?;

        writer.write_varint(self.pools.len() as u64)?;
        for pool in &self.pools {
            writer.write_string(&pool.name)?;
            writer.write_varint(pool.tokens.len() as u64)?;
            for (token, &count) in &pool.tokens {
                writer.write_string(token)?;
                writer.write_varint(count)?;
            }
        }

        debug!("Encoded {} pools in {} bytes", self.pools.len(), writer.position());
        writer.finish()
    }

    /// Decode the binary layout, magic included.
    pub fn read_binary<R: Read>(reader: R) -> Result<Self> {
        let mut reader = StructReader::new(reader);

        let magic = reader.read_raw(MODEL_MAGIC.len() as u64)?;
        if magic != MODEL_MAGIC {
            return Err(BayesError::format("Invalid model magic number"));
        }

        let version = reader.read_u32()?;
        check_version(version)?;

        let millis = reader.read_i64()?;
        let saved_at = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| BayesError::format(format!("Invalid save timestamp: {millis}")))?;

        let pool_count = reader.read_varint()?;
        let mut pools = Vec::new();
        for _ in 0..pool_count {
            let name = reader.read_string()?;
            let token_count = reader.read_varint()?;
            let mut tokens = BTreeMap::new();
            for _ in 0..token_count {
                let token = reader.read_string()?;
                let count = reader.read_varint()?;
                if tokens.insert(token, count).is_some() {
                    return Err(BayesError::format(format!(
                        "Duplicate token in pool '{name}' at byte {}",
                        reader.position()
                    )));
                }
            }
            pools.push(PoolRecord { name, tokens });
        }

        reader.verify_checksum()?;

        Ok(ModelSnapshot {
            version,
            saved_at,
            pools,
        })
    }

    /// Encode as JSON.
    pub fn write_json<W: Write>(&self, mut writer: W, pretty: bool) -> Result<W> {
        if pretty {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            serde_json::to_writer(&mut writer, self)?;
        }
        writer.flush()?;
        Ok(writer)
    }

    /// Decode from JSON.
    pub fn read_json(bytes: &[u8]) -> Result<Self> {
        let snapshot: ModelSnapshot = serde_json::from_slice(bytes)
            .map_err(|e| BayesError::format(format!("Invalid JSON model: {e}")))?;
        check_version(snapshot.version)?;
        Ok(snapshot)
    }

    /// Decode either encoding, telling them apart by the magic bytes.
    pub fn read_any<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        if bytes.starts_with(&MODEL_MAGIC) {
            Self::read_binary(bytes.as_slice())
        } else if bytes.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{') {
            Self::read_json(&bytes)
        } else {
            Err(BayesError::format("Unrecognized model format"))
        }
    }
}

fn check_version(version: u32) -> Result<()> {
    if version != MODEL_VERSION {
        return Err(BayesError::format(format!(
            "Unsupported model version: {version}"
        )));
    }
    Ok(())
}
