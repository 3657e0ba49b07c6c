// 🔑 Deterministic ID Assigner
//
// Records the source does not key get a surrogate id derived from a natural
// key. The key is encoded canonically (kind tag + length-prefixed fields)
// and hashed with SHA-256, so the id is stable across runs, processes and
// platforms.
//
// Known limitation: no collision detection. The id space (2^31 - 1) is
// assumed large relative to record volume.

use sha2::{Digest, Sha256};

/// Ids are reduced into 1..=ID_RANGE so they fit a signed 32-bit column.
pub const ID_RANGE: u64 = 0x7FFF_FFFF;

// ============================================================================
// NATURAL KEYS
// ============================================================================

/// Kind-specific natural key for records without a native id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NaturalKey<'a> {
    /// Politician detail URL, for legislators missing a parliamentary id
    LegislatorUrl(&'a str),

    /// Bill detail URL, for motions missing a legislative id
    MotionUrl(&'a str),

    /// (legislator id, category, fiscal period)
    Spending {
        legislator_id: i64,
        category: &'a str,
        fiscal_period: &'a str,
    },

    /// (legislator id, registry type, filed date, details)
    Transparency {
        legislator_id: i64,
        registry_type: &'a str,
        filed_date: &'a str,
        details: &'a str,
    },
}

impl<'a> NaturalKey<'a> {
    fn tag(&self) -> &'static str {
        match self {
            NaturalKey::LegislatorUrl(_) => "legislator",
            NaturalKey::MotionUrl(_) => "motion",
            NaturalKey::Spending { .. } => "spending",
            NaturalKey::Transparency { .. } => "transparency",
        }
    }

    /// Canonical byte encoding: tag, then each field as
    /// `<u32 big-endian length><utf-8 bytes>`. Integers are rendered in decimal.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let fields: Vec<String> = match self {
            NaturalKey::LegislatorUrl(url) | NaturalKey::MotionUrl(url) => {
                vec![url.trim().to_string()]
            }
            NaturalKey::Spending {
                legislator_id,
                category,
                fiscal_period,
            } => vec![
                legislator_id.to_string(),
                category.to_string(),
                fiscal_period.to_string(),
            ],
            NaturalKey::Transparency {
                legislator_id,
                registry_type,
                filed_date,
                details,
            } => vec![
                legislator_id.to_string(),
                registry_type.to_string(),
                filed_date.to_string(),
                details.to_string(),
            ],
        };

        let mut bytes = Vec::new();
        push_field(&mut bytes, self.tag());
        for field in &fields {
            push_field(&mut bytes, field);
        }
        bytes
    }
}

fn push_field(bytes: &mut Vec<u8>, field: &str) {
    bytes.extend_from_slice(&(field.len() as u32).to_be_bytes());
    bytes.extend_from_slice(field.as_bytes());
}

// ============================================================================
// ASSIGNMENT
// ============================================================================

/// Stable surrogate id for a natural key, always in `1..=ID_RANGE`.
pub fn assign_id(key: &NaturalKey<'_>) -> i64 {
    let digest = Sha256::digest(key.canonical_bytes());

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let value = u64::from_be_bytes(prefix) % ID_RANGE;

    // 0 is never handed out
    (value as i64).max(1)
}
