//! CIM UUID normalization
//!
//! CIMXML documents reference master resource identifiers as UUIDs in
//! `rdf:about`, `rdf:ID`, and `rdf:resource` values, prefixed with `_`. The
//! canonical subject IRI is `urn:uuid:<lower-case-dashed-uuid>`; upper-case
//! and dashless spellings are repaired with a warning.

use once_cell::sync::Lazy;
use regex::Regex;

static UUID_DASHED: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .unwrap_or_else(|e| panic!("invalid UUID pattern: {e}"))
});

static UUID_PLAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[0-9a-f]{32}$").unwrap_or_else(|e| panic!("invalid UUID pattern: {e}"))
});

const URN_UUID: &str = "urn:uuid:";

/// How a UUID candidate normalized.
#[derive(Debug, PartialEq, Eq)]
pub enum CimUuid {
    /// Already canonical; `iri` is `urn:uuid:<uuid>`.
    Canonical(String),
    /// Canonicalized with a repair the caller should warn about.
    Fixed {
        /// The canonical `urn:uuid:` IRI.
        iri: String,
        /// What was repaired.
        note: String,
    },
    /// Not a CIM UUID; fall back to ordinary IRI resolution.
    NotAUuid,
}

/// Normalize a UUID candidate (the part after `#_` or `_`).
pub fn normalize_cim_uuid(part: &str) -> CimUuid {
    match part.len() {
        36 => {
            if UUID_DASHED.is_match(part) {
                return CimUuid::Canonical(format!("{URN_UUID}{part}"));
            }
            let lower = part.to_lowercase();
            if UUID_DASHED.is_match(&lower) {
                return CimUuid::Fixed {
                    iri: format!("{URN_UUID}{lower}"),
                    note: format!(
                        "CIM UUID with upper case letters: '{part}' - converted to lower case form"
                    ),
                };
            }
            CimUuid::NotAUuid
        }
        32 => {
            if UUID_PLAIN.is_match(part) {
                return CimUuid::Fixed {
                    iri: dashed(part),
                    note: format!("CIM UUID without dashes: '{part}' - converted to dashed form"),
                };
            }
            let lower = part.to_lowercase();
            if UUID_PLAIN.is_match(&lower) {
                return CimUuid::Fixed {
                    iri: dashed(&lower),
                    note: format!(
                        "CIM UUID with upper case letters and without dashes: '{part}' - converted to lower case dashed form"
                    ),
                };
            }
            CimUuid::NotAUuid
        }
        _ => CimUuid::NotAUuid,
    }
}

fn dashed(plain: &str) -> String {
    format!(
        "{URN_UUID}{}-{}-{}-{}-{}",
        &plain[0..8],
        &plain[8..12],
        &plain[12..16],
        &plain[16..20],
        &plain[20..32]
    )
}
