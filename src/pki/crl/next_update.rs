//! CRL freshness: reading the `nextUpdate` field and keeping the earliest one.
//!
//! The field is read straight from the DER `TBSCertList`:
//!
//! ```text
//! TBSCertList ::= SEQUENCE {
//!     version              Version OPTIONAL,
//!     signature            AlgorithmIdentifier,
//!     issuer               Name,
//!     thisUpdate           Time,
//!     nextUpdate           Time OPTIONAL,
//!     ...
//! }
//! ```
//!
//! Only `UTCTime` is understood, so dates are limited to 2000-2099.

use asn1_rs::{Any, FromDer, Tag};
use chrono::{DateTime, TimeZone, Utc};
use x509_parser::pem::Pem;

use super::errors::{CrlError, CrlResult};

const FIELD_LEN: usize = 12;

/// Parse a `YYMMDDHHMMSS` next-update field as a UTC timestamp in 20xx.
pub fn parse_crl_date(field: &str) -> CrlResult<DateTime<Utc>> {
    if field.len() != FIELD_LEN || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CrlError::InvalidDate(field.to_string()));
    }

    // all ASCII digits, so every two-byte slice parses
    let pair = |at: usize| -> u32 { field[at..at + 2].parse().unwrap_or_default() };

    let year = 2000 + pair(0) as i32;
    Utc.with_ymd_and_hms(year, pair(2), pair(4), pair(6), pair(8), pair(10))
        .single()
        .ok_or_else(|| CrlError::InvalidDate(field.to_string()))
}

/// Raw `YYMMDDHHMMSS` value of the `nextUpdate` field of a DER CRL.
pub fn next_update_field(der: &[u8]) -> CrlResult<String> {
    let (_, cert_list) = Any::from_der(der).map_err(|e| CrlError::Malformed(e.to_string()))?;
    let (_, tbs) =
        Any::from_der(cert_list.data).map_err(|e| CrlError::Malformed(e.to_string()))?;

    // thisUpdate is the first Time element, nextUpdate the optional second one
    let mut times = Vec::with_capacity(2);
    let mut rest = tbs.data;
    while !rest.is_empty() && times.len() < 2 {
        let (remaining, element) =
            Any::from_der(rest).map_err(|e| CrlError::Malformed(e.to_string()))?;
        rest = remaining;

        let tag = element.header.tag();
        if tag == Tag::UtcTime || tag == Tag::GeneralizedTime {
            times.push(element);
        } else if !times.is_empty() {
            // the element after thisUpdate is not a Time
            break;
        }
    }

    let next_update = times.get(1).ok_or(CrlError::MissingNextUpdate)?;
    let text = std::str::from_utf8(next_update.data)
        .map_err(|e| CrlError::Malformed(e.to_string()))?;

    if next_update.header.tag() == Tag::GeneralizedTime {
        return Err(CrlError::UnsupportedTimeFormat(text.to_string()));
    }

    Ok(text.trim_end_matches('Z').to_string())
}

/// Next-update timestamp of a PEM encoded CRL.
pub fn next_update_from_pem(pem_crl: &str) -> CrlResult<DateTime<Utc>> {
    let block = Pem::iter_from_buffer(pem_crl.as_bytes())
        .next()
        .ok_or_else(|| CrlError::Pem("no PEM block found".to_string()))?
        .map_err(|e| CrlError::Pem(e.to_string()))?;

    parse_crl_date(&next_update_field(&block.contents)?)
}

/// Keep the earlier of the running minimum and a candidate.
pub fn earliest(current: Option<DateTime<Utc>>, candidate: DateTime<Utc>) -> DateTime<Utc> {
    match current {
        Some(current) if current <= candidate => current,
        _ => candidate,
    }
}

/// Fold the next-update of `pem_crl` into the running minimum.
pub fn shortest_next_update(
    current: Option<DateTime<Utc>>,
    pem_crl: &str,
) -> CrlResult<DateTime<Utc>> {
    Ok(earliest(current, next_update_from_pem(pem_crl)?))
}
