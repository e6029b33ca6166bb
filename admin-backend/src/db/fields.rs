//! Lenient field readers over raw BSON documents.
//!
//! The upstream application writes these documents without a fixed schema:
//! timestamps show up as BSON dates or strings, amounts as any numeric type,
//! and most fields can be missing. Readers return `None` (or zero/false)
//! instead of failing.

use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::{Bson, Document};

/// Resolve a dotted path such as `subscription.status`.
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

pub fn get_str<'a>(doc: &'a Document, path: &str) -> Option<&'a str> {
    match lookup(doc, path)? {
        Bson::String(s) => Some(s.as_str()),
        _ => None,
    }
}

/// True only for a stored boolean `true`.
pub fn is_true(doc: &Document, path: &str) -> bool {
    matches!(lookup(doc, path), Some(Bson::Boolean(true)))
}

/// True only for a stored boolean `false`; a missing field is neither.
pub fn is_false(doc: &Document, path: &str) -> bool {
    matches!(lookup(doc, path), Some(Bson::Boolean(false)))
}

/// Loose presence check: null, false, zero and empty strings count as unset.
pub fn is_truthy(doc: &Document, path: &str) -> bool {
    match lookup(doc, path) {
        None | Some(Bson::Null) | Some(Bson::Undefined) => false,
        Some(Bson::Boolean(b)) => *b,
        Some(Bson::String(s)) => !s.is_empty(),
        Some(Bson::Int32(v)) => *v != 0,
        Some(Bson::Int64(v)) => *v != 0,
        Some(Bson::Double(v)) => *v != 0.0 && !v.is_nan(),
        Some(_) => true,
    }
}

pub fn get_f64(doc: &Document, path: &str) -> Option<f64> {
    lookup(doc, path).and_then(bson_f64)
}

/// Numeric value for sums; anything missing or non-numeric is 0.
pub fn number_or_zero(doc: &Document, path: &str) -> f64 {
    get_f64(doc, path).unwrap_or(0.0)
}

pub fn bson_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) if v.is_finite() => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Decimal128(d) => d.to_string().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

pub fn get_datetime(doc: &Document, path: &str) -> Option<DateTime<Utc>> {
    lookup(doc, path).and_then(bson_datetime)
}

/// First timestamp found among `paths`, in order.
pub fn first_datetime(doc: &Document, paths: &[&str]) -> Option<DateTime<Utc>> {
    paths.iter().find_map(|path| get_datetime(doc, path))
}

pub fn bson_datetime(value: &Bson) -> Option<DateTime<Utc>> {
    match value {
        Bson::DateTime(dt) => DateTime::from_timestamp_millis(dt.timestamp_millis()),
        Bson::String(s) => parse_timestamp(s),
        _ => None,
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (taken as UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mongodb::bson::{doc, Decimal128};

    #[test]
    fn test_lookup_nested_path() {
        let user = doc! { "subscription": { "status": "active", "plan": { "tier": "pro" } } };
        assert_eq!(get_str(&user, "subscription.status"), Some("active"));
        assert_eq!(get_str(&user, "subscription.plan.tier"), Some("pro"));
        assert!(lookup(&user, "subscription.missing").is_none());
        assert!(lookup(&user, "subscription.status.deeper").is_none());
    }

    #[test]
    fn test_booleans_are_strict() {
        let call = doc! { "isInbound": true, "flag": "true", "off": false };
        assert!(is_true(&call, "isInbound"));
        assert!(!is_true(&call, "flag"));
        assert!(is_false(&call, "off"));
        assert!(!is_false(&call, "missing"));
    }

    #[test]
    fn test_truthiness() {
        let list = doc! {
            "a": { "lastUsed": "2025-01-01" },
            "b": { "lastUsed": null },
            "c": { "lastUsed": "" },
            "d": { "lastUsed": 0 },
            "e": { "lastUsed": mongodb::bson::DateTime::now() },
        };
        assert!(is_truthy(&list, "a.lastUsed"));
        assert!(!is_truthy(&list, "b.lastUsed"));
        assert!(!is_truthy(&list, "c.lastUsed"));
        assert!(!is_truthy(&list, "d.lastUsed"));
        assert!(is_truthy(&list, "e.lastUsed"));
        assert!(!is_truthy(&list, "z.lastUsed"));
    }

    #[test]
    fn test_numbers_coerce() {
        let d = doc! {
            "i32": 5_i32,
            "i64": 7_i64,
            "f": 2.5,
            "nan": f64::NAN,
            "s": "12",
            "dec": "3.25".parse::<Decimal128>().unwrap(),
        };
        assert_eq!(get_f64(&d, "i32"), Some(5.0));
        assert_eq!(get_f64(&d, "i64"), Some(7.0));
        assert_eq!(get_f64(&d, "f"), Some(2.5));
        assert_eq!(get_f64(&d, "nan"), None);
        assert_eq!(get_f64(&d, "s"), None);
        assert_eq!(get_f64(&d, "dec"), Some(3.25));
        assert_eq!(number_or_zero(&d, "missing"), 0.0);
    }

    #[test]
    fn test_datetimes_from_bson_and_strings() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let d = doc! {
            "bson": mongodb::bson::DateTime::from_millis(expected.timestamp_millis()),
            "rfc": "2025-03-04T05:06:07.000Z",
            "offset": "2025-03-04T07:06:07+02:00",
            "day": "2025-03-04",
            "junk": "yesterday",
            "num": 12,
        };
        assert_eq!(get_datetime(&d, "bson"), Some(expected));
        assert_eq!(get_datetime(&d, "rfc"), Some(expected));
        assert_eq!(get_datetime(&d, "offset"), Some(expected));
        assert_eq!(
            get_datetime(&d, "day"),
            Some(Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap())
        );
        assert_eq!(get_datetime(&d, "junk"), None);
        assert_eq!(get_datetime(&d, "num"), None);
    }

    #[test]
    fn test_first_datetime_falls_back() {
        let call = doc! { "startedAt": "2025-01-02T00:00:00Z" };
        let found = first_datetime(&call, &["createdAt", "startedAt"]);
        assert_eq!(found, Some(Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap()));
    }
}
