//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{Error, IdValidationError};

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidTimestamp,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Request field name, as the client spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: String, value: Option<&str>) -> Error {
    let details = match value {
        Some(value) => json!({ "field": field.as_str(), "value": value, "code": code.as_str() }),
        None => json!({ "field": field.as_str(), "code": code.as_str() }),
    };
    Error::invalid_request(message).with_details(details)
}

/// A field whose value the domain refused; `message` says why.
pub(crate) fn invalid_value_error(field: FieldName, message: impl std::fmt::Display) -> Error {
    field_error(field, ErrorCode::InvalidValue, message.to_string(), None)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let message = format!("{} must be a valid UUID", field.as_str());
    field_error(field, ErrorCode::InvalidUuid, message, Some(value))
}

/// Parse a typed identifier from a path or body field.
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = IdValidationError>,
{
    value.parse().map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_optional_id<T>(value: Option<&str>, field: FieldName) -> Result<Option<T>, Error>
where
    T: FromStr<Err = IdValidationError>,
{
    value.map(|raw| parse_id(raw, field)).transpose()
}

pub(crate) fn invalid_timestamp_error(field: FieldName, value: &str) -> Error {
    let message = format!("{} must be an RFC 3339 timestamp", field.as_str());
    field_error(field, ErrorCode::InvalidTimestamp, message, Some(value))
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|_| invalid_timestamp_error(field, raw))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainCode, ListingId};
    use rstest::rstest;
    use serde_json::Value;

    const LISTING: FieldName = FieldName::new("listingId");

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a str> {
        error.details().and_then(|d| d.get(key)).and_then(Value::as_str)
    }

    #[rstest]
    fn parses_valid_ids() {
        let id: ListingId =
            parse_id("3fa85f64-5717-4562-b3fc-2c963f66afa6", LISTING).expect("valid id");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    fn invalid_ids_name_the_field_and_value(#[case] raw: &str) {
        let err = parse_id::<ListingId>(raw, LISTING).expect_err("invalid id");

        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(err.message(), "listingId must be a valid UUID");
        assert_eq!(detail(&err, "field"), Some("listingId"));
        assert_eq!(detail(&err, "value"), Some(raw));
        assert_eq!(detail(&err, "code"), Some("invalid_uuid"));
    }

    #[rstest]
    fn optional_ids_pass_through_none() {
        let parsed = parse_optional_id::<ListingId>(None, LISTING).expect("none is fine");
        assert!(parsed.is_none());
    }

    #[rstest]
    fn timestamps_are_normalised_to_utc() {
        let field = FieldName::new("soldAt");
        let parsed = parse_optional_rfc3339_timestamp(Some("2024-09-02T12:00:00+02:00"), field)
            .expect("valid timestamp")
            .expect("present");
        assert_eq!(parsed.to_rfc3339(), "2024-09-02T10:00:00+00:00");

        let err = parse_optional_rfc3339_timestamp(Some("yesterday"), field)
            .expect_err("invalid timestamp");
        assert_eq!(detail(&err, "code"), Some("invalid_timestamp"));
    }
}
