use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Current UTC time as RFC 3339, falling back to unix seconds if formatting fails.
pub fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_parses_back() {
        let value = now_rfc3339();
        assert!(OffsetDateTime::parse(&value, &Rfc3339).is_ok());
    }
}
