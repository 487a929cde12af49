//! `--from` / `--to` parsing into a `TimeWindow`.

use chorus_core::timeline::TimeWindow;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};

/// Which end of the window a bare date bounds.
#[derive(Clone, Copy, Debug)]
enum Edge {
    Start,
    End,
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date. A date used as the
/// upper bound covers the whole day.
fn parse_bound(raw: &str, edge: Edge, flag: &str) -> anyhow::Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        anyhow::anyhow!("invalid {flag} '{raw}': expected RFC 3339 timestamp or YYYY-MM-DD")
    })?;
    let at = match edge {
        Edge::Start => date.and_time(NaiveTime::MIN),
        Edge::End => date
            .checked_add_days(Days::new(1))
            .map(|next| next.and_time(NaiveTime::MIN) - chrono::Duration::microseconds(1))
            .ok_or_else(|| anyhow::anyhow!("invalid {flag} '{raw}': date out of range"))?,
    };
    Ok(at.and_utc())
}

/// Build a window from optional CLI bounds.
pub fn parse_window(from: Option<&str>, to: Option<&str>) -> anyhow::Result<TimeWindow> {
    let from = from
        .map(|raw| parse_bound(raw, Edge::Start, "--from"))
        .transpose()?;
    let to = to.map(|raw| parse_bound(raw, Edge::End, "--to")).transpose()?;
    Ok(TimeWindow::new(from, to)?)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[rstest]
    #[case(Some("2026-03-01"), None, Some("2026-03-01T00:00:00Z"), None)]
    #[case(None, Some("2026-03-01"), None, Some("2026-03-01T23:59:59.999999Z"))]
    #[case(
        Some("2026-03-01T10:00:00+02:00"),
        Some("2026-03-01T09:30:00Z"),
        Some("2026-03-01T08:00:00Z"),
        Some("2026-03-01T09:30:00Z")
    )]
    fn parses_bounds(
        #[case] from: Option<&str>,
        #[case] to: Option<&str>,
        #[case] want_from: Option<&str>,
        #[case] want_to: Option<&str>,
    ) {
        let window = parse_window(from, to).unwrap();
        assert_eq!(window.from, want_from.map(utc));
        assert_eq!(window.to, want_to.map(utc));
    }

    #[test]
    fn same_day_window_is_valid() {
        let window = parse_window(Some("2026-03-01"), Some("2026-03-01")).unwrap();
        assert!(window.contains(utc("2026-03-01T23:00:00Z")));
    }

    #[test]
    fn inverted_window_is_rejected() {
        assert!(parse_window(Some("2026-03-02"), Some("2026-03-01")).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let err = parse_window(Some("yesterday"), None).unwrap_err();
        assert!(err.to_string().contains("--from"));
    }
}
