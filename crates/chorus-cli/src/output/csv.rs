//! CSV rendering for timelines and export bundles.

use chorus_core::timeline::TimelineEvent;
use chrono::SecondsFormat;

/// Column order of a rendered timeline.
pub const EVENT_HEADERS: [&str; 2] = ["event_date_time", "description"];

/// Write a header row followed by `rows`. The header is emitted even when
/// there are no rows.
pub fn records_to_csv(headers: &[&str], rows: &[Vec<String>]) -> anyhow::Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|error| anyhow::anyhow!("failed to flush csv writer: {error}"))?;
    Ok(String::from_utf8(bytes)?)
}

/// `event_date_time,description` rows in timeline order.
pub fn events_to_csv(events: &[TimelineEvent]) -> anyhow::Result<String> {
    records_to_csv(&EVENT_HEADERS, &event_rows(events))
}

pub fn event_rows(events: &[TimelineEvent]) -> Vec<Vec<String>> {
    events
        .iter()
        .map(|event| {
            vec![
                event
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true),
                event.description.clone(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn events_csv_has_fixed_header_and_quotes_commas() {
        let events = vec![TimelineEvent {
            timestamp: DateTime::parse_from_rfc3339("2026-03-01T09:01:00Z")
                .unwrap()
                .with_timezone(&Utc),
            description: "Uploaded song 'Duet - Bo, Ann'".to_string(),
        }];
        let out = events_to_csv(&events).unwrap();
        assert_eq!(
            out,
            "event_date_time,description\n2026-03-01T09:01:00Z,\"Uploaded song 'Duet - Bo, Ann'\"\n"
        );
    }

    #[test]
    fn empty_rows_still_write_header() {
        let out = records_to_csv(&["song_title", "song_artist", "mark"], &[]).unwrap();
        assert_eq!(out, "song_title,song_artist,mark\n");
    }
}
