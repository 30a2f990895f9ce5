use crate::duration::format_duration;
use chrono::{DateTime, TimeDelta, Utc};

const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S UTC";

pub struct UserLine {
    pub marker: String,
    pub name: String,
    pub elapsed: TimeDelta,
}

/// 상태 메시지 한 장에 들어갈 내용
pub struct Snapshot {
    pub users: Vec<UserLine>,
    pub session_start: DateTime<Utc>,
    pub session_end: Option<DateTime<Utc>>,
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn render(snapshot: &Snapshot) -> String {
    let mut lines: Vec<String> = snapshot
        .users
        .iter()
        .map(|line| format!("{} {}: {}", line.marker, line.name, format_duration(line.elapsed)))
        .collect();

    lines.push(format!("Session started: {}", format_timestamp(snapshot.session_start)));

    if let Some(end) = snapshot.session_end {
        lines.push(format!("Session ended: {}", format_timestamp(end)));
        lines.push(format!(
            "Total session duration: {}",
            format_duration(end - snapshot.session_start)
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn users(a: i64, b: i64) -> Vec<UserLine> {
        vec![
            UserLine {
                marker: "💜".to_string(),
                name: "Alice".to_string(),
                elapsed: TimeDelta::seconds(a),
            },
            UserLine {
                marker: "❤️".to_string(),
                name: "Bob".to_string(),
                elapsed: TimeDelta::seconds(b),
            },
        ]
    }

    #[test]
    fn live_layout_has_three_lines() {
        let start = Utc.with_ymd_and_hms(2025, 3, 7, 9, 5, 3).unwrap();
        let text = render(&Snapshot {
            users: users(0, 0),
            session_start: start,
            session_end: None,
        });
        assert_eq!(
            text,
            "💜 Alice: 0:00:00\n❤️ Bob: 0:00:00\nSession started: 07-03-2025 09:05:03 UTC"
        );
    }

    #[test]
    fn summary_layout_adds_end_and_total() {
        let start = Utc.with_ymd_and_hms(2025, 12, 31, 23, 30, 0).unwrap();
        let end = start + TimeDelta::seconds(3661);
        let text = render(&Snapshot {
            users: users(3661, 0),
            session_start: start,
            session_end: Some(end),
        });
        assert_eq!(
            text,
            "💜 Alice: 1:01:01\n\
             ❤️ Bob: 0:00:00\n\
             Session started: 31-12-2025 23:30:00 UTC\n\
             Session ended: 01-01-2026 00:31:01 UTC\n\
             Total session duration: 1:01:01"
        );
    }
}
