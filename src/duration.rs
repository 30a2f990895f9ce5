use chrono::TimeDelta;

// H:MM:SS 형식. 시간은 패딩 없음, 초 미만은 버림
pub fn format_duration(elapsed: TimeDelta) -> String {
    let total = elapsed.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_padded() {
        assert_eq!(format_duration(TimeDelta::zero()), "0:00:00");
    }

    #[test]
    fn hours_are_not_padded() {
        assert_eq!(format_duration(TimeDelta::seconds(3661)), "1:01:01");
        assert_eq!(format_duration(TimeDelta::seconds(36 * 3600 + 5)), "36:00:05");
    }

    #[test]
    fn sub_second_part_is_truncated() {
        assert_eq!(format_duration(TimeDelta::milliseconds(65_999)), "0:01:05");
    }

    #[test]
    fn negative_clamps_to_zero() {
        assert_eq!(format_duration(TimeDelta::seconds(-4)), "0:00:00");
    }
}
