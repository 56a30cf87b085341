use chrono::{DateTime, Months, Utc};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// `Expires` ヘッダ用の 1 年後の日時（HTTP-date 形式）
///
/// 2/29 のように翌年に存在しない日は月末に丸める。
pub fn expires_after_one_year(now: DateTime<Utc>) -> String {
    let expires = now.checked_add_months(Months::new(12)).unwrap_or(now);
    expires.format(HTTP_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_one_year_ahead() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        assert_eq!(expires_after_one_year(now), "Tue, 19 Oct 2027 08:30:00 GMT");
    }

    #[test]
    fn test_leap_day() {
        let now = Utc.with_ymd_and_hms(2028, 2, 29, 0, 0, 0).unwrap();
        assert_eq!(expires_after_one_year(now), "Wed, 28 Feb 2029 00:00:00 GMT");
    }
}
