//! 时间工具函数: 业务时区转换
//!
//! 营业日以 `cutoff` 为界：cutoff 之前的时间仍属于前一个营业日。
//! 所有边界都以 Unix millis 表示，区间为 `[start, end)`。

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

/// 日期 + cutoff 时间 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn date_cutoff_millis(date: NaiveDate, cutoff: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(cutoff);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 解析 cutoff 时间字符串 (HH:MM)，失败返回 00:00
pub fn parse_cutoff(cutoff: &str) -> NaiveTime {
    NaiveTime::parse_from_str(cutoff, "%H:%M").unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse business_day_cutoff '{}': {}, falling back to 00:00",
            cutoff,
            e
        );
        NaiveTime::MIN
    })
}

/// 解析时区名称，失败返回 UTC
pub fn parse_timezone(name: &str) -> Tz {
    name.parse().unwrap_or_else(|_| {
        tracing::warn!("Unknown timezone '{}', falling back to UTC", name);
        Tz::UTC
    })
}

/// 指定时刻所在的营业日 (业务时区)
///
/// 当地时间 < cutoff → 还在"昨天"的营业日
pub fn business_date_at(now_millis: i64, cutoff: NaiveTime, tz: Tz) -> NaiveDate {
    let now = DateTime::<Utc>::from_timestamp_millis(now_millis)
        .unwrap_or_default()
        .with_timezone(&tz);
    if now.time() < cutoff {
        (now - chrono::Duration::days(1)).date_naive()
    } else {
        now.date_naive()
    }
}

/// 指定时刻所在营业日的 `[start, end)` 区间
pub fn business_day_range(now_millis: i64, cutoff: NaiveTime, tz: Tz) -> (i64, i64) {
    let date = business_date_at(now_millis, cutoff, tz);
    let next = date.succ_opt().unwrap_or(date);
    (
        date_cutoff_millis(date, cutoff, tz),
        date_cutoff_millis(next, cutoff, tz),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(s: &str) -> i64 {
        DateTime::parse_from_rfc3339(s).unwrap().timestamp_millis()
    }

    #[test]
    fn test_midnight_cutoff_utc() {
        let (start, end) =
            business_day_range(millis("2024-03-10T15:30:00Z"), NaiveTime::MIN, Tz::UTC);
        assert_eq!(start, millis("2024-03-10T00:00:00Z"));
        assert_eq!(end, millis("2024-03-11T00:00:00Z"));
    }

    #[test]
    fn test_before_cutoff_belongs_to_previous_day() {
        let cutoff = parse_cutoff("04:00");
        let tz: Tz = "Europe/Madrid".parse().unwrap();
        // 02:30 local (CET, UTC+1) on 2024-01-15 is still the 14th's business day
        let now = millis("2024-01-15T01:30:00Z");
        assert_eq!(
            business_date_at(now, cutoff, tz),
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()
        );
        let (start, end) = business_day_range(now, cutoff, tz);
        assert_eq!(start, millis("2024-01-14T03:00:00Z"));
        assert_eq!(end, millis("2024-01-15T03:00:00Z"));
        assert!(start <= now && now < end);
    }

    #[test]
    fn test_parse_fallbacks() {
        assert_eq!(parse_cutoff("nonsense"), NaiveTime::MIN);
        assert_eq!(parse_timezone("Not/AZone"), Tz::UTC);
        assert_eq!(parse_timezone("Asia/Shanghai"), chrono_tz::Asia::Shanghai);
    }
}
