//! # Clock（時刻プロバイダ）と表示用タイムゾーン
//!
//! 緊急アラートの発生時刻やカレンダー招待の DTSTAMP で `Utc::now()` を直接呼ばず、
//! テストで固定時刻を注入できるようにする。
//!
//! 診療所は Hyderabad にあるため、メール本文の日時はインド標準時（UTC+05:30）で表示する。

use chrono::{DateTime, FixedOffset, Utc};

/// インド標準時の UTC からのオフセット（秒）
const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 実際のシステム時刻を返す実装
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定時刻を返すテスト用実装
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

/// インド標準時のオフセット
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECONDS).expect("IST のオフセットは ±24 時間以内")
}

/// メール本文向けの日時表記（例: `Monday, 20 October 2025, 10:30 AM IST`）
pub fn format_ist(at: DateTime<Utc>) -> String {
    at.with_timezone(&ist())
        .format("%A, %-d %B %Y, %I:%M %p IST")
        .to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_system_clock_は現在時刻を返す() {
        let clock = SystemClock;
        let before = Utc::now();
        let result = clock.now();
        let after = Utc::now();

        assert!(result >= before);
        assert!(result <= after);
    }

    #[test]
    fn test_fixed_clock_は複数回呼んでも同じ時刻を返す() {
        let fixed_time = DateTime::from_timestamp(1_760_936_400, 0).unwrap();
        let clock = FixedClock::new(fixed_time);

        assert_eq!(clock.now(), fixed_time);
        assert_eq!(clock.now(), fixed_time);
    }

    #[test]
    fn test_format_ist_はutcを5時間30分進めて表示する() {
        // 2025-10-20T05:00:00Z
        let at = DateTime::from_timestamp(1_760_936_400, 0).unwrap();

        assert_eq!(format_ist(at), "Monday, 20 October 2025, 10:30 AM IST");
    }

    #[test]
    fn test_format_ist_は日付をまたぐ場合に翌日になる() {
        // 2025-10-20T20:00:00Z → 2025-10-21 01:30 IST
        let at = DateTime::from_timestamp(1_760_990_400, 0).unwrap();

        assert_eq!(format_ist(at), "Tuesday, 21 October 2025, 01:30 AM IST");
    }
}
