use chrono::{DateTime, Utc};

/// Get current Unix timestamp in UTC (milliseconds)
pub fn get_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a Unix millisecond timestamp as an RFC 3339 string (UTC)
pub fn timestamp_to_rfc3339(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_to_rfc3339() {
        // テスト項目: ミリ秒タイムスタンプを RFC 3339 文字列に変換できる
        // given (前提条件):
        let timestamp_ms = 1_700_000_000_000i64;

        // when (操作):
        let rendered = timestamp_to_rfc3339(timestamp_ms);

        // then (期待する結果):
        assert_eq!(rendered, "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_timestamp_to_rfc3339_out_of_range() {
        // テスト項目: 範囲外のタイムスタンプは空文字列になる
        // when (操作):
        let rendered = timestamp_to_rfc3339(i64::MAX);

        // then (期待する結果):
        assert_eq!(rendered, "");
    }

    #[test]
    fn test_get_timestamp_ms_is_monotonic_enough() {
        // テスト項目: 現在時刻のタイムスタンプが逆行しない
        // when (操作):
        let first = get_timestamp_ms();
        let second = get_timestamp_ms();

        // then (期待する結果):
        assert!(first <= second);
    }
}
