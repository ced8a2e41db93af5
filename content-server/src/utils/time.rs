//! 时间工具函数: 业务时区格式化
//!
//! `last_updated` 以及所有面向管理员的时间戳统一使用业务时区渲染，
//! 不依赖服务器本地时区。

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// `last_updated` 格式 (YYYY-MM-DD HH:MM:SS)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 默认业务时区
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

/// 解析 IANA 时区名 (e.g. "America/New_York")
pub fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| format!("Unknown timezone: {}", name))
}

/// 指定时刻 → 业务时区时间戳字符串
pub fn format_timestamp(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(TIMESTAMP_FORMAT).to_string()
}

/// 当前时刻 (业务时区)
pub fn now_timestamp(tz: Tz) -> String {
    format_timestamp(Utc::now(), tz)
}
