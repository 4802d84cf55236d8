//! Log sanitization utilities
//!
//! 请求/响应体可能携带凭证、主机密码等敏感内容，调试日志只保留截断后的
//! 前缀。

/// 日志输出保留的最大字节数
const TRUNCATE_LIMIT: usize = 256;

/// Truncate a string for safe logging.
///
/// Returns the original string when within the limit, otherwise the longest
/// prefix that fits on a character boundary plus a marker with the original
/// length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        return s.to_string();
    }

    // 找到不超过上限的最后一个字符边界
    let cut = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= TRUNCATE_LIMIT)
        .last()
        .unwrap_or(0);

    format!("{}... ({} bytes total)", &s[..cut], s.len())
}
