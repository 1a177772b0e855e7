//! 帧编解码
//!
//! 发送帧为 `'<' + payload + '\r'`；响应帧以 `'>' + '\r'` 结束。
//! 解码层不解释响应内容，只负责判定帧结束和回显校验。

use crate::ProtocolError;
use std::fmt::Write;

/// 帧起始字符
pub const FRAME_START: char = '<';
/// 响应帧结束字符
pub const FRAME_END: char = '>';
/// 行结束符（CR）
pub const FRAME_TERMINATOR: char = '\r';
/// 控制器可接受的计数绝对值上限（32 位有符号整数）
pub const MAX_COUNT: i64 = i32::MAX as i64;

/// 将载荷封装为发送帧字节
///
/// ```rust
/// use n9_protocol::encode_frame;
///
/// assert_eq!(encode_frame("HOME"), b"<HOME\r".to_vec());
/// ```
pub fn encode_frame(payload: &str) -> Vec<u8> {
    let mut frame = String::with_capacity(payload.len() + 2);
    frame.push(FRAME_START);
    frame.push_str(payload);
    frame.push(FRAME_TERMINATOR);
    frame.into_bytes()
}

/// 将数值参数取整为编码器计数
///
/// 与控制器端保持一致：四舍六入、五取偶（banker's rounding）。
pub fn round_count(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// 取整并检查范围
///
/// NaN、无穷大以及取整后绝对值超过 [`MAX_COUNT`] 的值都被拒绝。
/// `index` 是参数在载荷中的编号（从 1 开始），只用于错误信息。
///
/// ```rust
/// use n9_protocol::checked_count;
///
/// assert_eq!(checked_count(1, 2550.5).unwrap(), 2550);
/// assert!(checked_count(1, f64::NAN).is_err());
/// assert!(checked_count(1, -1e30).is_err());
/// ```
pub fn checked_count(index: usize, value: f64) -> Result<i64, ProtocolError> {
    let invalid = || ProtocolError::InvalidArgument { index, value };
    if !value.is_finite() {
        return Err(invalid());
    }
    let rounded = value.round_ties_even();
    if rounded.abs() > MAX_COUNT as f64 {
        return Err(invalid());
    }
    Ok(rounded as i64)
}

/// 构造命令载荷
///
/// 语法：`WIRECODE (' V' index '[' roundedInteger ']')*`，`index` 从 1 开始。
/// 任一参数无法表示为计数时返回 `InvalidArgument`，不会发出截断后的值。
///
/// ```rust
/// use n9_protocol::build_payload;
///
/// assert_eq!(build_payload("MOAX", &[1.0, 2550.4]).unwrap(), "MOAX V1[1] V2[2550]");
/// assert!(build_payload("MOAX", &[2.0, f64::NAN]).is_err());
/// ```
pub fn build_payload(wire_code: &str, args: &[f64]) -> Result<String, ProtocolError> {
    let mut payload = String::with_capacity(wire_code.len() + args.len() * 10);
    payload.push_str(wire_code);
    for (i, value) in args.iter().enumerate() {
        let count = checked_count(i + 1, *value)?;
        // 写入 String 不会失败
        let _ = write!(payload, " V{}[{}]", i + 1, count);
    }
    Ok(payload)
}

/// 判断累积缓冲区是否已构成完整响应
///
/// 当且仅当缓冲区以 `'>' + '\r'` 结尾时返回 `true`。
pub fn is_frame_complete(buffer: &str) -> bool {
    let mut tail = buffer.chars().rev();
    matches!(
        (tail.next(), tail.next()),
        (Some(FRAME_TERMINATOR), Some(FRAME_END))
    )
}

/// 去掉响应末尾的 CR，得到 `<...>` 形式的响应帧
pub fn strip_terminator(buffer: &str) -> &str {
    buffer.strip_suffix(FRAME_TERMINATOR).unwrap_or(buffer)
}

/// 回显校验
///
/// 只有当 `received` 形如 `'<' + sent + '>'` 时返回 `true`，其余任何形状都返回 `false`。
pub fn validate_echo(sent: &str, received: &str) -> bool {
    received
        .strip_prefix(FRAME_START)
        .and_then(|rest| rest.strip_suffix(FRAME_END))
        .is_some_and(|interior| interior == sent)
}

/// 构造回显形式的响应帧（`'<' + payload + '>'`）
///
/// 离线模式下用作合成响应。
pub fn echo_frame(payload: &str) -> String {
    let mut frame = String::with_capacity(payload.len() + 2);
    frame.push(FRAME_START);
    frame.push_str(payload);
    frame.push(FRAME_END);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_frame() {
        assert_eq!(encode_frame("ECHO"), b"<ECHO\r");
        assert_eq!(encode_frame(""), b"<\r");
    }

    #[test]
    fn test_build_payload_without_args() {
        assert_eq!(build_payload("POSR", &[]).unwrap(), "POSR");
    }

    #[test]
    fn test_build_payload_indexes_and_rounds() {
        let payload = build_payload("MOSY", &[1.0, 2.0, 2550.0, 4349.6, 75000.0, 10000.0]).unwrap();
        assert_eq!(
            payload,
            "MOSY V1[1] V2[2] V3[2550] V4[4350] V5[75000] V6[10000]"
        );
    }

    #[test]
    fn test_build_payload_rejects_invalid_counts() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -1e30, 3e9] {
            match build_payload("MOAX", &[2.0, bad]) {
                Err(ProtocolError::InvalidArgument { index, .. }) => assert_eq!(index, 2),
                other => panic!("Expected InvalidArgument for {}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_checked_count_limits() {
        assert_eq!(checked_count(1, MAX_COUNT as f64).unwrap(), MAX_COUNT);
        assert_eq!(checked_count(1, -(MAX_COUNT as f64)).unwrap(), -MAX_COUNT);
        assert!(checked_count(1, MAX_COUNT as f64 + 1.0).is_err());
        assert_eq!(checked_count(1, -2.5).unwrap(), -2);
    }

    #[test]
    fn test_round_count_ties_to_even() {
        assert_eq!(round_count(2.5), 2);
        assert_eq!(round_count(3.5), 4);
        assert_eq!(round_count(-2.5), -2);
        assert_eq!(round_count(-7.6), -8);
    }

    #[test]
    fn test_frame_complete() {
        assert!(is_frame_complete("<ECHO>\r"));
        assert!(!is_frame_complete("<ECHO>"));
        assert!(!is_frame_complete("<ECHO\r"));
        assert!(!is_frame_complete(""));
        assert!(!is_frame_complete("\r"));
    }

    #[test]
    fn test_validate_echo() {
        assert!(validate_echo("ECHO", "<ECHO>"));
        assert!(!validate_echo("ECHO", "ECHO"));
        assert!(!validate_echo("ECHO", "<ECHO"));
        assert!(!validate_echo("ECHO", "ECHO>"));
        assert!(!validate_echo("ECHO", "<ECH>"));
        assert!(!validate_echo("ECHO", "<ECHO>\r"));
        assert!(!validate_echo("ECHO", ""));
    }

    #[test]
    fn test_strip_terminator_then_validate() {
        let sent = "MOAX V1[3] V2[100] V3[75000] V4[10000]";
        let buffer = format!("<{}>\r", sent);
        assert!(is_frame_complete(&buffer));
        assert!(validate_echo(sent, strip_terminator(&buffer)));
    }

    #[test]
    fn test_echo_frame() {
        assert_eq!(echo_frame("HOME"), "<HOME>");
        assert!(validate_echo("HOME", &echo_frame("HOME")));
    }
}
