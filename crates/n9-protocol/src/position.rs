//! 位置报告解析
//!
//! `position` 命令和键盘模式下每次按键后，控制器返回逗号分隔的 `label:value` 列表，
//! 标签以轴编号结尾，末尾带一个多余的逗号：
//!
//! ```text
//! <P0:0,P1:2550,P2:4350,P3:10,>\r
//! ```

use crate::{AxisId, FRAME_END, FRAME_START, ProtocolError};

/// 解析位置报告
///
/// 返回报告中出现的各轴计数（按出现顺序）。外层 `<`/`>` 与空白可选。
///
/// ```rust
/// use n9_protocol::{AxisId, parse_position_report};
///
/// let axes = parse_position_report("<P0:0,P1:2550,P2:4350,P3:10,>\r").unwrap();
/// assert_eq!(axes[2], (AxisId::Shoulder, 4350));
/// ```
pub fn parse_position_report(report: &str) -> Result<Vec<(AxisId, i64)>, ProtocolError> {
    let malformed = || ProtocolError::MalformedPositionReport(report.to_string());

    let body = report.trim();
    let body = body.strip_prefix(FRAME_START).unwrap_or(body);
    let body = body.strip_suffix(FRAME_END).unwrap_or(body);

    let mut axes = Vec::new();
    for piece in body.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (label, value) = piece.split_once(':').ok_or_else(malformed)?;

        let label = label.trim();
        let digits_at = label
            .rfind(|c: char| !c.is_ascii_digit())
            .map_or(0, |i| i + 1);
        let index: u8 = label[digits_at..].parse().map_err(|_| malformed())?;
        let axis = AxisId::try_from(index)?;

        let count: i64 = value.trim().parse().map_err(|_| malformed())?;
        axes.push((axis, count));
    }

    if axes.is_empty() {
        return Err(malformed());
    }
    Ok(axes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_framed_report() {
        let axes = parse_position_report("<P0:0,P1:100,P2:100,P3:10,>\r").unwrap();
        assert_eq!(
            axes,
            vec![
                (AxisId::Gripper, 0),
                (AxisId::Elbow, 100),
                (AxisId::Shoulder, 100),
                (AxisId::Lift, 10),
            ]
        );
    }

    #[test]
    fn test_parse_unframed_report_with_long_labels() {
        let axes = parse_position_report("Pos1: -25, Pos3:12250,\r\n").unwrap();
        assert_eq!(axes, vec![(AxisId::Elbow, -25), (AxisId::Lift, 12250)]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_position_report("<ECHO>\r"),
            Err(ProtocolError::MalformedPositionReport(_))
        ));
        assert!(matches!(
            parse_position_report("P1:abc,"),
            Err(ProtocolError::MalformedPositionReport(_))
        ));
        assert!(matches!(
            parse_position_report("Pos:12,"),
            Err(ProtocolError::MalformedPositionReport(_))
        ));
        assert!(matches!(
            parse_position_report("<>\r"),
            Err(ProtocolError::MalformedPositionReport(_))
        ));
    }

    #[test]
    fn test_parse_unknown_axis() {
        assert_eq!(
            parse_position_report("P9:1,"),
            Err(ProtocolError::InvalidAxis(9))
        );
    }
}
