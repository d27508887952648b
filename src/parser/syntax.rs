//! 行の切り出しと文字クラスの判定

use crate::error::Error;

/// 行終端
pub(crate) const CRLF: &[u8] = b"\r\n";

/// CRLF で終わる行を探す
///
/// 見つかった場合は CRLF の直前までの長さを返す
pub(crate) fn find_line(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}

/// 行の長さ制限を確認
///
/// `line_len` は CRLF を除く行の長さ。行が未完了の場合はバッファ全体を渡す。
/// 未完了の行は末尾が CR で終わっている可能性があるため 1 バイト分を許容する。
pub(crate) fn check_line_size(line_len: usize, complete: bool, limit: usize) -> Result<(), Error> {
    let size = if complete {
        line_len
    } else {
        line_len.saturating_sub(1)
    };
    if size > limit {
        return Err(Error::BufferCapacityExceeded { size, limit });
    }
    Ok(())
}

/// トークン文字か確認 (RFC 9110 Section 5.6.2)
pub(crate) fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'0'..=b'9' | b'A'..=b'Z' | b'^' | b'_' | b'`' | b'a'..=b'z' | b'|' | b'~'
    )
}

/// トークンとして有効か確認
pub(crate) fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_char)
}

/// ヘッダー値が有効か確認 (RFC 9110 Section 5.5)
///
/// 制御文字 (0x00-0x08, 0x0A-0x1F, 0x7F) を含む場合は無効
pub(crate) fn is_valid_field_value(value: &str) -> bool {
    value
        .bytes()
        .all(|b| matches!(b, 0x09 | 0x20..=0x7E | 0x80..=0xFF))
}
