//! リクエストラインのパース

use crate::error::Error;
use crate::limits::ParserLimits;

use super::syntax::{CRLF, check_line_size, find_line, is_token};

/// 受け付ける唯一の HTTP バージョン
pub const HTTP_VERSION: &str = "1.1";

/// リクエストライン
///
/// `method SP request-target SP HTTP/1.1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: String,
    target: String,
    version: String,
}

impl RequestLine {
    /// HTTP メソッド (GET, POST, etc.)
    pub fn method(&self) -> &str {
        &self.method
    }

    /// リクエストターゲット
    pub fn target(&self) -> &str {
        &self.target
    }

    /// HTTP バージョン ("HTTP/" を除いた部分、常に "1.1")
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// リクエストラインをパース
///
/// CRLF がまだない場合は `Ok(None)` を返す (データ不足、エラーではない)。
/// 成功時は CRLF を含む消費バイト数を返す。
pub fn parse_request_line(
    buf: &[u8],
    limits: &ParserLimits,
) -> Result<Option<(RequestLine, usize)>, Error> {
    let Some(pos) = find_line(buf) else {
        check_line_size(buf.len(), false, limits.max_line_size)?;
        return Ok(None);
    };
    check_line_size(pos, true, limits.max_line_size)?;

    let line = std::str::from_utf8(&buf[..pos])
        .map_err(|e| Error::MalformedRequestLine(format!("invalid UTF-8: {e}")))?;

    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts[..] else {
        return Err(Error::MalformedRequestLine(format!(
            "expected 3 parts, got {}",
            parts.len()
        )));
    };

    if !is_token(method) {
        return Err(Error::MalformedRequestLine(format!(
            "invalid method: {:?}",
            method
        )));
    }

    // request-target の中身は解釈しないが、空や制御文字は拒否する
    if target.is_empty() || target.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(Error::MalformedRequestLine(format!(
            "invalid request-target: {:?}",
            target
        )));
    }

    let version = parse_http_version(version)?;

    let request_line = RequestLine {
        method: method.to_string(),
        target: target.to_string(),
        version: version.to_string(),
    };
    Ok(Some((request_line, pos + CRLF.len())))
}

/// HTTP バージョンをパース
///
/// HTTP-version = HTTP-name "/" DIGIT "." DIGIT (RFC 9112 Section 2.3)
///
/// 形式が正しく 1.1 以外のバージョンは `UnsupportedHttpVersion` になる。
fn parse_http_version(s: &str) -> Result<&str, Error> {
    let Some((name, version)) = s.split_once('/') else {
        return Err(Error::MalformedRequestLine(format!(
            "invalid HTTP version: {:?}",
            s
        )));
    };
    if name != "HTTP" {
        return Err(Error::MalformedRequestLine(format!(
            "invalid HTTP name: {:?}",
            name
        )));
    }

    let well_formed = matches!(
        version.as_bytes(),
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit()
    );
    if !well_formed {
        return Err(Error::MalformedRequestLine(format!(
            "invalid HTTP version: {:?}",
            s
        )));
    }
    if version != HTTP_VERSION {
        return Err(Error::UnsupportedHttpVersion(version.to_string()));
    }
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(buf: &[u8]) -> Result<Option<(RequestLine, usize)>, Error> {
        parse_request_line(buf, &ParserLimits::default())
    }

    #[test]
    fn good_request_line() {
        let (line, n) = parse(b"GET / HTTP/1.1\r\nHost: localhost:42069\r\n\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(line.method(), "GET");
        assert_eq!(line.target(), "/");
        assert_eq!(line.version(), "1.1");
        assert_eq!(n, 16);
    }

    #[test]
    fn good_request_line_with_path() {
        let (line, _) = parse(b"GET /coffee HTTP/1.1\r\n").unwrap().unwrap();
        assert_eq!(line.method(), "GET");
        assert_eq!(line.target(), "/coffee");
    }

    #[test]
    fn post_with_query() {
        let (line, _) = parse(b"POST /submit?x=1&y=2 HTTP/1.1\r\n").unwrap().unwrap();
        assert_eq!(line.method(), "POST");
        assert_eq!(line.target(), "/submit?x=1&y=2");
    }

    #[test]
    fn incomplete_line_needs_more_data() {
        assert_eq!(parse(b"GET / HTTP/1.1").unwrap(), None);
        assert_eq!(parse(b"GET / HTTP/1.1\r").unwrap(), None);
        assert_eq!(parse(b"").unwrap(), None);
    }

    #[test]
    fn wrong_number_of_parts() {
        assert!(matches!(
            parse(b"/coffee HTTP/1.1\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
        assert!(matches!(
            parse(b"GET /coffee extra HTTP/1.1\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
        assert!(matches!(
            parse(b"GET  /coffee HTTP/1.1\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn empty_target_is_malformed() {
        assert!(matches!(
            parse(b"GET  HTTP/1.1\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn invalid_method() {
        assert!(matches!(
            parse(b"G(T / HTTP/1.1\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn unsupported_versions() {
        assert_eq!(
            parse(b"GET / HTTP/1.0\r\n").unwrap_err(),
            Error::UnsupportedHttpVersion("1.0".to_string())
        );
        assert_eq!(
            parse(b"GET / HTTP/2.0\r\n").unwrap_err(),
            Error::UnsupportedHttpVersion("2.0".to_string())
        );
    }

    #[test]
    fn malformed_versions() {
        for line in [
            &b"GET / HTTPS/1.1\r\n"[..],
            b"GET / HTTP/1.1.1\r\n",
            b"GET / HTTP1.1\r\n",
            b"GET / HTTP/\r\n",
            b"GET / http/1.1\r\n",
            b"GET / HTTP/x.y\r\n",
        ] {
            assert!(
                matches!(parse(line), Err(Error::MalformedRequestLine(_))),
                "{:?}",
                String::from_utf8_lossy(line)
            );
        }
    }

    #[test]
    fn non_utf8_is_malformed() {
        assert!(matches!(
            parse(b"GET /\xff HTTP/1.1\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn line_too_long() {
        let limits = ParserLimits {
            max_line_size: 8,
            ..ParserLimits::default()
        };
        assert!(matches!(
            parse_request_line(b"GET /long HTTP/1.1\r\n", &limits),
            Err(Error::BufferCapacityExceeded { .. })
        ));
        // CRLF が届く前でも検出する
        assert!(matches!(
            parse_request_line(b"GET /longer", &limits),
            Err(Error::BufferCapacityExceeded { .. })
        ));
    }
}
