//! 固定長ボディの読み取り

use crate::error::Error;
use crate::limits::ParserLimits;

use super::header::Headers;

/// ボディの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// ボディなし
    None,
    /// Content-Length で指定された固定長 (1 以上)
    ContentLength(usize),
}

impl BodyKind {
    /// ヘッダーからボディの種類を決定
    ///
    /// Transfer-Encoding は扱わないため `UnsupportedBodyEncoding` を返す。
    /// Content-Length が未指定、数値でない、または 0 以下の場合はボディなしとして扱う。
    pub fn from_headers(headers: &Headers, limits: &ParserLimits) -> Result<Self, Error> {
        if let Some(coding) = headers.get("transfer-encoding") {
            return Err(Error::UnsupportedBodyEncoding(coding.to_string()));
        }

        match headers.content_length() {
            Some(len) if len > limits.max_body_size => Err(Error::BodyTooLarge {
                size: len,
                limit: limits.max_body_size,
            }),
            Some(len) => Ok(BodyKind::ContentLength(len)),
            None => Ok(BodyKind::None),
        }
    }
}

/// 固定長ボディリーダー
///
/// 宣言された長さを超えて消費しない。残りのバイトは次のメッセージのもの。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyReader {
    declared: usize,
    body: Vec<u8>,
}

impl BodyReader {
    /// 宣言された長さでリーダーを作成
    pub fn new(declared: usize) -> Self {
        Self {
            declared,
            body: Vec::with_capacity(declared.min(64 * 1024)),
        }
    }

    /// 宣言された長さ
    pub fn declared(&self) -> usize {
        self.declared
    }

    /// まだ必要なバイト数
    pub fn remaining(&self) -> usize {
        self.declared - self.body.len()
    }

    /// バッファからボディを読み取り、消費したバイト数を返す
    pub fn read(&mut self, buf: &[u8]) -> usize {
        let n = self.remaining().min(buf.len());
        self.body.extend_from_slice(&buf[..n]);
        n
    }

    /// 宣言された長さを読み終えたか確認
    pub fn is_complete(&self) -> bool {
        self.body.len() == self.declared
    }

    /// 読み取ったボディを取り出す
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(fields: &[(&str, &str)]) -> Headers {
        let mut headers = Headers::new();
        for (name, value) in fields {
            headers.append(name, value);
        }
        headers
    }

    #[test]
    fn body_kind_from_content_length() {
        let limits = ParserLimits::default();
        assert_eq!(
            BodyKind::from_headers(&headers(&[("Content-Length", "13")]), &limits),
            Ok(BodyKind::ContentLength(13))
        );
        assert_eq!(
            BodyKind::from_headers(&headers(&[("Host", "a")]), &limits),
            Ok(BodyKind::None)
        );
        assert_eq!(
            BodyKind::from_headers(&headers(&[("Content-Length", "0")]), &limits),
            Ok(BodyKind::None)
        );
        assert_eq!(
            BodyKind::from_headers(&headers(&[("Content-Length", "many")]), &limits),
            Ok(BodyKind::None)
        );
    }

    #[test]
    fn transfer_encoding_is_unsupported() {
        let limits = ParserLimits::default();
        assert_eq!(
            BodyKind::from_headers(&headers(&[("Transfer-Encoding", "chunked")]), &limits),
            Err(Error::UnsupportedBodyEncoding("chunked".to_string()))
        );
        assert!(matches!(
            BodyKind::from_headers(
                &headers(&[("Content-Length", "5"), ("Transfer-Encoding", "gzip")]),
                &limits
            ),
            Err(Error::UnsupportedBodyEncoding(_))
        ));
    }

    #[test]
    fn body_too_large() {
        let limits = ParserLimits {
            max_body_size: 4,
            ..ParserLimits::default()
        };
        assert_eq!(
            BodyKind::from_headers(&headers(&[("Content-Length", "5")]), &limits),
            Err(Error::BodyTooLarge { size: 5, limit: 4 })
        );
    }

    #[test]
    fn reader_stops_at_declared_length() {
        let mut reader = BodyReader::new(5);
        assert_eq!(reader.read(b"he"), 2);
        assert!(!reader.is_complete());
        assert_eq!(reader.remaining(), 3);
        assert_eq!(reader.read(b"lloGET / HTTP/1.1\r\n"), 3);
        assert!(reader.is_complete());
        assert_eq!(reader.read(b"more"), 0);
        assert_eq!(reader.declared(), 5);
        assert_eq!(reader.into_body(), b"hello");
    }
}
