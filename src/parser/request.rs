//! リクエストの状態機械

use crate::buffer::ReadBuffer;
use crate::error::Error;
use crate::limits::ParserLimits;
use crate::log::{debug, trace};

use super::body::{BodyKind, BodyReader};
use super::header::{HeaderProgress, Headers};
use super::request_line::{RequestLine, parse_request_line};
use super::state::ParseState;

/// パース済みの HTTP リクエスト
///
/// [`RequestParser`] が `Done` に到達した場合にのみ作成される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    request_line: RequestLine,
    headers: Headers,
    body: Vec<u8>,
}

impl Request {
    /// リクエストライン
    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    /// HTTP メソッド
    pub fn method(&self) -> &str {
        self.request_line.method()
    }

    /// リクエストターゲット
    pub fn target(&self) -> &str {
        self.request_line.target()
    }

    /// HTTP バージョン ("1.1")
    pub fn version(&self) -> &str {
        self.request_line.version()
    }

    /// ヘッダー
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// ボディ
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// リクエストを分解
    pub fn into_parts(self) -> (RequestLine, Headers, Vec<u8>) {
        (self.request_line, self.headers, self.body)
    }
}

/// 内部フェーズ
///
/// 各フェーズがその時点までに組み立てたデータを持つ
#[derive(Debug)]
enum Phase {
    Init,
    Headers {
        request_line: RequestLine,
        headers: Headers,
    },
    Body {
        request_line: RequestLine,
        headers: Headers,
        reader: BodyReader,
    },
    Done(Request),
    Error,
}

/// HTTP リクエストパーサー (Sans I/O)
///
/// 任意に分割されたバイト列を [`feed`](Self::feed) で受け取り、
/// 分割のされ方によらず同じ [`Request`] を組み立てる。
///
/// ```rust
/// use shiguredo_request_parser::{ParseState, RequestParser};
///
/// let mut parser = RequestParser::new();
/// let data = b"GET /path HTTP/1.1\r\nHost: a\r\n\r\n";
/// let consumed = parser.feed(&data[..10]).unwrap();
/// assert_eq!(consumed, 0);
/// assert_eq!(parser.state(), ParseState::Init);
///
/// let consumed = parser.feed(data).unwrap();
/// assert_eq!(consumed, data.len());
/// assert_eq!(parser.state(), ParseState::Done);
///
/// let request = parser.into_request().unwrap();
/// assert_eq!(request.method(), "GET");
/// assert_eq!(request.target(), "/path");
/// ```
#[derive(Debug)]
pub struct RequestParser {
    phase: Phase,
    limits: ParserLimits,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    /// 新しいパーサーを作成
    pub fn new() -> Self {
        Self::with_limits(ParserLimits::default())
    }

    /// 制限付きでパーサーを作成
    pub fn with_limits(limits: ParserLimits) -> Self {
        Self {
            phase: Phase::Init,
            limits,
        }
    }

    /// 制限設定を取得
    pub fn limits(&self) -> &ParserLimits {
        &self.limits
    }

    /// 現在の状態
    pub fn state(&self) -> ParseState {
        match self.phase {
            Phase::Init => ParseState::Init,
            Phase::Headers { .. } => ParseState::Headers,
            Phase::Body { .. } => ParseState::Body,
            Phase::Done(_) => ParseState::Done,
            Phase::Error => ParseState::Error,
        }
    }

    /// 完了したか確認
    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done(_))
    }

    /// 終端状態 (Done / Error) か確認
    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// 完了したリクエストを参照
    pub fn request(&self) -> Option<&Request> {
        match &self.phase {
            Phase::Done(request) => Some(request),
            Phase::Init | Phase::Headers { .. } | Phase::Body { .. } | Phase::Error => None,
        }
    }

    /// 完了したリクエストを取り出す
    ///
    /// `Done` 以外の場合は `None`
    pub fn into_request(self) -> Option<Request> {
        match self.phase {
            Phase::Done(request) => Some(request),
            Phase::Init | Phase::Headers { .. } | Phase::Body { .. } | Phase::Error => None,
        }
    }

    /// データを投入し、消費したバイト数を返す
    ///
    /// 消費されなかった末尾のバイトは、次の呼び出しで先頭から再度渡す必要がある。
    /// 完了後は何も消費せず 0 を返す。エラー後は常に `AlreadyFailed` を返す。
    pub fn feed(&mut self, data: &[u8]) -> Result<usize, Error> {
        if matches!(self.phase, Phase::Error) {
            return Err(Error::AlreadyFailed);
        }

        let mut consumed = 0;
        while consumed < data.len() && !self.is_terminal() {
            let n = self.step(&data[consumed..])?;
            if n == 0 {
                break;
            }
            consumed += n;
        }
        trace!(
            "fed {} bytes, consumed {} (state: {:?})",
            data.len(),
            consumed,
            self.state()
        );
        Ok(consumed)
    }

    /// 読み取りバッファの有効なデータを投入し、消費した分をバッファから取り除く
    ///
    /// リクエストが完了した場合は `true` を返す。
    pub fn feed_from(&mut self, buf: &mut ReadBuffer) -> Result<bool, Error> {
        if !buf.is_empty() {
            let consumed = self.feed(buf.filled())?;
            buf.consume(consumed);
        }
        Ok(self.is_done())
    }

    /// ストリームの終端に達した時点の判定
    ///
    /// リクエストの境界 (`Init` 状態でバッファが空) であれば `Ok(())`、
    /// それ以外はリクエストの途中で途切れたものとして `ReadFailure` を返す。
    pub fn finish_at_eof(&self, buf: &ReadBuffer) -> Result<(), Error> {
        if self.state() == ParseState::Init && buf.is_empty() {
            debug!("stream closed at request boundary");
            return Ok(());
        }
        debug!("stream closed in state {:?}", self.state());
        Err(Error::unexpected_eof())
    }

    /// 現在のフェーズを 1 段階進める
    ///
    /// 失敗した場合、フェーズは `Error` のまま残る
    fn step(&mut self, buf: &[u8]) -> Result<usize, Error> {
        let phase = std::mem::replace(&mut self.phase, Phase::Error);
        match self.advance(phase, buf) {
            Ok((next, consumed)) => {
                self.phase = next;
                Ok(consumed)
            }
            Err(e) => {
                debug!("request parse failed: {}", e);
                Err(e)
            }
        }
    }

    fn advance(&self, phase: Phase, buf: &[u8]) -> Result<(Phase, usize), Error> {
        match phase {
            Phase::Init => match parse_request_line(buf, &self.limits)? {
                Some((request_line, consumed)) => {
                    debug!(
                        "request line: {} {} HTTP/{}",
                        request_line.method(),
                        request_line.target(),
                        request_line.version()
                    );
                    let next = Phase::Headers {
                        request_line,
                        headers: Headers::new(),
                    };
                    Ok((next, consumed))
                }
                None => Ok((Phase::Init, 0)),
            },
            Phase::Headers {
                request_line,
                mut headers,
            } => match headers.parse_line(buf, &self.limits)? {
                HeaderProgress::NeedMoreData => Ok((
                    Phase::Headers {
                        request_line,
                        headers,
                    },
                    0,
                )),
                HeaderProgress::Field { consumed } => Ok((
                    Phase::Headers {
                        request_line,
                        headers,
                    },
                    consumed,
                )),
                HeaderProgress::Complete { consumed } => {
                    let next = match BodyKind::from_headers(&headers, &self.limits)? {
                        BodyKind::ContentLength(len) => {
                            debug!("headers complete, reading {} body bytes", len);
                            Phase::Body {
                                request_line,
                                headers,
                                reader: BodyReader::new(len),
                            }
                        }
                        BodyKind::None => {
                            debug!("headers complete, no body");
                            Phase::Done(Request {
                                request_line,
                                headers,
                                body: Vec::new(),
                            })
                        }
                    };
                    Ok((next, consumed))
                }
            },
            Phase::Body {
                request_line,
                headers,
                mut reader,
            } => {
                let consumed = reader.read(buf);
                let next = if reader.is_complete() {
                    Phase::Done(Request {
                        request_line,
                        headers,
                        body: reader.into_body(),
                    })
                } else {
                    Phase::Body {
                        request_line,
                        headers,
                        reader,
                    }
                };
                Ok((next, consumed))
            }
            Phase::Done(request) => Ok((Phase::Done(request), 0)),
            Phase::Error => Err(Error::AlreadyFailed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 指定サイズごとに分割して投入し、消費されなかった分は次回に持ち越す
    fn feed_in_chunks(parser: &mut RequestParser, data: &[u8], chunk: usize) -> usize {
        let mut pending: Vec<u8> = Vec::new();
        let mut offset = 0;
        while offset < data.len() && !parser.is_terminal() {
            let end = (offset + chunk).min(data.len());
            pending.extend_from_slice(&data[offset..end]);
            offset = end;
            let n = parser.feed(&pending).unwrap();
            pending.drain(..n);
        }
        // 未消費のバイト数
        pending.len() + (data.len() - offset)
    }

    #[test]
    fn simple_get() {
        let mut parser = RequestParser::new();
        let data = b"GET /path HTTP/1.1\r\nHost: a\r\n\r\n";
        assert_eq!(parser.feed(data).unwrap(), data.len());
        assert_eq!(parser.state(), ParseState::Done);

        let request = parser.into_request().unwrap();
        assert_eq!(request.method(), "GET");
        assert_eq!(request.target(), "/path");
        assert_eq!(request.version(), "1.1");
        assert_eq!(request.header("host"), Some("a"));
        assert!(request.body().is_empty());
    }

    #[test]
    fn chunked_reading() {
        let data = b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";
        for chunk in [1, 2, 3, 5, 8, 13, data.len()] {
            let mut parser = RequestParser::new();
            let leftover = feed_in_chunks(&mut parser, data, chunk);
            assert_eq!(leftover, 0);
            let request = parser.into_request().unwrap();
            assert_eq!(request.method(), "GET");
            assert_eq!(request.target(), "/");
            assert_eq!(request.header("Host"), Some("localhost:42069"));
            assert_eq!(request.header("user-agent"), Some("curl/7.81.0"));
            assert_eq!(request.header("accept"), Some("*/*"));
        }
    }

    #[test]
    fn body_with_content_length() {
        let data = b"POST /submit HTTP/1.1\r\nHost: a\r\nContent-Length: 5\r\n\r\nhello";
        for chunk in [1, 3, data.len()] {
            let mut parser = RequestParser::new();
            assert_eq!(feed_in_chunks(&mut parser, data, chunk), 0);
            assert_eq!(parser.request().unwrap().body(), b"hello");
        }
    }

    #[test]
    fn done_only_after_full_body() {
        let head = b"GET /path HTTP/1.1\r\nHost: a\r\nContent-Length: 5\r\n\r\n";
        let mut parser = RequestParser::new();
        assert_eq!(parser.feed(head).unwrap(), head.len());
        assert_eq!(parser.state(), ParseState::Body);
        assert_eq!(parser.feed(b"hell").unwrap(), 4);
        assert_eq!(parser.state(), ParseState::Body);
        assert!(parser.request().is_none());
        assert_eq!(parser.feed(b"o").unwrap(), 1);
        assert_eq!(parser.state(), ParseState::Done);
        assert_eq!(parser.request().unwrap().body(), b"hello");
    }

    #[test]
    fn pipelined_surplus_is_not_consumed() {
        let first = b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc";
        let next = b"GET /next HTTP/1.1\r\n\r\n";
        let data = [&first[..], &next[..]].concat();

        let mut parser = RequestParser::new();
        assert_eq!(parser.feed(&data).unwrap(), first.len());
        assert_eq!(parser.request().unwrap().body(), b"abc");

        // 完了後は何も消費しない
        assert_eq!(parser.feed(&data[first.len()..]).unwrap(), 0);
        assert_eq!(parser.state(), ParseState::Done);

        let mut parser = RequestParser::new();
        assert_eq!(parser.feed(&data[first.len()..]).unwrap(), next.len());
        assert_eq!(parser.request().unwrap().target(), "/next");
    }

    #[test]
    fn partial_body_needs_more_data() {
        let data = b"POST / HTTP/1.1\r\nContent-Length: 20\r\n\r\npartial";
        let mut parser = RequestParser::new();
        assert_eq!(parser.feed(data).unwrap(), data.len());
        assert_eq!(parser.state(), ParseState::Body);
        assert!(!parser.is_terminal());
        assert!(parser.into_request().is_none());
    }

    #[test]
    fn malformed_request_line_then_already_failed() {
        for data in [&b"/coffee HTTP/1.1\r\n\r\n"[..], b"GET / x HTTP/1.1\r\n\r\n"] {
            let mut parser = RequestParser::new();
            assert!(matches!(
                parser.feed(data),
                Err(Error::MalformedRequestLine(_))
            ));
            assert_eq!(parser.state(), ParseState::Error);
            assert_eq!(parser.feed(b"GET / HTTP/1.1\r\n"), Err(Error::AlreadyFailed));
            assert_eq!(parser.feed(b""), Err(Error::AlreadyFailed));
        }
    }

    #[test]
    fn malformed_header_transitions_to_error() {
        let mut parser = RequestParser::new();
        assert!(matches!(
            parser.feed(b"GET / HTTP/1.1\r\nHost localhost\r\n\r\n"),
            Err(Error::MalformedHeaderLine(_))
        ));
        assert_eq!(parser.state(), ParseState::Error);
        assert_eq!(parser.feed(b"\r\n"), Err(Error::AlreadyFailed));
        assert!(parser.into_request().is_none());
    }

    #[test]
    fn http_1_0_is_rejected() {
        let mut parser = RequestParser::new();
        assert_eq!(
            parser.feed(b"GET / HTTP/1.0\r\nHost: a\r\n\r\n"),
            Err(Error::UnsupportedHttpVersion("1.0".to_string()))
        );
        assert_eq!(parser.state(), ParseState::Error);
    }

    #[test]
    fn chunked_transfer_encoding_is_an_error() {
        let mut parser = RequestParser::new();
        assert_eq!(
            parser.feed(b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n"),
            Err(Error::UnsupportedBodyEncoding("chunked".to_string()))
        );
        assert_eq!(parser.state(), ParseState::Error);
    }

    #[test]
    fn duplicate_headers_are_merged() {
        let mut parser = RequestParser::new();
        parser
            .feed(b"GET / HTTP/1.1\r\nX-Foo: a\r\nHost: h\r\nx-foo: b\r\n\r\n")
            .unwrap();
        let request = parser.into_request().unwrap();
        assert_eq!(request.header("X-FOO"), Some("a, b"));
        assert_eq!(request.headers().len(), 2);
    }

    #[test]
    fn invalid_content_length_means_no_body() {
        let data = b"POST / HTTP/1.1\r\nContent-Length: nope\r\n\r\nbody";
        let mut parser = RequestParser::new();
        assert_eq!(parser.feed(data).unwrap(), data.len() - 4);
        assert_eq!(parser.state(), ParseState::Done);
        assert!(parser.request().unwrap().body().is_empty());
    }

    #[test]
    fn missing_end_of_headers() {
        let data = b"POST / HTTP/1.1\r\nHost: localhost:42069\r\n";
        let mut parser = RequestParser::new();
        assert_eq!(parser.feed(data).unwrap(), data.len());
        assert_eq!(parser.state(), ParseState::Headers);
    }

    #[test]
    fn empty_feed_consumes_nothing() {
        let mut parser = RequestParser::new();
        assert_eq!(parser.feed(b"").unwrap(), 0);
        assert_eq!(parser.state(), ParseState::Init);
    }

    #[test]
    fn into_parts() {
        let mut parser = RequestParser::new();
        parser
            .feed(b"PUT /x HTTP/1.1\r\nContent-Length: 2\r\n\r\nok")
            .unwrap();
        let (line, headers, body) = parser.into_request().unwrap().into_parts();
        assert_eq!(line.method(), "PUT");
        assert_eq!(headers.get("content-length"), Some("2"));
        assert_eq!(body, b"ok");
    }
}
