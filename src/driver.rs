//! ブロッキング I/O でリクエストを読み取るドライバー
//!
//! [`std::io::Read`] から読み取ったバイト列を [`RequestParser`] に投入する。
//! 1 接続につき 1 つの [`RequestReader`] を使う。

use std::io::{self, Read};

use crate::buffer::ReadBuffer;
use crate::error::Error;
use crate::limits::ParserLimits;
use crate::log::trace;
use crate::parser::{Request, RequestParser};

/// ストリームからリクエストを 1 つ読み取る
///
/// リクエストが完了する前にストリームが終わった場合は `ReadFailure` を返す。
///
/// ```rust
/// use shiguredo_request_parser::parse_from_stream;
///
/// let data = &b"GET /path HTTP/1.1\r\nHost: a\r\n\r\n"[..];
/// let request = parse_from_stream(data).unwrap();
/// assert_eq!(request.target(), "/path");
/// ```
pub fn parse_from_stream<R: Read>(reader: R) -> Result<Request, Error> {
    parse_from_stream_with_limits(reader, ParserLimits::default())
}

/// 制限付きでストリームからリクエストを 1 つ読み取る
pub fn parse_from_stream_with_limits<R: Read>(
    reader: R,
    limits: ParserLimits,
) -> Result<Request, Error> {
    RequestReader::with_limits(reader, limits)
        .next_request()?
        .ok_or_else(Error::unexpected_eof)
}

/// ストリームからリクエストを順に読み取るリーダー
///
/// 読み取ったが消費されなかったバイト (パイプライン化された次のリクエスト) は
/// 内部バッファに残り、次の [`next_request`](Self::next_request) で使われる。
#[derive(Debug)]
pub struct RequestReader<R> {
    reader: R,
    buf: ReadBuffer,
    limits: ParserLimits,
    failed: bool,
}

impl<R: Read> RequestReader<R> {
    /// 新しいリーダーを作成
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, ParserLimits::default())
    }

    /// 制限付きでリーダーを作成
    pub fn with_limits(reader: R, limits: ParserLimits) -> Self {
        Self {
            reader,
            buf: ReadBuffer::new(&limits),
            limits,
            failed: false,
        }
    }

    /// 制限設定を取得
    pub fn limits(&self) -> &ParserLimits {
        &self.limits
    }

    /// バッファに残っている未消費のバイト列
    pub fn buffered(&self) -> &[u8] {
        self.buf.filled()
    }

    /// 現在のバッファ容量
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// 内部のリーダーを参照
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// 内部のリーダーを取り出す
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// 次のリクエストを読み取る
    ///
    /// リクエストの境界でストリームが終わり、バッファも空の場合は `Ok(None)` を返す。
    /// 一度エラーを返した後は常に `AlreadyFailed` を返す。
    pub fn next_request(&mut self) -> Result<Option<Request>, Error> {
        if self.failed {
            return Err(Error::AlreadyFailed);
        }
        let result = self.read_request();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn read_request(&mut self) -> Result<Option<Request>, Error> {
        let mut parser = RequestParser::with_limits(self.limits.clone());
        loop {
            if parser.feed_from(&mut self.buf)? {
                return Ok(parser.into_request());
            }
            if self.fill()? == 0 {
                return parser.finish_at_eof(&self.buf).map(|()| None);
            }
        }
    }

    /// バッファの空き領域に読み取る
    ///
    /// 読み取ったバイト数を返す。0 はストリームの終端。
    fn fill(&mut self) -> Result<usize, Error> {
        let spare = self.buf.spare_mut()?;
        loop {
            match self.reader.read(spare) {
                Ok(n) => {
                    trace!("read {} bytes", n);
                    self.buf.commit(n);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
