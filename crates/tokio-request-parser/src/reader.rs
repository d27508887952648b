//! 非同期リクエストリーダー
//!
//! [`tokio::io::AsyncRead`] から読み取ったバイト列を [`RequestParser`] に投入する。
//! 1 回の読み取りごとのタイムアウトと、リクエスト全体の期限を指定できる。
//!
//! ## 使い方
//!
//! ```rust
//! use tokio_request_parser::AsyncRequestReader;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let stream = &b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n"[..];
//! let mut reader = AsyncRequestReader::new(stream);
//! assert_eq!(reader.next_request().await.unwrap().unwrap().target(), "/a");
//! assert_eq!(reader.next_request().await.unwrap().unwrap().target(), "/b");
//! assert!(reader.next_request().await.unwrap().is_none());
//! # }
//! ```

use std::io;
use std::time::Duration;

use log::{debug, trace};
use shiguredo_request_parser::{Error, ParserLimits, ReadBuffer, Request, RequestParser};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::Instant;

/// ストリームからリクエストを順に非同期で読み取るリーダー
///
/// タイムアウトした場合は `TimedOut` を返し、以降は `AlreadyFailed` を返す。
///
/// 読み取り途中のパーサーはリーダーが保持する。[`next_request`](Self::next_request) の
/// future を途中で破棄しても、次の呼び出しは同じリクエストの続きから読み取る。
#[derive(Debug)]
pub struct AsyncRequestReader<R> {
    reader: R,
    buf: ReadBuffer,
    limits: ParserLimits,
    read_timeout: Option<Duration>,
    /// 読み取り途中のリクエスト
    parser: Option<RequestParser>,
    failed: bool,
}

impl<R: AsyncRead + Unpin> AsyncRequestReader<R> {
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
            read_timeout: None,
            parser: None,
            failed: false,
        }
    }

    /// 1 回の読み取りのタイムアウトを設定
    ///
    /// `None` の場合はタイムアウトしない
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// 制限設定を取得
    pub fn limits(&self) -> &ParserLimits {
        &self.limits
    }

    /// バッファに残っている未消費のバイト列
    pub fn buffered(&self) -> &[u8] {
        self.buf.filled()
    }

    /// 内部のリーダーを取り出す
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// 次のリクエストを読み取る
    ///
    /// リクエストの境界でストリームが終わり、バッファも空の場合は `Ok(None)` を返す。
    pub async fn next_request(&mut self) -> Result<Option<Request>, Error> {
        if self.failed {
            return Err(Error::AlreadyFailed);
        }
        let result = self.read_request().await;
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    /// 期限までに次のリクエストを読み取る
    ///
    /// 期限を過ぎた場合は `TimedOut` を返す。
    pub async fn next_request_until(&mut self, deadline: Instant) -> Result<Option<Request>, Error> {
        match tokio::time::timeout_at(deadline, self.next_request()).await {
            Ok(result) => result,
            Err(_) => {
                debug!("request deadline elapsed");
                self.failed = true;
                Err(Error::TimedOut)
            }
        }
    }

    async fn read_request(&mut self) -> Result<Option<Request>, Error> {
        loop {
            let parser = self
                .parser
                .get_or_insert_with(|| RequestParser::with_limits(self.limits.clone()));
            if parser.feed_from(&mut self.buf)? {
                return Ok(self.parser.take().and_then(RequestParser::into_request));
            }
            if self.fill().await? == 0 {
                let result = match &self.parser {
                    Some(parser) => parser.finish_at_eof(&self.buf),
                    None => Ok(()),
                };
                self.parser = None;
                return result.map(|()| None);
            }
        }
    }

    async fn fill(&mut self) -> Result<usize, Error> {
        let read_timeout = self.read_timeout;
        let spare = self.buf.spare_mut()?;
        loop {
            let result = match read_timeout {
                Some(timeout) => match tokio::time::timeout(timeout, self.reader.read(spare)).await {
                    Ok(result) => result,
                    Err(_) => {
                        debug!("read timed out after {:?}", timeout);
                        return Err(Error::TimedOut);
                    }
                },
                None => self.reader.read(spare).await,
            };
            match result {
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
