//! リクエストを受け付けるサーバー
//!
//! 接続ごとにタスクを起動し、読み取ったリクエストを順にハンドラーへ渡す。
//! レスポンスは送信しない。
//!
//! ## 使い方
//!
//! ```ignore
//! use std::net::SocketAddr;
//! use std::time::Duration;
//!
//! use tokio_request_parser::{Request, Server};
//!
//! async fn handler(request: Request, peer: SocketAddr) {
//!     println!("{} {} from {}", request.method(), request.target(), peer);
//! }
//!
//! let server = Server::bind("0.0.0.0:42069").await?
//!     .read_timeout(Duration::from_secs(30));
//! server.serve(handler).await?;
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{Level, debug, info, log};
use shiguredo_request_parser::{ParserLimits, Request};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::reader::AsyncRequestReader;

/// リクエストハンドラー
pub trait Handler: Send + Sync + 'static {
    /// 読み取ったリクエストを処理する
    fn handle(&self, request: Request, peer_addr: SocketAddr) -> impl Future<Output = ()> + Send;
}

/// 関数からハンドラーを作成
impl<F, Fut> Handler for F
where
    F: Fn(Request, SocketAddr) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    fn handle(&self, request: Request, peer_addr: SocketAddr) -> impl Future<Output = ()> + Send {
        (self)(request, peer_addr)
    }
}

/// リクエストを受け付けるサーバー
pub struct Server {
    listener: TcpListener,
    read_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    limits: ParserLimits,
}

impl Server {
    /// 指定アドレスにバインド
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            read_timeout: Some(Duration::from_secs(60)),
            request_timeout: None,
            limits: ParserLimits::default(),
        })
    }

    /// 1 回の読み取りのタイムアウトを設定
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// 1 リクエストを読み終えるまでの期限を設定
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// パーサーの制限を設定
    pub fn limits(mut self, limits: ParserLimits) -> Self {
        self.limits = limits;
        self
    }

    /// ローカルアドレスを取得
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// サーバーを起動
    pub async fn serve<H: Handler>(self, handler: H) -> Result<()> {
        let config = Arc::new(self.connection_config());
        let handler = Arc::new(handler);
        info!("listening on {}", self.listener.local_addr()?);

        loop {
            let (stream, peer_addr) = self.listener.accept().await?;
            let config = config.clone();
            let handler = handler.clone();

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, peer_addr, config, handler).await {
                    log!(
                        connection_error_level(&e),
                        "connection error from {}: {}",
                        peer_addr,
                        e
                    );
                }
            });
        }
    }

    /// 接続を 1 つだけ受け付けて処理する
    ///
    /// 相手がリクエストの境界で接続を閉じると `Ok(())` を返す。
    /// 読み取りに失敗した場合はそのエラーを返す。
    pub async fn handle_one<H: Handler>(self, handler: H) -> Result<()> {
        let (stream, peer_addr) = self.listener.accept().await?;
        let config = Arc::new(self.connection_config());
        handle_connection(stream, peer_addr, config, Arc::new(handler)).await
    }

    fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            read_timeout: self.read_timeout,
            request_timeout: self.request_timeout,
            limits: self.limits.clone(),
        }
    }
}

/// 接続エラーのログレベル
///
/// 不正なリクエストは `Error`、タイムアウトや切断などの転送エラーは `Warn`
fn connection_error_level(e: &Error) -> Level {
    match e {
        Error::Parse(e) if e.is_parse_error() => Level::Error,
        Error::Io(_) | Error::Parse(_) => Level::Warn,
    }
}

struct ConnectionConfig {
    read_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    limits: ParserLimits,
}

/// 接続を処理
///
/// 相手がリクエストの境界で接続を閉じた場合は `Ok(())`
async fn handle_connection<H: Handler>(
    stream: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<ConnectionConfig>,
    handler: Arc<H>,
) -> Result<()> {
    debug!("accepted connection from {}", peer_addr);
    let mut reader = AsyncRequestReader::with_limits(stream, config.limits.clone())
        .read_timeout(config.read_timeout);

    loop {
        let next = match config.request_timeout {
            Some(timeout) => reader.next_request_until(Instant::now() + timeout).await,
            None => reader.next_request().await,
        };
        let Some(request) = next? else {
            debug!("connection closed by {}", peer_addr);
            return Ok(());
        };
        debug!(
            "request from {}: {} {}",
            peer_addr,
            request.method(),
            request.target()
        );
        handler.handle(request, peer_addr).await;
    }
}
