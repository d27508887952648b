//! tokio_request_parser - Tokio integration for shiguredo_request_parser
//!
//! tokio を使用した非同期リクエストリーダーとサーバー。
//!
//! ## Features
//!
//! - `server` - TCP サーバー機能 (デフォルト有効)
//!
//! ## 特徴
//!
//! - **shiguredo_request_parser ベース**: Sans I/O パーサーをそのまま非同期 I/O で駆動する
//! - **タイムアウト**: 1 回の読み取りごとのタイムアウトと、リクエスト全体の期限
//! - **パイプライン対応**: 1 接続で連続して送られたリクエストを順に読み取る
//!
//! ## リーダー
//!
//! ```ignore
//! use std::time::Duration;
//!
//! use tokio_request_parser::AsyncRequestReader;
//!
//! let mut reader = AsyncRequestReader::new(stream).read_timeout(Some(Duration::from_secs(5)));
//! while let Some(request) = reader.next_request().await? {
//!     println!("{} {}", request.method(), request.target());
//! }
//! ```
//!
//! ## サーバー
//!
//! ```ignore
//! use std::net::SocketAddr;
//!
//! use tokio_request_parser::{Request, Server};
//!
//! async fn handler(request: Request, peer: SocketAddr) {
//!     println!("{} {} from {}", request.method(), request.target(), peer);
//! }
//!
//! let server = Server::bind("0.0.0.0:42069").await?;
//! server.serve(handler).await?;
//! ```

pub mod error;
pub mod reader;
#[cfg(feature = "server")]
pub mod server;

pub use error::{Error, Result};
pub use reader::AsyncRequestReader;
#[cfg(feature = "server")]
pub use server::{Handler, Server};

// shiguredo_request_parser の型を re-export
pub use shiguredo_request_parser::{ParserLimits, Request};
