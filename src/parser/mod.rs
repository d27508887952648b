//! HTTP/1.1 リクエストパーサーモジュール
//!
//! Sans I/O 設計に基づく再開可能なパーサーを提供。
//!
//! - [`parse_request_line`]: リクエストライン
//! - [`Headers::parse_line`]: ヘッダー行 (1 回の呼び出しで最大 1 行)
//! - [`BodyReader`]: Content-Length による固定長ボディ
//! - [`RequestParser`]: 上記をまとめる状態機械
//!
//! ## 使い方
//!
//! ```rust
//! use shiguredo_request_parser::{ParseState, RequestParser};
//!
//! let mut parser = RequestParser::new();
//! let mut buf = Vec::new();
//!
//! for chunk in [&b"POST / HTTP/1.1\r\nContent-"[..], b"Length: 5\r\n\r\nhel", b"lo"] {
//!     buf.extend_from_slice(chunk);
//!     let consumed = parser.feed(&buf).unwrap();
//!     buf.drain(..consumed);
//! }
//!
//! assert_eq!(parser.state(), ParseState::Done);
//! assert_eq!(parser.request().unwrap().body(), b"hello");
//! ```

mod body;
mod header;
mod request;
mod request_line;
mod state;
mod syntax;

// 公開 API
pub use body::{BodyKind, BodyReader};
pub use header::{HeaderProgress, Headers, HeadersIter};
pub use request::{Request, RequestParser};
pub use request_line::{HTTP_VERSION, RequestLine, parse_request_line};
pub use state::ParseState;
