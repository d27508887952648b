//! # shiguredo_request_parser
//!
//! 再開可能な HTTP/1.1 リクエストパーサー (Sans I/O)
//!
//! ## 特徴
//!
//! - **再開可能**: 任意に分割されたバイト列を何度でも投入でき、分割のされ方によらず同じ結果になる
//! - **Sans I/O**: パーサーは I/O を行わず、ブロックもしない
//! - **型付きエラー**: 失敗はすべて [`Error`] として返し、パニックしない
//! - **パイプライン対応**: 宣言された長さを超えたバイトは消費しない
//!
//! ## 使い方
//!
//! ### パーサーに直接投入する
//!
//! ```rust
//! use shiguredo_request_parser::{ParseState, RequestParser};
//!
//! let mut parser = RequestParser::new();
//! let data = b"GET /path HTTP/1.1\r\nHost: a\r\nContent-Length: 5\r\n\r\nhello";
//! let consumed = parser.feed(data).unwrap();
//! assert_eq!(consumed, data.len());
//! assert_eq!(parser.state(), ParseState::Done);
//!
//! let request = parser.into_request().unwrap();
//! assert_eq!(request.method(), "GET");
//! assert_eq!(request.header("host"), Some("a"));
//! assert_eq!(request.body(), b"hello");
//! ```
//!
//! ### ストリームから読み取る
//!
//! ```rust
//! use shiguredo_request_parser::RequestReader;
//!
//! let stream = &b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n"[..];
//! let mut reader = RequestReader::new(stream);
//! assert_eq!(reader.next_request().unwrap().unwrap().target(), "/a");
//! assert_eq!(reader.next_request().unwrap().unwrap().target(), "/b");
//! assert!(reader.next_request().unwrap().is_none());
//! ```

mod buffer;
mod driver;
mod error;
mod limits;
mod log;
mod parser;

pub use buffer::ReadBuffer;
pub use driver::{RequestReader, parse_from_stream, parse_from_stream_with_limits};
pub use error::Error;
pub use limits::ParserLimits;
pub use parser::{
    BodyKind, BodyReader, HTTP_VERSION, HeaderProgress, Headers, HeadersIter, ParseState, Request,
    RequestLine, RequestParser, parse_request_line,
};
