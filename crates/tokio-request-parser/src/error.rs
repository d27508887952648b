//! tokio-request-parser エラー型

use std::fmt;

/// tokio-request-parser エラー
#[derive(Debug)]
pub enum Error {
    /// I/O エラー (バインドや接続の受け付け)
    Io(std::io::Error),
    /// リクエストの読み取りエラー
    Parse(shiguredo_request_parser::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Parse(e) => write!(f, "request error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<shiguredo_request_parser::Error> for Error {
    fn from(e: shiguredo_request_parser::Error) -> Self {
        Error::Parse(e)
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
