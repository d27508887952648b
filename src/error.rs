use std::fmt;
use std::io;

/// リクエストパースエラー
///
/// パーサーとドライバーが返すエラーはすべてこの列挙型で表現される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 不正なリクエストライン
    MalformedRequestLine(String),
    /// 形式は正しいが HTTP/1.1 以外のバージョン
    UnsupportedHttpVersion(String),
    /// 不正なヘッダー行
    MalformedHeaderLine(String),
    /// 固定長以外のボディ転送方式 (Transfer-Encoding)
    UnsupportedBodyEncoding(String),
    /// エラー状態のパーサーへの再投入
    AlreadyFailed,
    /// 読み取り失敗 (途中でのストリーム終端を含む)
    ReadFailure { kind: io::ErrorKind, reason: String },
    /// バッファ上限超過 (行またはヘッダーが大きすぎる)
    BufferCapacityExceeded { size: usize, limit: usize },
    /// ヘッダー数超過
    TooManyHeaders { count: usize, limit: usize },
    /// ボディサイズ超過
    BodyTooLarge { size: usize, limit: usize },
    /// 読み取りタイムアウト
    TimedOut,
}

impl Error {
    /// ストリームが途中で終わった場合のエラーを作成
    pub fn unexpected_eof() -> Self {
        Error::ReadFailure {
            kind: io::ErrorKind::UnexpectedEof,
            reason: "stream ended before request completed".to_string(),
        }
    }

    /// パース段階のエラーか確認
    ///
    /// I/O 由来のエラー (`ReadFailure`, `TimedOut`) と `AlreadyFailed` は false
    pub fn is_parse_error(&self) -> bool {
        match self {
            Error::MalformedRequestLine(_)
            | Error::UnsupportedHttpVersion(_)
            | Error::MalformedHeaderLine(_)
            | Error::UnsupportedBodyEncoding(_)
            | Error::BufferCapacityExceeded { .. }
            | Error::TooManyHeaders { .. }
            | Error::BodyTooLarge { .. } => true,
            Error::AlreadyFailed | Error::ReadFailure { .. } | Error::TimedOut => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedRequestLine(msg) => write!(f, "malformed request-line: {}", msg),
            Error::UnsupportedHttpVersion(version) => {
                write!(f, "unsupported http version: {}", version)
            }
            Error::MalformedHeaderLine(msg) => write!(f, "malformed header line: {}", msg),
            Error::UnsupportedBodyEncoding(coding) => {
                write!(f, "unsupported body encoding: {}", coding)
            }
            Error::AlreadyFailed => write!(f, "request in error state"),
            Error::ReadFailure { kind, reason } => {
                write!(f, "read failure ({:?}): {}", kind, reason)
            }
            Error::BufferCapacityExceeded { size, limit } => {
                write!(f, "buffer capacity exceeded: {} > {}", size, limit)
            }
            Error::TooManyHeaders { count, limit } => {
                write!(f, "too many headers: {} > {}", count, limit)
            }
            Error::BodyTooLarge { size, limit } => {
                write!(f, "body too large: {} > {}", size, limit)
            }
            Error::TimedOut => write!(f, "read timed out"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            // ソケットの読み取りタイムアウトは環境により WouldBlock として返る
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::TimedOut,
            kind => Error::ReadFailure {
                kind,
                reason: e.to_string(),
            },
        }
    }
}
