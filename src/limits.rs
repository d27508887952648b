/// パーサーとドライバーの制限設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserLimits {
    /// 読み取りバッファの初期サイズ (デフォルト: 1KB)
    pub initial_buffer_size: usize,
    /// 最大バッファサイズ (デフォルト: 64KB)
    ///
    /// 読み取りバッファはこのサイズまで倍々で拡張される。
    pub max_buffer_size: usize,
    /// リクエストライン / ヘッダー行の最大長 (CRLF を除く、デフォルト: 8KB)
    pub max_line_size: usize,
    /// 最大ヘッダー数 (デフォルト: 100)
    pub max_headers_count: usize,
    /// 最大ボディサイズ (デフォルト: 10MB)
    pub max_body_size: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            initial_buffer_size: 1024,
            max_buffer_size: 64 * 1024, // 64KB
            max_line_size: 8 * 1024,    // 8KB
            max_headers_count: 100,
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl ParserLimits {
    /// 制限なしの設定を作成
    pub fn unlimited() -> Self {
        Self {
            initial_buffer_size: 1024,
            max_buffer_size: usize::MAX,
            max_line_size: usize::MAX,
            max_headers_count: usize::MAX,
            max_body_size: usize::MAX,
        }
    }
}
