//! パース状態の定義

/// パース状態
///
/// `Done` と `Error` は終端状態で、以降の入力で状態は変化しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseState {
    /// リクエストライン待ち
    Init,
    /// ヘッダー待ち
    Headers,
    /// ボディ読み取り中 (Content-Length)
    Body,
    /// 完了
    Done,
    /// エラー
    Error,
}

impl ParseState {
    /// 終端状態か確認
    pub fn is_terminal(self) -> bool {
        match self {
            ParseState::Done | ParseState::Error => true,
            ParseState::Init | ParseState::Headers | ParseState::Body => false,
        }
    }
}
