//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// トークン / ヘッダー生成
// ========================================

/// tchar のみからなるトークン
pub fn token(max_len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            prop::char::range('a', 'z'),
            prop::char::range('A', 'Z'),
            prop::char::range('0', '9'),
            Just('-'),
            Just('_'),
            Just('.'),
            Just('!'),
            Just('~'),
        ],
        1..=max_len,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// ボディ関連以外のヘッダー名
pub fn header_name() -> impl Strategy<Value = String> {
    token(24).prop_filter("body headers are generated separately", |name| {
        !name.eq_ignore_ascii_case("content-length")
            && !name.eq_ignore_ascii_case("transfer-encoding")
    })
}

/// 前後に空白を持たない可視 ASCII のヘッダー値
pub fn header_value() -> impl Strategy<Value = String> {
    "[!-~]([ -~]{0,30}[!-~])?".prop_map(|s| s)
}

pub fn method() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("GET".to_string()),
        Just("POST".to_string()),
        Just("PUT".to_string()),
        Just("DELETE".to_string()),
        Just("PATCH".to_string()),
        token(10),
    ]
}

pub fn target() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/".to_string()),
        Just("*".to_string()),
        "/[a-zA-Z0-9/_.~-]{1,48}(\\?[a-z0-9=&]{1,16})?".prop_map(|s| s),
    ]
}

// ========================================
// リクエスト生成
// ========================================

/// 生成したリクエストの元データ
#[derive(Debug, Clone)]
pub struct GeneratedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl GeneratedRequest {
    /// ワイヤーフォーマットにエンコード
    ///
    /// ボディが空でない場合のみ Content-Length を付与する
    pub fn encode(&self) -> Vec<u8> {
        let mut out = format!("{} {} HTTP/1.1\r\n", self.method, self.target).into_bytes();
        for (name, value) in &self.headers {
            out.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        if !self.body.is_empty() {
            out.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }

    /// 名前を小文字にし、重複を ", " で連結した期待値
    pub fn expected_headers(&self) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = Vec::new();
        let body_len = (!self.body.is_empty())
            .then(|| ("Content-Length".to_string(), self.body.len().to_string()));
        for (name, value) in self.headers.iter().cloned().chain(body_len) {
            let name = name.to_ascii_lowercase();
            match merged.iter_mut().find(|(n, _)| *n == name) {
                Some((_, existing)) => {
                    existing.push_str(", ");
                    existing.push_str(&value);
                }
                None => merged.push((name, value)),
            }
        }
        merged
    }
}

pub fn generated_request() -> impl Strategy<Value = GeneratedRequest> {
    (
        method(),
        target(),
        proptest::collection::vec((header_name(), header_value()), 0..8),
        proptest::collection::vec(any::<u8>(), 0..128),
    )
        .prop_map(|(method, target, headers, body)| GeneratedRequest {
            method,
            target,
            headers,
            body,
        })
}

// ========================================
// 分割位置生成
// ========================================

/// `len` バイトのデータを 1 つ以上の空でない断片に分ける位置 (昇順、重複なし)
pub fn split_points(len: usize) -> impl Strategy<Value = Vec<usize>> {
    let candidates: Vec<usize> = (1..len).collect();
    proptest::sample::subsequence(candidates.clone(), 0..=candidates.len())
}

/// 分割位置に従ってデータを断片に分ける
pub fn fragments<'a>(data: &'a [u8], cuts: &[usize]) -> Vec<&'a [u8]> {
    let mut out = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for &end in cuts {
        out.push(&data[start..end]);
        start = end;
    }
    out.push(&data[start..]);
    out
}
