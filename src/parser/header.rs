//! ヘッダーブロックのパースとヘッダーコレクション

use crate::error::Error;
use crate::limits::ParserLimits;

use super::syntax::{CRLF, check_line_size, find_line, is_token, is_valid_field_value};

/// ヘッダーコレクション
///
/// 名前は小文字に正規化して保持する。同じ名前のヘッダーは
/// RFC 9110 Section 5.3 に従い `", "` で連結して 1 つの値にまとめる。
/// 反復順は最初に現れた順で決定的。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

/// ヘッダー行 1 行分のパース結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderProgress {
    /// CRLF がまだない (データ不足)
    NeedMoreData,
    /// ヘッダーを 1 つ読み取った
    Field { consumed: usize },
    /// 空行を読み取った (ヘッダーブロック終了)
    Complete { consumed: usize },
}

impl Headers {
    /// 空のコレクションを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// ヘッダーが存在するか確認
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// ヘッダーを追加
    ///
    /// 既に同じ名前がある場合は値を `", "` で連結する
    pub fn append(&mut self, name: &str, value: &str) {
        if let Some((_, existing)) = self
            .fields
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            existing.push_str(", ");
            existing.push_str(value);
        } else {
            self.fields
                .push((name.to_ascii_lowercase(), value.to_string()));
        }
    }

    /// 異なるヘッダー名の数
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 空か確認
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// すべての (名前, 値) を順に返す
    pub fn iter(&self) -> HeadersIter<'_> {
        HeadersIter {
            inner: self.fields.iter(),
        }
    }

    /// すべての (名前, 値) に対して関数を呼ぶ
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &str),
    {
        for (name, value) in self.iter() {
            visit(name, value);
        }
    }

    /// Content-Length を取得
    ///
    /// 値が正の整数でない場合 (未指定、数値でない、0) は `None` を返す。
    pub fn content_length(&self) -> Option<usize> {
        self.get("content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|len| *len > 0)
    }

    /// ヘッダー行を 1 行パースしてコレクションに追加
    ///
    /// `buf` は未消費のバッファ先頭から渡す
    pub fn parse_line(
        &mut self,
        buf: &[u8],
        limits: &ParserLimits,
    ) -> Result<HeaderProgress, Error> {
        let Some(pos) = find_line(buf) else {
            check_line_size(buf.len(), false, limits.max_line_size)?;
            return Ok(HeaderProgress::NeedMoreData);
        };
        if pos == 0 {
            return Ok(HeaderProgress::Complete {
                consumed: CRLF.len(),
            });
        }
        check_line_size(pos, true, limits.max_line_size)?;

        let line = std::str::from_utf8(&buf[..pos])
            .map_err(|e| Error::MalformedHeaderLine(format!("invalid UTF-8: {e}")))?;
        let (name, value) = parse_field(line)?;

        if !self.contains(name) && self.fields.len() >= limits.max_headers_count {
            return Err(Error::TooManyHeaders {
                count: self.fields.len() + 1,
                limit: limits.max_headers_count,
            });
        }
        self.append(name, value);

        Ok(HeaderProgress::Field {
            consumed: pos + CRLF.len(),
        })
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = HeadersIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// [`Headers::iter`] が返すイテレーター
#[derive(Debug, Clone)]
pub struct HeadersIter<'a> {
    inner: std::slice::Iter<'a, (String, String)>,
}

impl<'a> Iterator for HeadersIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// `field-name ":" OWS field-value OWS` をパース
///
/// 最初の ':' で名前と値を分ける。値には ':' を含めてよい (例: `Host: localhost:42069`)。
fn parse_field(line: &str) -> Result<(&str, &str), Error> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| Error::MalformedHeaderLine("missing colon".to_string()))?;

    // 名前の前後の空白 (obs-fold を含む) は許可しない
    if !is_token(name) {
        return Err(Error::MalformedHeaderLine(format!(
            "invalid field name: {:?}",
            name
        )));
    }

    let value = value.trim_matches(|c: char| c == ' ' || c == '\t');
    if !is_valid_field_value(value) {
        return Err(Error::MalformedHeaderLine(
            "invalid field value (contains control characters)".to_string(),
        ));
    }

    Ok((name, value))
}
