//! ドライバー用の読み取りバッファ

use crate::error::Error;
use crate::limits::ParserLimits;
use crate::log::trace;

/// 読み取りバッファ
///
/// 先頭から `len` バイトが有効なデータ。消費したバイトは [`consume`](Self::consume) で
/// 取り除き、残りを先頭に詰める。空きがなくなった場合は `max_buffer_size` まで倍々で拡張する。
#[derive(Debug, Clone)]
pub struct ReadBuffer {
    buf: Vec<u8>,
    len: usize,
    initial_size: usize,
    max_size: usize,
}

impl ReadBuffer {
    /// 制限設定からバッファを作成
    pub fn new(limits: &ParserLimits) -> Self {
        let initial_size = limits.initial_buffer_size.min(limits.max_buffer_size);
        Self {
            buf: vec![0; initial_size],
            len: 0,
            initial_size,
            max_size: limits.max_buffer_size,
        }
    }

    /// 有効なデータ
    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// 有効なデータのバイト数
    pub fn len(&self) -> usize {
        self.len
    }

    /// 有効なデータがないか確認
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 現在の容量
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// 先頭の `n` バイトを取り除き、残りを先頭に詰める
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.len);
        self.buf.copy_within(n..self.len, 0);
        self.len -= n;
    }

    /// 読み取り先の空き領域を取得
    ///
    /// 空きがない場合は拡張する。上限に達している場合は `BufferCapacityExceeded`。
    pub fn spare_mut(&mut self) -> Result<&mut [u8], Error> {
        if self.len == self.buf.len() {
            self.grow()?;
        }
        Ok(&mut self.buf[self.len..])
    }

    /// 空き領域に書き込んだ `n` バイトを有効にする
    pub fn commit(&mut self, n: usize) {
        debug_assert!(self.len + n <= self.buf.len());
        self.len = (self.len + n).min(self.buf.len());
    }

    fn grow(&mut self) -> Result<(), Error> {
        let current = self.buf.len();
        if current >= self.max_size {
            return Err(Error::BufferCapacityExceeded {
                size: current.saturating_add(1),
                limit: self.max_size,
            });
        }
        let new_size = current
            .saturating_mul(2)
            .max(self.initial_size)
            .max(current + 1)
            .min(self.max_size);
        trace!("grow buffer: {} -> {}", current, new_size);
        self.buf.resize(new_size, 0);
        Ok(())
    }
}
