#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shiguredo_request_parser::{ParserLimits, RequestParser};

#[derive(Arbitrary, Debug)]
struct Input {
    data: Vec<u8>,
    /// 分割位置 (data の長さで剰余を取る)
    cuts: Vec<u16>,
    max_line_size: u8,
}

fuzz_target!(|input: Input| {
    let limits = ParserLimits {
        max_line_size: usize::from(input.max_line_size).max(16),
        ..ParserLimits::default()
    };

    // 一括で投入
    let mut whole = RequestParser::with_limits(limits.clone());
    let whole_result = whole.feed(&input.data);

    // 分割して投入
    let mut cuts: Vec<usize> = input
        .cuts
        .iter()
        .map(|c| usize::from(*c) % (input.data.len() + 1))
        .collect();
    cuts.sort_unstable();
    cuts.push(input.data.len());

    let mut split = RequestParser::with_limits(limits);
    let mut pending = Vec::new();
    let mut split_consumed = 0;
    let mut split_ok = true;
    let mut start = 0;
    for end in cuts {
        pending.extend_from_slice(&input.data[start..end]);
        start = end;
        match split.feed(&pending) {
            Ok(n) => {
                pending.drain(..n);
                split_consumed += n;
            }
            Err(_) => {
                split_ok = false;
                break;
            }
        }
    }

    // 分割のされ方によらず同じ結果になる
    assert_eq!(whole_result.is_ok(), split_ok);
    assert_eq!(whole.state(), split.state());
    if let Ok(n) = whole_result {
        assert_eq!(n, split_consumed);
        assert_eq!(whole.request(), split.request());
    }
});
