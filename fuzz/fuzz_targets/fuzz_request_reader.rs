#![no_main]

use libfuzzer_sys::fuzz_target;
use shiguredo_request_parser::{ParserLimits, RequestReader};

fuzz_target!(|data: &[u8]| {
    let limits = ParserLimits {
        initial_buffer_size: 16,
        max_buffer_size: 4096,
        ..ParserLimits::default()
    };
    let mut reader = RequestReader::with_limits(data, limits);

    // パイプライン化されたリクエストをすべて読み取る (パニックしないこと)
    while let Ok(Some(request)) = reader.next_request() {
        let _ = request.headers().iter().count();
    }
});
