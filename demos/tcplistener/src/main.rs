//! 受信したリクエストを表示する TCP リスナー
//!
//! 使い方:
//!   cargo run -p tcplistener
//!
//!   # 別の端末から
//!   curl http://localhost:42069/coffee
//!
//! ログの既定レベルは info。詳細は `RUST_LOG=debug` で表示する。

use std::net::SocketAddr;
use std::time::Duration;

use shiguredo_request_parser::ParserLimits;
use tokio_request_parser::{Request, Server};

struct ListenerOptions {
    port: u16,
    read_timeout: Duration,
    max_buffer_size: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let options = parse_args()?;

    let limits = ParserLimits {
        max_buffer_size: options.max_buffer_size,
        ..ParserLimits::default()
    };
    let addr = format!("0.0.0.0:{}", options.port);
    let server = Server::bind(&addr)
        .await?
        .read_timeout(options.read_timeout)
        .limits(limits);

    println!("Listening on {}", addr);
    server.serve(print_request).await?;
    Ok(())
}

async fn print_request(request: Request, _peer_addr: SocketAddr) {
    let mut out = String::new();
    out.push_str("Request line:\n");
    out.push_str(&format!("- Method: {}\n", request.method()));
    out.push_str(&format!("- Target: {}\n", request.target()));
    out.push_str(&format!("- Version: {}\n", request.version()));
    out.push_str("Headers:\n");
    request.headers().for_each(|name, value| {
        out.push_str(&format!("- {}: {}\n", name, value));
    });
    if !request.body().is_empty() {
        out.push_str("Body:\n");
        out.push_str(&String::from_utf8_lossy(request.body()));
        out.push('\n');
    }
    // 1 リクエスト分をまとめて書き出す
    print!("{}", out);
}

fn parse_args() -> Result<ListenerOptions, Box<dyn std::error::Error>> {
    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "tcplistener";

    // --help フラグ
    noargs::HELP_FLAG.take_help(&mut args);

    // --version フラグ
    let version_flag: bool = noargs::flag("version")
        .short('V')
        .doc("Show version")
        .take(&mut args)
        .is_present();
    if version_flag {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    // --port オプション
    let port: u16 = noargs::opt("port")
        .short('p')
        .doc("Port to listen on")
        .default("42069")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // --read-timeout オプション (秒)
    let read_timeout: u64 = noargs::opt("read-timeout")
        .doc("Seconds to wait for each read before closing the connection")
        .default("60")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // --max-buffer-size オプション (バイト)
    let max_buffer_size: usize = noargs::opt("max-buffer-size")
        .doc("Maximum read buffer size in bytes")
        .default("65536")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // 未知の引数があればエラー、ヘルプが返されたら表示
    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        std::process::exit(0);
    }

    Ok(ListenerOptions {
        port,
        read_timeout: Duration::from_secs(read_timeout),
        max_buffer_size,
    })
}
