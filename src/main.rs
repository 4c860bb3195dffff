use std::env;

#[tokio::main]
async fn main() {
    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            if let Err(e) = chronowealth::api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("simulate") => {
            let mut args = vec![raw_args[0].clone()];
            args.extend(raw_args[2..].iter().cloned());
            if let Err(e) = chronowealth::api::run_simulate_cli(&args) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        _ => {
            eprintln!("Usage: cargo run -- serve [port]");
            eprintln!("       cargo run -- simulate --initial-wealth <n> --monthly-contribution <n> [options]");
            std::process::exit(1);
        }
    }
}
