fn main() {
    if let Err(e) = trigger_rate_monitor::cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
