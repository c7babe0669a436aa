//! Binary entrypoint for fontctl

fn main() {
    if let Err(err) = fontctl_cli::run() {
        eprintln!("Error - {err:#}");
        std::process::exit(1);
    }
}
