use kchain_core::{info, log::init_logger};
use kchaind_lib::{args::parse_args, daemon};

pub fn main() {
    let args = parse_args();

    if let Err(err) = init_logger(args.log_dir(), &args.log_level) {
        eprintln!("Logging disabled: {err}");
    }

    // The exit status only reports input/output failures; failed requests are part of the protocol
    let status = match daemon::run(&args) {
        Ok(_) => 0,
        Err(_) => 1,
    };
    info!("Kchaind has stopped...");
    std::process::exit(status);
}
