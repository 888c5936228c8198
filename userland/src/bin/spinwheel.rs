use std::io;
use std::process::ExitCode;

use clap::Parser;
use spinwheel_lib::klog_init;
use spinwheel_userland::{Cli, run};

fn main() -> ExitCode {
    klog_init();
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(&cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
