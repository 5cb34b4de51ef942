// Pose Recorder 🚀 AGPL-3.0 License

use std::process;

use clap::Parser;

use pose_recorder::cli::args::Cli;
use pose_recorder::cli::logging::set_verbose;
use pose_recorder::cli::run::run_session;

fn main() {
    let args = Cli::parse();
    set_verbose(args.verbose);

    if let Err(e) = run_session(&args) {
        pose_recorder::error!("{e}");
        process::exit(1);
    }
}
