// Pose Recorder 🚀 AGPL-3.0 License

use std::path::Path;

use crate::cli::args::Cli;
use crate::cli::logging::format_elapsed;
use crate::error::Result;
use crate::session::{Session, SessionReport};
use crate::source::Source;
use crate::{VERSION, info, section, success, verbose};

/// Run a record or compare session from parsed command-line arguments.
///
/// Argument and configuration problems are reported before the pose source is
/// opened, and for `compare` the reference is loaded before capture begins.
///
/// # Errors
///
/// Returns any error from argument checking, configuration, the pose source,
/// capture, or saving.
pub fn run_session(args: &Cli) -> Result<SessionReport> {
    args.check_required()?;
    let config = args.session_config()?;

    println!("Pose Recorder {VERSION} 🚀 {} {}", args.command, config.pose_model);
    verbose!("Recordings root: {}", config.recordings_root.display());

    let session = Session::new(config)?;
    let mut source = Source::from(args.source.as_str()).open()?;

    let report = if args.command.needs_reference() {
        let data = args.data.as_deref().unwrap_or_else(|| Path::new(""));
        session.compare(source.as_mut(), data)?
    } else {
        let folder = args.folder.as_deref().unwrap_or_default();
        session.record(source.as_mut(), folder, &args.patient)?
    };

    print_report(&report);
    Ok(report)
}

fn print_report(report: &SessionReport) {
    section!("Session summary");
    info!("Time taken: {}", format_elapsed(report.elapsed));
    info!("Skeletons collected: {}", report.frames);

    if let Some(path) = &report.saved_to {
        success!("Recording saved to {}", path.display());
    }
    if let Some(summary) = &report.comparison {
        info!("Comparison: {summary}");
    }
}
