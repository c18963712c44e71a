use clap::Parser;
use permcalc::cli::{self, exit_codes, output, Cli, OutputMode};
use permcalc::logging;

fn main() {
    // handle broken pipe gracefully (e.g., when piping to `head` or `jq` that exits early)
    reset_sigpipe();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too and are not failures
            let code = if e.use_stderr() {
                exit_codes::INVALID_ARGS
            } else {
                exit_codes::SUCCESS
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    logging::init(cli.verbose, cli.quiet);
    let output_mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet);

    if let Err(err) = cli::run(cli) {
        let code = cli::exit_code_for(&err);

        if output_mode.is_json() {
            let causes = err.chain().skip(1).map(|c| c.to_string()).collect();
            output::print_json_error(code, &err.to_string(), causes);
        }
        tracing::error!(code, "{:#}", err);

        std::process::exit(code);
    }
}

/// reset SIGPIPE to default behavior (terminate process) instead of panicking
/// this is the standard Unix behavior for CLI tools
fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
