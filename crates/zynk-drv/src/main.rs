//! The `zynk` binary.
//!
//! Dispatch order: validate the argument list, then `help` / `version` /
//! `init`, and finally interpret the script. Diagnostics go to stderr in
//! the `Error[<Kind>]: ...` format; the exit code is 0 on success and -1
//! when an error was reported. Panics escaping the pipeline are reported
//! as `PanicError` rather than crashing with a backtrace.

mod cli;

use std::any::Any;
use std::env;
use std::panic;
use std::path::Path;
use std::process;

use tracing_subscriber::EnvFilter;
use zynk_eval::Interpreter;
use zynk_util::{Result, ZynkError};

use cli::Arguments;

fn main() {
    init_logging();

    let raw_args: Vec<String> = env::args().skip(1).collect();
    let code = match run(&raw_args) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("{error}");
            -1
        }
    };
    process::exit(code);
}

/// Initializes the tracing subscriber; verbosity comes from `ZYNK_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_env("ZYNK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(raw_args: &[String]) -> Result<()> {
    let args = Arguments::parse(raw_args);
    args.checkout()?;

    if args.help {
        cli::print_help();
        return Ok(());
    }
    if args.version {
        println!("Version: {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if args.init {
        return cli::run_init();
    }

    tracing::debug!(script = %args.file_path, "interpreting script");
    interpret_script(Path::new(&args.file_path))
}

/// Runs the interpreter, converting any escaped panic into a `PanicError`.
fn interpret_script(path: &Path) -> Result<()> {
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let outcome = panic::catch_unwind(|| Interpreter::new().interpret_file(path));
    panic::set_hook(previous_hook);

    match outcome {
        Ok(result) => result,
        Err(payload) => Err(ZynkError::panic(format!(
            "The interpreter unexpectedly panicked. Additional info: \"{}\".",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown cause".to_owned()
    }
}
