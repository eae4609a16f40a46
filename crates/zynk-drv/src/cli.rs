//! Command-line argument handling.
//!
//! Argument recognition is a contiguous-substring scan over each raw
//! argument: anything containing `.zk` is the script path, anything
//! containing `help`, `version` or `init` sets the matching flag. The
//! `.zk` test wins when both would match, and `--file` spellings do not
//! count toward the argument total.

use std::fs;

use zynk_util::{Result, ZynkError};

/// The script written by `zynk init`.
const TEMPLATE: &str = "def main() -> null {\n    println(\"Hello Pimpki!\");\n}\nmain();";

/// The recognized command-line arguments.
#[derive(Debug, Default)]
pub struct Arguments {
    /// How many arguments count toward the too-many check.
    pub count: usize,
    /// Path of the script to interpret, when one was given.
    pub file_path: String,
    /// Show the help banner.
    pub help: bool,
    /// Show the interpreter version.
    pub version: bool,
    /// Write the template script.
    pub init: bool,
}

impl Arguments {
    /// Scans the raw argument list.
    pub fn parse(raw_args: &[String]) -> Self {
        let mut args = Arguments {
            count: raw_args.len(),
            ..Arguments::default()
        };

        for arg in raw_args {
            if arg.contains(".zk") {
                args.file_path = arg.clone();
            } else if arg.contains("help") {
                args.help = true;
            } else if arg.contains("version") {
                args.version = true;
            } else if arg.contains("init") {
                args.init = true;
            } else if arg.contains("--file") {
                args.count -= 1;
            }
        }
        args
    }

    /// True when nothing recognizable was given.
    pub fn is_empty(&self) -> bool {
        self.file_path.is_empty() && !self.help && !self.version && !self.init
    }

    /// Validates the invocation before dispatching.
    pub fn checkout(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ZynkError::cli("No argument was given. Consider using --help."));
        }
        if self.count >= 2 {
            return Err(ZynkError::cli("Too many arguments."));
        }
        Ok(())
    }
}

/// Prints the help banner.
pub fn print_help() {
    println!();
    println!("<----- Zynk Help ----->");
    println!("Zynk - A simple interpreted programming language, written in Rust.");
    println!();
    println!("Example Usage:\n >> zynk main.zk\n");
    println!(
        "Arguments:\n \
         --file <path>: Specifies the path to the script file that you want to interpret.\n \
         --init: Initializes a basic script file template in the current directory.\n \
         --version: Displays the current version of Zynk interpreter.\n \
         --help: Displays this help message."
    );
}

/// Writes the `main.zk` template into the current directory.
pub fn run_init() -> Result<()> {
    fs::write("main.zk", TEMPLATE)
        .map_err(|_| ZynkError::file_open("Failed to create a main.zk file."))?;
    println!("Successfully created a new main.zk file.");
    Ok(())
}
