//! Log destinations

use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;

use super::config::LogOutput;

/// Writer for `output` and whether it is an interactive terminal
pub(crate) fn make_writer(output: &LogOutput) -> io::Result<(BoxMakeWriter, bool)> {
    match output {
        LogOutput::Stdout => Ok((BoxMakeWriter::new(io::stdout), io::stdout().is_terminal())),
        LogOutput::Stderr => Ok((BoxMakeWriter::new(io::stderr), io::stderr().is_terminal())),
        LogOutput::File { path, append } => {
            let file = open_log_file(path, *append)?;
            Ok((BoxMakeWriter::new(Mutex::new(file)), false))
        }
    }
}

fn open_log_file(path: &Path, append: bool) -> io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
}
