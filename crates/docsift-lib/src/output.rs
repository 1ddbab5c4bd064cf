use std::io::{Stderr, Stdout, Write};

/// Where commands write their output. Lets tests capture what a command
/// printed.
pub trait ConsoleIO<OUT: Write, ERR: Write> {
    fn stdout(&mut self) -> &mut OUT;
    fn stderr(&mut self) -> &mut ERR;
}

/// The process's real stdout and stderr.
pub struct StdIO {
    stdout: Stdout,
    stderr: Stderr,
}

impl StdIO {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdout: std::io::stdout(),
            stderr: std::io::stderr(),
        }
    }
}

impl Default for StdIO {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleIO<Stdout, Stderr> for StdIO {
    fn stdout(&mut self) -> &mut Stdout {
        &mut self.stdout
    }

    fn stderr(&mut self) -> &mut Stderr {
        &mut self.stderr
    }
}

/// In-memory output for tests.
#[derive(Default)]
pub struct BufferedIO {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl BufferedIO {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout_to_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_to_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

impl ConsoleIO<Vec<u8>, Vec<u8>> for BufferedIO {
    fn stdout(&mut self) -> &mut Vec<u8> {
        &mut self.stdout
    }

    fn stderr(&mut self) -> &mut Vec<u8> {
        &mut self.stderr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_io_keeps_streams_apart() {
        let mut io = BufferedIO::new();
        writeln!(io.stdout(), "result").unwrap();
        writeln!(io.stderr(), "progress").unwrap();
        assert_eq!(io.stdout_to_string(), "result\n");
        assert_eq!(io.stderr_to_string(), "progress\n");
    }

    #[test]
    fn buffered_io_starts_empty() {
        let io = BufferedIO::new();
        assert!(io.stdout_to_string().is_empty());
        assert!(io.stderr_to_string().is_empty());
    }
}
