use std::io::{self, Write};

/// Text sink that script-level printing and backtraces write to.
#[derive(Debug)]
pub enum Output {
    Stdout,
    /// Everything written is kept in memory (tests and embedders).
    Captured(Vec<u8>),
}

impl Output {
    pub fn captured() -> Self {
        Output::Captured(Vec::new())
    }

    /// Captured text so far; empty for stdout.
    pub fn text(&self) -> String {
        match self {
            Output::Stdout => String::new(),
            Output::Captured(buf) => String::from_utf8_lossy(buf).into_owned(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout => io::stdout().write(buf),
            Output::Captured(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout => io::stdout().flush(),
            Output::Captured(_) => Ok(()),
        }
    }
}
