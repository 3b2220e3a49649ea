use std::io::Write;

use crate::error::ProvisionError;

/// Console progress output.
///
/// Every line is prefixed with a status marker: `[*]` for a step that is
/// about to run, `[+]` for success, `[-]` for failure, `[i]` for an
/// expected condition that is not an error and `[!]` for a hint.
/// Write failures on the console are ignored.
pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, marker: &str, message: &str) {
        writeln!(self.out, "{marker} {message}").ok();
    }

    /// Empty line between workflow stages.
    pub fn section(&mut self) {
        writeln!(self.out).ok();
    }

    pub fn step(&mut self, message: impl AsRef<str>) {
        self.line("[*]", message.as_ref());
    }

    pub fn success(&mut self, message: impl AsRef<str>) {
        self.line("[+]", message.as_ref());
    }

    pub fn failure(&mut self, message: impl AsRef<str>) {
        self.line("[-]", message.as_ref());
    }

    pub fn note(&mut self, message: impl AsRef<str>) {
        self.line("[i]", message.as_ref());
    }

    pub fn hint(&mut self, message: impl AsRef<str>) {
        self.line("[!]", message.as_ref());
    }

    /// Summary block: an `[INFO]` heading followed by indented lines.
    pub fn info_block<I, S>(&mut self, title: &str, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        writeln!(self.out, "\n[INFO] {title}").ok();
        for line in lines {
            writeln!(self.out, "   {}", line.as_ref()).ok();
        }
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.line("[INFO]", message.as_ref());
    }

    /// Fatal error with HTTP status and body when the server sent one.
    pub fn error(&mut self, err: &ProvisionError) {
        self.section();
        self.failure(format!("Error: {err}"));
        if let Some(status) = err.status() {
            writeln!(self.out, "   Status: {status}").ok();
        }
        if let Some(body) = err.body() {
            writeln!(self.out, "   Body: {body}").ok();
        }
        self.out.flush().ok();
    }
}
