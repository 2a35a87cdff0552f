//! Console output stream.
//!
//! The console carries the human-readable report that CI log scrapers parse.
//! It is separate from tracing output, which goes to stderr.

/// Line-oriented output sink.
pub trait Console: Send + Sync {
    fn line(&self, text: &str);

    fn lines(&self, lines: &[String]) {
        for line in lines {
            self.line(line);
        }
    }
}

/// Writes lines to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn line(&self, text: &str) {
        println!("{}", text);
    }
}
