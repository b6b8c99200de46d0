//! Colored terminal output for the operator.
//!
//! Diagnostics go through `log`; this is what the person running the
//! release reads.

use std::io::{self, Write};
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    stdout: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.verbose, self.quiet)
    }
}

/// Marker printed before a message and how it is colored
struct Style {
    marker: &'static str,
    color: Color,
    tint_message: bool,
}

impl Style {
    const INFO: Style = Style { marker: "ℹ", color: Color::Cyan, tint_message: false };
    const SUCCESS: Style = Style { marker: "✓", color: Color::Green, tint_message: false };
    const WARN: Style = Style { marker: "⚠", color: Color::Yellow, tint_message: true };
    const ERROR: Style = Style { marker: "✗", color: Color::Red, tint_message: true };
    const VERBOSE: Style = Style { marker: "→", color: Color::Blue, tint_message: false };

    fn render(&self, buffer: &mut Buffer, message: &str) -> io::Result<()> {
        buffer.set_color(ColorSpec::new().set_fg(Some(self.color)).set_bold(true))?;
        write!(buffer, "{}", self.marker)?;
        buffer.reset()?;
        if self.tint_message {
            buffer.set_color(ColorSpec::new().set_fg(Some(self.color)))?;
        }
        writeln!(buffer, " {}", message)?;
        buffer.reset()
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            stdout: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    fn styled(&self, style: &Style, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut buffer = self.stdout.buffer();
        style.render(&mut buffer, message)?;
        self.stdout.print(&buffer)
    }

    fn plain(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut buffer = self.stdout.buffer();
        writeln!(buffer, "{}", text)?;
        self.stdout.print(&buffer)
    }

    /// Print an info message
    pub fn info(&self, message: &str) -> io::Result<()> {
        self.styled(&Style::INFO, message)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> io::Result<()> {
        self.styled(&Style::SUCCESS, message)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> io::Result<()> {
        self.styled(&Style::WARN, message)
    }

    /// Print an error message to stderr, even in quiet mode
    pub fn error(&self, message: &str) {
        let stderr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = stderr.buffer();
        let printed = Style::ERROR
            .render(&mut buffer, message)
            .and_then(|()| stderr.print(&buffer));
        if printed.is_err() {
            println!("✗ {}", message);
        }
    }

    /// Print a message only in verbose mode
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.styled(&Style::VERBOSE, message)
    }

    /// Print a question without a trailing newline, even in quiet mode
    pub fn prompt(&self, message: &str) -> io::Result<()> {
        let mut buffer = self.stdout.buffer();
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        write!(buffer, "?")?;
        buffer.reset()?;
        write!(buffer, " {} ", message)?;
        self.stdout.print(&buffer)
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut buffer = self.stdout.buffer();
        writeln!(buffer)?;
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        writeln!(buffer, "═══ {} ═══", title)?;
        buffer.reset()?;
        self.stdout.print(&buffer)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> io::Result<()> {
        self.plain(&format!("    {}", message))
    }

    /// Print a plain line
    pub fn println(&self, message: &str) -> io::Result<()> {
        self.plain(message)
    }
}
