//! Shared colored output utilities for CLI commands.
//!
//! Uses `termcolor` for cross-platform colored terminal output.
//! Respects `NO_COLOR` environment variable and `--color` flag.

use std::io::Write;
use termcolor::{Buffer, Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled output writer.
pub struct StyledOutput<W: WriteColor = StandardStream> {
    out: W,
    choice: ColorChoice,
}

impl StyledOutput<StandardStream> {
    /// Styled stdout with the given color choice.
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            out: StandardStream::stdout(choice),
            choice,
        }
    }

    /// Write error message to stderr.
    pub fn stderr_error(&self, text: &str) {
        let mut stderr = StandardStream::stderr(self.choice);
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Red)).set_bold(true);
        let _ = stderr.set_color(&spec);
        let _ = writeln!(stderr, "{}", text);
        let _ = stderr.reset();
    }
}

impl StyledOutput<Buffer> {
    /// Uncolored in-memory output.
    pub fn buffer() -> Self {
        Self {
            out: Buffer::no_color(),
            choice: ColorChoice::Never,
        }
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(self.out.as_slice()).into_owned()
    }
}

impl<W: WriteColor> StyledOutput<W> {
    // ── Generic styled writes ────────────────────────────────────────

    /// Write text with a specific color and style.
    pub fn write_styled(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        let _ = self.out.set_color(&spec);
        let _ = write!(self.out, "{}", text);
        let _ = self.out.reset();
    }

    // ── Convenience helpers ──────────────────────────────────────────

    /// Green bold text.
    pub fn success(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Green), true);
    }

    /// Red bold text.
    pub fn error(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Red), true);
    }

    /// Yellow bold text.
    pub fn warning(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Yellow), true);
    }

    /// Cyan text.
    pub fn info(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Cyan), false);
    }

    /// Dim/gray text.
    pub fn dim(&mut self, text: &str) {
        self.write_styled(text, Some(Color::White), false);
    }

    /// Bold white text.
    pub fn bold(&mut self, text: &str) {
        self.write_styled(text, None, true);
    }

    /// Plain text (no color).
    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.out, "{}", text);
    }

    /// Newline.
    pub fn newline(&mut self) {
        let _ = writeln!(self.out);
    }

    /// Flush output.
    pub fn flush(&mut self) {
        let _ = self.out.flush();
    }

    // ── Badges ───────────────────────────────────────────────────────

    /// " BUILTIN " badge (blue background, white text).
    pub fn builtin_badge(&mut self) {
        self.badge(" BUILTIN ", Color::Blue, Color::White);
    }

    /// " OK " badge (green background, white text).
    pub fn ok_badge(&mut self) {
        self.badge(" OK ", Color::Green, Color::White);
    }

    /// " FAIL " badge (red background, white text).
    pub fn fail_badge(&mut self) {
        self.badge(" FAIL ", Color::Red, Color::White);
    }

    /// " INPUT " badge (yellow background, black text).
    pub fn input_badge(&mut self) {
        self.badge(" INPUT ", Color::Yellow, Color::Black);
    }

    fn badge(&mut self, text: &str, bg: Color, fg: Color) {
        let mut spec = ColorSpec::new();
        spec.set_bg(Some(bg)).set_fg(Some(fg)).set_bold(true);
        let _ = self.out.set_color(&spec);
        let _ = write!(self.out, "{}", text);
        let _ = self.out.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_flag() {
        if std::env::var_os("NO_COLOR").is_none() {
            assert_eq!(resolve_color_choice(Some("never")), ColorChoice::Never);
            assert_eq!(resolve_color_choice(Some("always")), ColorChoice::Always);
            assert_eq!(resolve_color_choice(None), ColorChoice::Auto);
        }
    }

    #[test]
    fn test_buffer_collects_plain_text() {
        let mut out = StyledOutput::buffer();
        out.success("done");
        out.plain(" ");
        out.fail_badge();
        out.newline();
        assert_eq!(out.contents(), "done  FAIL \n");
    }
}
