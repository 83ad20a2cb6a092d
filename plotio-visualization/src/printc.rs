//! Colored terminal printing

use colored::Colorize;
use plotio_core::{Error, Result};
use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::str::FromStr;
use std::sync::OnceLock;

/// The eight basic ANSI colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TermColor {
    #[default]
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

const ALL_COLORS: [TermColor; 8] = [
    TermColor::Black,
    TermColor::Red,
    TermColor::Green,
    TermColor::Yellow,
    TermColor::Blue,
    TermColor::Magenta,
    TermColor::Cyan,
    TermColor::White,
];

impl TermColor {
    /// Color for an integer, taken modulo 8
    pub fn from_index(index: i64) -> Self {
        ALL_COLORS[index.rem_euclid(8) as usize]
    }

    fn to_colored(self) -> colored::Color {
        match self {
            TermColor::Black => colored::Color::Black,
            TermColor::Red => colored::Color::Red,
            TermColor::Green => colored::Color::Green,
            TermColor::Yellow => colored::Color::Yellow,
            TermColor::Blue => colored::Color::Blue,
            TermColor::Magenta => colored::Color::Magenta,
            TermColor::Cyan => colored::Color::Cyan,
            TermColor::White => colored::Color::White,
        }
    }
}

impl FromStr for TermColor {
    type Err = Error;

    /// Full names or one-letter abbreviations (`k` is black), case-insensitive
    fn from_str(s: &str) -> Result<Self> {
        let color = match s.trim().to_ascii_lowercase().as_str() {
            "black" | "k" => TermColor::Black,
            "red" | "r" => TermColor::Red,
            "green" | "g" => TermColor::Green,
            "yellow" | "y" => TermColor::Yellow,
            "blue" | "b" => TermColor::Blue,
            "magenta" | "m" => TermColor::Magenta,
            "cyan" | "c" => TermColor::Cyan,
            "white" | "w" => TermColor::White,
            other => {
                if let Ok(index) = other.parse::<i64>() {
                    return Ok(TermColor::from_index(index));
                }
                return Err(Error::InvalidData(format!("Unknown terminal color '{}'", s)));
            }
        };
        Ok(color)
    }
}

/// How [`printc`] lays out and styles its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    pub color: TermColor,
    pub bold: bool,
    pub separator: String,
    pub end: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            color: TermColor::Black,
            bold: true,
            separator: " ".to_string(),
            end: "\n".to_string(),
        }
    }
}

impl PrintOptions {
    pub fn colored(color: TermColor) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_end<S: Into<String>>(mut self, end: S) -> Self {
        self.end = end.into();
        self
    }
}

/// Whether stdout is a color terminal, decided once per process
pub fn terminal_has_colors() -> bool {
    static HAS_COLORS: OnceLock<bool> = OnceLock::new();
    *HAS_COLORS.get_or_init(|| {
        io::stdout().is_terminal()
            && std::env::var("TERM").map_or(true, |term| term != "dumb")
            && std::env::var_os("NO_COLOR").is_none()
    })
}

/// Join the items with the separator
pub fn join_items<I, T>(items: I, separator: &str) -> String
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Apply color and weight to a piece of text
pub fn styled(text: &str, color: TermColor, bold: bool) -> String {
    let colored = text.color(color.to_colored());
    if bold {
        colored.bold().to_string()
    } else {
        colored.to_string()
    }
}

/// Write the joined items plus `end` to `writer`, styled when `use_color` is set
pub fn printc_to<W, I, T>(writer: &mut W, items: I, options: &PrintOptions, use_color: bool) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = T>,
    T: Display,
{
    let text = join_items(items, &options.separator);
    if use_color {
        write!(writer, "{}{}", styled(&text, options.color, options.bold), options.end)?;
    } else {
        write!(writer, "{}{}", text, options.end)?;
    }
    writer.flush()
}

/// Print items to stdout, in color when stdout is a color terminal.
///
/// ```no_run
/// use plotio_visualization::{printc, PrintOptions, TermColor};
///
/// printc(["Saved file", "mesh.vtk"], &PrintOptions::colored(TermColor::Green));
/// printc([299792.48], &PrintOptions::colored(TermColor::from_index(4)).with_bold(false));
/// ```
pub fn printc<I, T>(items: I, options: &PrintOptions)
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    // A closed stdout is not worth failing over
    let _ = printc_to(&mut lock, items, options, terminal_has_colors());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_names_and_indices() {
        assert_eq!("red".parse::<TermColor>().unwrap(), TermColor::Red);
        assert_eq!("K".parse::<TermColor>().unwrap(), TermColor::Black);
        assert_eq!("12".parse::<TermColor>().unwrap(), TermColor::Blue);
        assert_eq!(TermColor::from_index(-1), TermColor::White);
        assert!("orange".parse::<TermColor>().is_err());
    }

    #[test]
    fn test_plain_output_layout() {
        let mut out = Vec::new();
        let options = PrintOptions::default().with_separator(", ").with_end("!");
        printc_to(&mut out, [&"a" as &dyn Display, &1.5, &3], &options, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a, 1.5, 3!");
    }

    #[test]
    fn test_colored_output_keeps_text() {
        colored::control::set_override(true);
        let mut out = Vec::new();
        printc_to(&mut out, ["done"], &PrintOptions::colored(TermColor::Green), true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\u{1b}["));
        assert!(text.contains("done"));
        assert!(text.ends_with('\n'));
    }
}
