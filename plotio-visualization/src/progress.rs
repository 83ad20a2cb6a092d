//! Text progress bar with an optional ETA and message

use crate::printc::{styled, terminal_has_colors, TermColor};
use std::io::{self, Write};
use std::time::Instant;

/// A one-line progress bar redrawn in place with `\r`.
///
/// ```no_run
/// use plotio_visualization::{ProgressBar, TermColor};
///
/// let mut pb = ProgressBar::new(0, 400).with_color(TermColor::Red);
/// for _ in pb.range() {
///     pb.print("some message");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ProgressBar {
    start: i64,
    stop: i64,
    step: i64,
    color: Option<TermColor>,
    eta: bool,
    width: usize,
    bar: String,
    percent: i64,
    counts: i64,
    clock: Instant,
    old_bar: String,
    text_len: usize,
}

impl ProgressBar {
    pub fn new(start: i64, stop: i64) -> Self {
        let mut bar = Self {
            start,
            stop,
            step: 1,
            color: None,
            eta: true,
            width: 25,
            bar: String::new(),
            percent: 0,
            counts: start,
            clock: Instant::now(),
            old_bar: String::new(),
            text_len: 0,
        };
        bar.update(start);
        bar
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = step;
        self
    }

    pub fn with_color(mut self, color: TermColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_eta(mut self, eta: bool) -> Self {
        self.eta = eta;
        self
    }

    /// Total bar width including the brackets, at least 3
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(3);
        self.update(self.counts);
        self
    }

    /// Current bar text, e.g. `[=====>      ] 42%`
    pub fn bar(&self) -> &str {
        &self.bar
    }

    pub fn percent(&self) -> i64 {
        self.percent
    }

    pub fn counts(&self) -> i64 {
        self.counts
    }

    /// The values from `start` up to `stop` (exclusive) by `step`
    pub fn range(&self) -> impl Iterator<Item = i64> {
        let (start, stop, step) = (self.start, self.stop, self.step);
        let mut next = start;
        std::iter::from_fn(move || {
            let done = if step > 0 { next >= stop } else { step == 0 || next <= stop };
            if done {
                return None;
            }
            let value = next;
            next += step;
            Some(value)
        })
    }

    pub fn len(&self) -> usize {
        self.range().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advance by one step and redraw with `txt` on the right
    pub fn print(&mut self, txt: &str) {
        let counts = self.counts + self.step;
        self.print_to_stdout(counts, txt);
    }

    /// Jump to `counts` and redraw with `txt` on the right
    pub fn print_counts(&mut self, counts: i64, txt: &str) {
        self.print_to_stdout(counts, txt);
    }

    fn print_to_stdout(&mut self, counts: i64, txt: &str) {
        let use_color = self.color.is_some() && terminal_has_colors();
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        let _ = self.print_to(&mut lock, counts, txt, use_color);
    }

    /// Move to `counts` and write the line to `writer` if the bar changed
    pub fn print_to<W: Write>(&mut self, writer: &mut W, counts: i64, txt: &str, use_color: bool) -> io::Result<()> {
        self.update(counts);
        if self.bar == self.old_bar {
            return Ok(());
        }
        self.old_bar = self.bar.clone();

        // Blank out the previous message, then step back over the blanks
        let eraser = format!("{}{}", " ".repeat(self.text_len), "\u{8}".repeat(self.text_len));
        let txt = if self.eta {
            format!("{}{}", self.eta_text(), txt)
        } else {
            txt.to_string()
        };
        let line = format!("{} {}{}\r", self.bar, eraser, txt);

        match self.color {
            Some(color) if use_color => write!(writer, "{}", styled(&line, color, true))?,
            _ => write!(writer, "{}", line)?,
        }
        if self.percent == 100 {
            writeln!(writer)?;
        }
        writer.flush()?;
        self.text_len = txt.chars().count();
        Ok(())
    }

    fn eta_text(&self) -> String {
        let elapsed = self.clock.elapsed().as_secs_f64();
        let velocity = if elapsed > 0.0 { self.counts as f64 / elapsed } else { 0.0 };
        let remaining = if velocity > 0.0 {
            (self.stop - self.counts) as f64 / velocity
        } else {
            0.0
        };
        let (mins, secs) = if remaining > 60.0 {
            let mins = (remaining / 60.0) as u64;
            let secs = remaining - 60.0 * mins as f64;
            (format!("{}m", mins), format!("{}s ", secs as u64))
        } else {
            (String::new(), format!("{}s ", remaining as u64))
        };
        format!("ETA: {}{}({:.1} it/s) ", mins, secs, velocity)
    }

    fn update(&mut self, counts: i64) {
        self.counts = counts.clamp(self.start.min(self.stop), self.stop.max(self.start));
        let span = self.stop - self.start;
        self.percent = if span == 0 {
            100
        } else {
            // Halves round to even: 12.5% shows as 12%
            ((self.counts - self.start) as f64 * 100.0 / span as f64).round_ties_even() as i64
        };
        self.bar = format!("{} {}%", bar_text(self.percent, self.width), self.percent);
    }
}

/// The bracketed bar for a percentage, `width` characters wide
fn bar_text(percent: i64, width: usize) -> String {
    let inner = width - 2;
    let filled = ((percent as f64 / 100.0) * inner as f64).round_ties_even() as usize;
    if filled == 0 {
        format!("[>{}]", " ".repeat(inner - 1))
    } else if filled >= inner {
        format!("[{}]", "=".repeat(inner))
    } else {
        format!("[{}>{}]", "=".repeat(filled - 1), " ".repeat(inner - filled))
    }
}
