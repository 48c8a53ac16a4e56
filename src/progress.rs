// Terminal progress line
use crossterm::{
    cursor::{MoveTo, MoveToColumn},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Single spinner line on stdout, shared by all workers.
/// Does nothing when stdout is not a terminal.
#[derive(Debug)]
pub struct Progress {
    enabled: bool,
    frame: AtomicUsize,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            frame: AtomicUsize::new(0),
        }
    }

    pub fn for_stdout() -> Self {
        Self::new(atty::is(atty::Stream::Stdout))
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn page_done(&self, file: &Path, page: u32, total: u32) {
        if !self.enabled {
            return;
        }
        let frame = SPINNER[self.frame.fetch_add(1, Ordering::Relaxed) % SPINNER.len()];
        let text = format!(
            "{frame} Processing {}... {page}/{total} page(s)",
            file.display()
        );
        // Drawing errors are ignored
        let _ = self.draw(&text);
    }

    /// Clear the spinner line.
    pub fn finish(&self) {
        if self.enabled {
            let _ = self.draw("");
        }
    }

    fn draw(&self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        queue!(
            stdout,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Blue),
            Print(text),
            ResetColor
        )?;
        stdout.flush()
    }
}

/// Wipe the terminal before a run.
pub fn clear_screen() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))
}
