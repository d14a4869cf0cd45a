//! RAII ownership of the controlling terminal for one dashboard session.
//!
//! [`TerminalGuard`] switches to raw mode and the alternate screen, and puts
//! the terminal back on [`Drop`]. A process-wide panic hook does the same
//! before the panic message is printed, so a crash inside the render loop
//! never leaves the shell in raw mode.

use std::io::{self, Write};
use std::panic;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::{cursor, execute, terminal};

/// Set while a guard holds the terminal.
static TERMINAL_OWNED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK: Once = Once::new();

const FALLBACK_SIZE: (usize, usize) = (80, 24);

/// Owns the terminal for the lifetime of a dashboard session.
#[derive(Debug)]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    /// Take over the terminal.
    ///
    /// # Errors
    /// Returns the I/O error from the first setup step that failed; any step
    /// already applied is undone first.
    pub fn new() -> io::Result<Self> {
        install_panic_hook();

        terminal::enable_raw_mode()?;
        TERMINAL_OWNED.store(true, Ordering::SeqCst);

        let entered = execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        );
        if let Err(e) = entered {
            release_terminal();
            return Err(e);
        }
        Ok(Self { _private: () })
    }

    /// Whether some guard currently holds the terminal.
    pub fn is_active() -> bool {
        TERMINAL_OWNED.load(Ordering::SeqCst)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        release_terminal();
    }
}

/// Drawable size as (columns, rows): the tty first, then `$COLUMNS`/`$LINES`,
/// then 80x24.
pub fn terminal_size() -> (usize, usize) {
    match terminal::size() {
        Ok((cols, rows)) if cols > 0 && rows > 0 => (usize::from(cols), usize::from(rows)),
        _ => (
            env_dimension("COLUMNS").unwrap_or(FALLBACK_SIZE.0),
            env_dimension("LINES").unwrap_or(FALLBACK_SIZE.1),
        ),
    }
}

fn env_dimension(var: &str) -> Option<usize> {
    std::env::var(var)
        .ok()?
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|&n| n > 0)
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            release_terminal();
            previous(info);
        }));
    });
}

/// Show the cursor, leave the alternate screen and drop raw mode.
/// Only the first call after a successful setup touches the terminal.
fn release_terminal() {
    if !TERMINAL_OWNED.swap(false, Ordering::SeqCst) {
        return;
    }
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = stdout.flush();
}
