/// Interactive console screen.
///
/// A single-threaded event loop drives rendering, key handling, the poll
/// timer, and the copy-label revert deadline. Refresh cycles themselves
/// fan out inside `Source::refresh`; their results are applied here
/// atomically, and a failed cycle changes nothing on screen (the failure
/// goes to the structured log instead).
///
/// Keys: `r` refresh now, `c` copy history CSV, `q`/Esc quit.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    queue,
    style::Print,
    terminal,
};

use crate::clipboard;
use crate::config::Config;
use crate::logging::{self, DataSource};
use crate::model::Snapshot;
use crate::render;
use crate::source::Source;

/// How long the copy action shows its confirmation label.
pub const COPY_FEEDBACK: Duration = Duration::from_millis(1200);

/// Event-loop tick; bounds how late a timer or label revert can fire.
const TICK: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// Copy-label feedback
// ---------------------------------------------------------------------------

/// Tracks the transient "copied!" label on the copy action.
///
/// Deadlines are injected (`Instant` parameters) so the revert timing is
/// testable without sleeping.
#[derive(Debug, Default)]
pub struct CopyFeedback {
    revert_at: Option<Instant>,
}

impl CopyFeedback {
    /// Flip to the confirmation label; it reverts `COPY_FEEDBACK` later.
    pub fn trigger_at(&mut self, now: Instant) {
        self.revert_at = Some(now + COPY_FEEDBACK);
    }

    /// Advance the clock. Returns `true` when the label just reverted.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        match self.revert_at {
            Some(deadline) if now >= deadline => {
                self.revert_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn label(&self) -> &'static str {
        if self.revert_at.is_some() {
            render::COPY_LABEL_DONE
        } else {
            render::COPY_LABEL_IDLE
        }
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

struct App {
    snapshot: Snapshot,
    copy: CopyFeedback,
}

/// Run the interactive screen until the user quits.
pub fn run(source: &mut Source, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App {
        snapshot: Snapshot::default(),
        copy: CopyFeedback::default(),
    };
    let poll_interval = Duration::from_secs(config.poll_minutes * 60);

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let result = event_loop(&mut app, source, poll_interval, &mut stdout);

    crossterm::execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn event_loop(
    app: &mut App,
    source: &mut Source,
    poll_interval: Duration,
    stdout: &mut io::Stdout,
) -> Result<(), Box<dyn std::error::Error>> {
    // Refresh on load, then on the timer and on demand.
    apply_refresh(app, source);
    let mut last_poll = Instant::now();
    draw(app, stdout)?;

    loop {
        let mut dirty = false;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('r') => {
                        apply_refresh(app, source);
                        last_poll = Instant::now();
                        dirty = true;
                    }
                    KeyCode::Char('c') => {
                        copy_csv(app, source);
                        dirty = true;
                    }
                    _ => {}
                },
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }

        if last_poll.elapsed() >= poll_interval {
            apply_refresh(app, source);
            last_poll = Instant::now();
            dirty = true;
        }

        if app.copy.tick_at(Instant::now()) {
            dirty = true;
        }

        if dirty {
            draw(app, stdout)?;
        }
    }
}

/// Run one refresh cycle. On success the new snapshot replaces the old one
/// wholesale; on failure the screen keeps showing what it already had.
fn apply_refresh(app: &mut App, source: &mut Source) {
    let label = source.station_label();
    match source.refresh() {
        Ok(snapshot) => app.snapshot = snapshot,
        Err(err) => logging::log_fetch_failure(source.log_source(), &label, "refresh", &err),
    }
}

fn copy_csv(app: &mut App, source: &mut Source) {
    let label = source.station_label();
    match source.history_csv() {
        Ok(csv) => match clipboard::copy_text(&csv) {
            Ok(()) => app.copy.trigger_at(Instant::now()),
            Err(err) => {
                logging::log_fetch_failure(DataSource::Clipboard, &label, "clipboard write", &err)
            }
        },
        Err(err) => logging::log_fetch_failure(source.log_source(), &label, "history.csv fetch", &err),
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn draw(app: &App, stdout: &mut io::Stdout) -> io::Result<()> {
    let (_, term_rows) = terminal::size()?;
    let lines = screen_lines(app, term_rows as usize);

    queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
    for (y, line) in lines.iter().enumerate() {
        queue!(stdout, cursor::MoveTo(0, y as u16), Print(line))?;
    }
    stdout.flush()
}

/// Compose the whole screen as plain lines. The history table shows the
/// newest rows that fit the terminal height.
fn screen_lines(app: &App, term_rows: usize) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("Station Weather".to_string());
    lines.push(String::new());
    lines.extend(render::render_current_panel(&app.snapshot.current));
    lines.push(render::render_stamp(&app.snapshot.current, app.snapshot.stale));
    lines.push(String::new());
    lines.push(render::history_header());

    let chrome = lines.len() + 2; // header lines above + footer below
    let capacity = term_rows.saturating_sub(chrome).max(1);
    let rows = render::render_history_rows(&app.snapshot.history);
    let skip = rows.len().saturating_sub(capacity);
    lines.extend(rows.into_iter().skip(skip));

    lines.push(String::new());
    lines.push(format!("[r] refresh  {}  [q] quit", app.copy.label()));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_label_reverts_after_1200ms() {
        let mut copy = CopyFeedback::default();
        let start = Instant::now();
        assert_eq!(copy.label(), render::COPY_LABEL_IDLE);

        copy.trigger_at(start);
        assert_eq!(copy.label(), render::COPY_LABEL_DONE);

        // One millisecond early: still showing the confirmation.
        assert!(!copy.tick_at(start + Duration::from_millis(1199)));
        assert_eq!(copy.label(), render::COPY_LABEL_DONE);

        // At the deadline the label reverts, exactly once.
        assert!(copy.tick_at(start + Duration::from_millis(1200)));
        assert_eq!(copy.label(), render::COPY_LABEL_IDLE);
        assert!(!copy.tick_at(start + Duration::from_millis(1300)));
    }

    #[test]
    fn test_retrigger_extends_the_deadline() {
        let mut copy = CopyFeedback::default();
        let start = Instant::now();
        copy.trigger_at(start);
        copy.trigger_at(start + Duration::from_millis(1000));
        // The first deadline has passed, but the second copy is still fresh.
        assert!(!copy.tick_at(start + Duration::from_millis(1300)));
        assert_eq!(copy.label(), render::COPY_LABEL_DONE);
        assert!(copy.tick_at(start + Duration::from_millis(2200)));
    }

    #[test]
    fn test_screen_lines_tail_history_when_terminal_is_short() {
        let mut app = App {
            snapshot: Snapshot::default(),
            copy: CopyFeedback::default(),
        };
        app.snapshot.history = (0..50)
            .map(|i| crate::model::HistoryRow {
                timestamp_local: Some(format!("2025-09-05 {:02}:00", i % 24)),
                ..Default::default()
            })
            .collect();
        let lines = screen_lines(&app, 20);
        assert!(lines.len() <= 20, "screen must fit the terminal, got {}", lines.len());
        // The newest (last) row survives the cut.
        assert!(lines.iter().any(|l| l.starts_with("2025-09-05 01:00")));
    }
}
