//! Monitor application state and logic.

use std::time::{Duration, Instant};
use crate::circuit::{ElementSnapshot, Simulator};

/// Monitor application state.
pub struct MonitorApp {
    /// The simulator being watched.
    pub sim: Simulator,
    /// Is the periodic driver running?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Element list scroll offset.
    pub scroll: usize,
    /// Period of the periodic driver.
    pub interval: Duration,
    last_tick: Option<Instant>,
}

impl MonitorApp {
    /// Create a monitor over a loaded simulator.
    pub fn new(sim: Simulator, interval: Duration) -> Self {
        Self {
            sim,
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            scroll: 0,
            interval,
            last_tick: None,
        }
    }

    /// Execute one step.
    pub fn step(&mut self) {
        let n = self.sim.step();
        self.status = format!("Step {}", n);
    }

    /// Start the periodic driver.
    pub fn run(&mut self) {
        self.running = true;
        self.last_tick = None;
        self.status = format!("Running every {} ms...", self.interval.as_millis());
    }

    /// Stop the periodic driver.
    pub fn pause(&mut self) {
        self.running = false;
        self.status = format!("Paused at step {}.", self.sim.steps());
    }

    /// Step if running and a full interval has passed since the last step.
    ///
    /// Returns whether a step was taken.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        let due = match self.last_tick {
            Some(last) => now.duration_since(last) >= self.interval,
            None => true,
        };
        if due {
            self.last_tick = Some(now);
            self.sim.step();
            self.status = format!("Running, step {}", self.sim.steps());
        }
        due
    }

    /// Zero every port, stored state and the step counter.
    pub fn reset(&mut self) {
        self.sim.reset();
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Scroll the element list.
    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.sim.circuit().len().saturating_sub(1);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    /// Element views from the scroll offset on.
    pub fn visible(&self, rows: usize) -> Vec<ElementSnapshot> {
        self.sim.snapshot().into_iter().skip(self.scroll).take(rows).collect()
    }
}

/// Run the monitor over a simulator.
pub fn run_monitor(sim: Simulator, interval: Duration) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = MonitorApp::new(sim, interval);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => app.pause(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => app.scroll_by(-1),
                        KeyCode::Down => app.scroll_by(1),
                        _ => {}
                    }
                }
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Circuit, Element, ElementKind, PortRef};
    use crate::ternary::Trit;

    fn app() -> MonitorApp {
        let mut c = Circuit::new();
        c.add_element(Element::new(1, ElementKind::Generator, 0, 0)).unwrap();
        c.add_element(Element::new(2, ElementKind::Or, 100, 0)).unwrap();
        c.connect(PortRef::output(1, 0), PortRef::input(2, 0)).unwrap();
        MonitorApp::new(Simulator::with_circuit(c), Duration::from_millis(100))
    }

    #[test]
    fn test_tick_respects_interval() {
        let mut app = app();
        let t0 = Instant::now();
        assert!(!app.tick(t0));

        app.run();
        assert!(app.tick(t0));
        assert!(!app.tick(t0 + Duration::from_millis(50)));
        assert!(app.tick(t0 + Duration::from_millis(100)));
        assert_eq!(app.sim.steps(), 2);

        app.pause();
        assert!(!app.tick(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_reset_stops_driver() {
        let mut app = app();
        app.step();
        app.step();
        assert_eq!(app.sim.circuit().value(PortRef::output(2, 0)), Some(Trit::P));
        app.run();
        app.reset();
        assert!(!app.running);
        assert_eq!(app.sim.steps(), 0);
        assert_eq!(app.sim.circuit().value(PortRef::output(2, 0)), Some(Trit::O));
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut app = app();
        app.scroll_by(-3);
        assert_eq!(app.scroll, 0);
        app.scroll_by(10);
        assert_eq!(app.scroll, 1);
        assert_eq!(app.visible(5).len(), 1);
    }
}
