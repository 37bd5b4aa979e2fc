// Interactive menu loop over a TaskStore

use crate::store::TaskStore;
use eyre::{Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_EXPORT_FILE: &str = "tasks.csv";

const MENU: &str = "\n1. Add Task\n2. Display Tasks\n3. Mark Task Complete\n4. Save & Exit\nEnter choice: ";

/// Menu entries, keyed by the number the user types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Add,
    List,
    Complete,
    SaveAndExit,
}

impl MenuChoice {
    /// Parse a menu answer; anything but 1-4 is `None`
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().parse::<i64>().ok()? {
            1 => Some(MenuChoice::Add),
            2 => Some(MenuChoice::List),
            3 => Some(MenuChoice::Complete),
            4 => Some(MenuChoice::SaveAndExit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    AwaitingChoice,
    Terminated(Exit),
}

/// Why the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Tasks were exported after choosing Save & Exit
    Saved,
    /// Input closed before Save & Exit; nothing was written
    EndOfInput,
}

/// Drives a `TaskStore` from line-oriented input
///
/// Generic over the reader and writer so a session can run against stdin and
/// stdout or against in-memory buffers.
pub struct Console<R, W> {
    store: TaskStore,
    input: R,
    output: W,
    export_path: PathBuf,
    state: State,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(store: TaskStore, input: R, output: W, export_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            input,
            output,
            export_path: export_path.into(),
            state: State::AwaitingChoice,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    /// Consume the console, returning the store and the output sink
    pub fn into_parts(self) -> (TaskStore, W) {
        (self.store, self.output)
    }

    /// Run until Save & Exit succeeds or input ends
    pub fn run(&mut self) -> Result<Exit> {
        loop {
            if let State::Terminated(exit) = self.step()? {
                let completed = self.store.list().iter().filter(|t| t.completed).count();
                info!(?exit, tasks = self.store.len(), completed, "Session ended");
                return Ok(exit);
            }
        }
    }

    /// Show the menu, read one choice and dispatch it
    ///
    /// Errors are only returned when the console itself cannot be read or
    /// written. Invalid answers are reported to the user and the console stays
    /// in `AwaitingChoice`.
    pub fn step(&mut self) -> Result<State> {
        if let State::Terminated(_) = self.state {
            return Ok(self.state);
        }

        self.prompt(MENU)?;
        let Some(line) = self.read_line()? else {
            return Ok(self.end_of_input());
        };

        let Some(choice) = MenuChoice::parse(&line) else {
            debug!(input = %line, "step: invalid menu choice");
            self.say("Invalid choice!")?;
            return Ok(self.state);
        };

        debug!(?choice, "step: dispatching");
        match choice {
            MenuChoice::Add => self.add_task()?,
            MenuChoice::List => self.display_tasks()?,
            MenuChoice::Complete => self.mark_complete()?,
            MenuChoice::SaveAndExit => self.save_and_exit()?,
        }

        Ok(self.state)
    }

    fn add_task(&mut self) -> Result<()> {
        self.prompt("Enter task name: ")?;
        let Some(name) = self.read_line()? else {
            self.end_of_input();
            return Ok(());
        };

        self.store.add(name);
        self.say("Task added successfully!")
    }

    fn display_tasks(&mut self) -> Result<()> {
        writeln!(self.output, "To-Do List:")?;
        for task in self.store.list() {
            writeln!(self.output, "{}", task)?;
        }
        self.output.flush()?;
        Ok(())
    }

    fn mark_complete(&mut self) -> Result<()> {
        self.prompt("Enter task ID to mark as complete: ")?;
        let Some(line) = self.read_line()? else {
            self.end_of_input();
            return Ok(());
        };

        let result = match line.trim().parse::<i64>() {
            Ok(id) => self.store.complete(id).map(|_| ()),
            Err(e) => Err::<(), _>(e).wrap_err_with(|| format!("Task ID is not a number: {:?}", line)),
        };

        match result {
            Ok(()) => self.say("Task marked as complete!"),
            Err(e) => {
                debug!(error = %e, "mark_complete: rejected");
                self.say("Invalid Task ID!")
            }
        }
    }

    fn save_and_exit(&mut self) -> Result<()> {
        match self.store.export(&self.export_path) {
            Ok(()) => {
                let message = format!("Tasks saved to {}", self.export_path.display());
                self.say(&message)?;
                self.state = State::Terminated(Exit::Saved);
            }
            Err(e) => {
                warn!(file = ?self.export_path, error = ?e, "Export failed");
                let message = format!("Failed to save tasks: {:#}", e);
                self.say(&message)?;
            }
        }
        Ok(())
    }

    fn end_of_input(&mut self) -> State {
        info!("Input closed, leaving without saving");
        self.state = State::Terminated(Exit::EndOfInput);
        self.state
    }

    /// Read one line without its terminator; `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        let read = self.input.read_until(b'\n', &mut buf).context("Failed to read input")?;
        if read == 0 {
            return Ok(None);
        }

        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }

        // Invalid UTF-8 is replaced rather than rejected
        let line = match String::from_utf8(buf) {
            Ok(line) => line,
            Err(e) => {
                debug!(error = %e, "read_line: input is not valid UTF-8");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(Some(line))
    }

    fn prompt(&mut self, text: &str) -> Result<()> {
        write!(self.output, "{}", text).context("Failed to write prompt")?;
        self.output.flush()?;
        Ok(())
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text).context("Failed to write output")?;
        self.output.flush()?;
        Ok(())
    }
}
