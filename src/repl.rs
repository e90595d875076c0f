//! Line-oriented command interpreter over a live scheduler.
//!
//! Reads one command per line, applies it to the grid, and writes a short
//! confirmation. Input and output are generic so sessions can be scripted in
//! tests.

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::debug;

use crate::grid::{DemandRequest, GridError, PriorityClass, Scheduler};
use crate::sim::clock::Clock;

const BANNER: &str = "Smart Grid CLI - Demand-Response Coordinator\n\
                      Enter commands to manage grid.\n\
                      Type 'help' for detailed syntax and examples.\n";

const HELP: &str = "\
Available commands:
  report <consumerID> <res|com|ind> <MW>   -- Submit a demand request.
       e.g.: report C101 res 25.5
  balance                                  -- Run scheduling: allocate or shed load.
       e.g.: balance
  maintenance <subID> <delaySec>           -- Schedule maintenance after delay.
       e.g.: maintenance S02 300   (start in 5 min, lasts 1h)
  status                                   -- Show grid, demands, maintenance.
       e.g.: status
  help                                     -- Show this help message.
  exit                                     -- Quit the program.";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Report {
        consumer_id: String,
        class: PriorityClass,
        megawatts: f64,
    },
    Balance,
    Maintenance {
        substation_id: String,
        delay_secs: i64,
    },
    Status,
    Help,
    Exit,
}

/// Why a line could not be parsed or applied.
///
/// Display strings are the user-facing replies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Unknown command. Type 'help' for list of commands.")]
    Unknown(String),
    #[error("Usage: report <consumerID> <res|com|ind> <MW>")]
    ReportUsage,
    #[error("Usage: maintenance <subID> <delaySec>")]
    MaintenanceUsage,
    #[error("Invalid type. Use 'res', 'com', or 'ind'.")]
    InvalidClass(String),
    #[error("Error: {0}")]
    Grid(#[from] GridError),
}

impl Command {
    /// Parses one line. Blank lines yield `Ok(None)`; tokens after the
    /// expected arguments are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] describing the problem.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut tokens = line.split_whitespace();
        let Some(cmd) = tokens.next() else {
            return Ok(None);
        };

        let command = match cmd {
            "report" => {
                let (Some(id), Some(class), Some(mw)) = (tokens.next(), tokens.next(), tokens.next())
                else {
                    return Err(CommandError::ReportUsage);
                };
                let megawatts = mw.parse::<f64>().map_err(|_| CommandError::ReportUsage)?;
                let class = match class {
                    "res" => PriorityClass::Residential,
                    "com" => PriorityClass::Commercial,
                    "ind" => PriorityClass::Industrial,
                    other => return Err(CommandError::InvalidClass(other.to_string())),
                };
                Self::Report {
                    consumer_id: id.to_string(),
                    class,
                    megawatts,
                }
            }
            "balance" => Self::Balance,
            "maintenance" => {
                let (Some(id), Some(delay)) = (tokens.next(), tokens.next()) else {
                    return Err(CommandError::MaintenanceUsage);
                };
                let delay_secs = delay
                    .parse::<i64>()
                    .map_err(|_| CommandError::MaintenanceUsage)?;
                Self::Maintenance {
                    substation_id: id.to_string(),
                    delay_secs,
                }
            }
            "status" => Self::Status,
            "help" => Self::Help,
            "exit" => Self::Exit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Whether the session should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Interactive session bound to one scheduler.
#[derive(Debug)]
pub struct Repl<C: Clock> {
    scheduler: Scheduler<C>,
    maintenance_secs: i64,
}

impl<C: Clock> Repl<C> {
    /// Wraps `scheduler`; `maintenance` commands open windows of
    /// `maintenance_secs`.
    pub fn new(scheduler: Scheduler<C>, maintenance_secs: i64) -> Self {
        Self {
            scheduler,
            maintenance_secs,
        }
    }

    pub fn scheduler(&self) -> &Scheduler<C> {
        &self.scheduler
    }

    /// Applies a parsed command and writes the reply.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Grid` if the scheduler rejects the command;
    /// I/O failures are reported through the outer `io::Result`.
    pub fn execute(
        &mut self,
        command: Command,
        out: &mut impl Write,
    ) -> io::Result<Result<Flow, CommandError>> {
        debug!(?command, "executing command");
        match command {
            Command::Report {
                consumer_id,
                class,
                megawatts,
            } => {
                let at = self.scheduler.now();
                let queued = DemandRequest::new(consumer_id.clone(), class, megawatts, at)
                    .and_then(|r| self.scheduler.receive_demand(r));
                if let Err(e) = queued {
                    return Ok(Err(e.into()));
                }
                writeln!(out, "Demand recorded for {consumer_id}.")?;
            }
            Command::Balance => {
                let report = self.scheduler.run_cycle();
                writeln!(out, "Load balancing complete.")?;
                writeln!(
                    out,
                    "  allocated {} ({} MW), shed {} ({} MW)",
                    report.allocated_count(),
                    report.allocated_mw(),
                    report.shed_count(),
                    report.shed_mw()
                )?;
            }
            Command::Maintenance {
                substation_id,
                delay_secs,
            } => {
                if let Err(e) = self.scheduler.schedule_maintenance_after(
                    substation_id.clone(),
                    delay_secs,
                    self.maintenance_secs,
                ) {
                    return Ok(Err(e.into()));
                }
                writeln!(
                    out,
                    "Maintenance scheduled for {substation_id} starting in {delay_secs} seconds."
                )?;
            }
            Command::Status => writeln!(out, "{}", self.scheduler.snapshot())?,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Exit => {
                writeln!(out, "Exiting Smart Grid CLI. Goodbye!")?;
                return Ok(Ok(Flow::Exit));
            }
        }
        Ok(Ok(Flow::Continue))
    }

    /// Parses and applies one line, writing either the reply or the error.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if writing fails.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        let result = match Command::parse(line) {
            Ok(Some(command)) => self.execute(command, out)?,
            Ok(None) => Ok(Flow::Continue),
            Err(e) => Err(e),
        };
        match result {
            Ok(flow) => Ok(flow),
            Err(e) => {
                debug!(error = %e, line, "command rejected");
                writeln!(out, "{e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Runs a full session: banner, then prompt/handle until `exit` or EOF.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if reading input or writing output fails.
    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> io::Result<()> {
        writeln!(out, "{BANNER}")?;
        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            if self.handle_line(&line?, &mut out)? == Flow::Exit {
                break;
            }
        }
        out.flush()
    }
}
