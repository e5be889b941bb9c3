use std::fmt;

use crate::config::SimConfig;
use crate::MPMC::Structs::{StatsReport, WorkerId};

/// Final summary, printed once after every worker has been joined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryReport {
    pub config: SimConfig,
    pub stats: StatsReport,
    /// Whether the run was cut short by an external interrupt.
    pub interrupted: bool,
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.stats;
        writeln!(f, "PRODUCER / CONSUMER SIMULATION COMPLETE")?;
        writeln!(f, "=======================================")?;
        if self.interrupted {
            writeln!(f, "(interrupted before the configured run time)")?;
        }
        writeln!(f, "Simulation Time:                     {:?}", self.config.run_duration)?;
        writeln!(f, "Maximum Thread Sleep Time:           {:?}", self.config.max_sleep)?;
        writeln!(f, "Number of Producer Threads:          {}", self.config.producers)?;
        writeln!(f, "Number of Consumer Threads:          {}", self.config.consumers)?;
        writeln!(f, "Size of buffer:                      {}", stats.capacity)?;
        writeln!(f)?;
        writeln!(f, "Total Number of Items Produced:      {}", stats.produced)?;
        write_tallies(f, &stats.produced_by)?;
        writeln!(f)?;
        writeln!(f, "Total Number of Items Consumed:      {}", stats.consumed)?;
        write_tallies(f, &stats.consumed_by)?;
        writeln!(f)?;
        writeln!(f, "Number Of Items Remaining in Buffer: {}", stats.remaining)?;
        writeln!(f, "Number Of Times Buffer Was Full:     {}", stats.times_full)?;
        write!(f, "Number Of Times Buffer Was Empty:    {}", stats.times_empty)
    }
}

/// One line per worker, numbered from 1 in id order, with the id alongside.
fn write_tallies(f: &mut fmt::Formatter<'_>, tallies: &[(WorkerId, u64)]) -> fmt::Result {
    for (ordinal, (worker, count)) in tallies.iter().enumerate() {
        let label = format!("{} ({worker}):", ordinal + 1);
        writeln!(f, "\tThread {label:<22}{count}")?;
    }
    Ok(())
}
