//! Usage-statistics command surface.
//!
//! Two commands: show (render the stats table) and reset (confirmation-gated
//! clear). Both read the same table the telemetry reporter maintains.

use crate::core::error::AlmanacError;
use crate::core::host::HostContext;
use crate::core::telemetry::{ToolStatsTable, UsageReporter};
use crate::core::time;
use clap::Subcommand;
use colored::Colorize;

/// CLI structure for the `almanac stats` command family.
#[derive(clap::Args, Debug)]
pub struct StatsCli {
    #[clap(subcommand)]
    pub command: StatsCommand,
}

#[derive(Subcommand, Debug)]
pub enum StatsCommand {
    /// Show per-capability usage statistics.
    Show,
    /// Clear all usage statistics (asks for confirmation).
    Reset {
        /// Skip the confirmation prompt.
        #[clap(long)]
        yes: bool,
    },
}

const SECS_PER_DAY: u64 = 86_400;

/// Render the summary shown by `showUsageStatistics`: success rate and
/// age-in-days per capability, sorted by total invocations descending.
pub fn render_usage_statistics(stats: &ToolStatsTable, now: u64) -> String {
    if stats.is_empty() {
        return "No usage statistics recorded yet.".to_string();
    }

    let mut rows: Vec<_> = stats.iter().collect();
    rows.sort_by(|(a_name, a), (b_name, b)| {
        b.total.cmp(&a.total).then_with(|| a_name.cmp(b_name))
    });

    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        "Capability Usage Statistics".bright_white().bold()
    ));
    for (name, record) in rows {
        let rate = if record.total == 0 {
            0
        } else {
            record.success * 100 / record.total
        };
        let age_days = now.saturating_sub(record.first_used) / SECS_PER_DAY;
        out.push_str(&format!(
            "  {}  total {}  success {}%  failures {}  first used {} day(s) ago\n",
            name.bright_cyan(),
            record.total,
            rate,
            record.failures,
            age_days
        ));
    }
    out
}

pub fn run_stats_cli(
    cli: StatsCli,
    reporter: &UsageReporter,
    host: &dyn HostContext,
) -> Result<(), AlmanacError> {
    match cli.command {
        StatsCommand::Show => {
            println!(
                "{}",
                render_usage_statistics(&reporter.get_stats(), time::now_epoch_secs())
            );
            Ok(())
        }
        StatsCommand::Reset { .. } => {
            if host.confirm("Reset all capability usage statistics?") {
                reporter.reset_stats()?;
                println!("Usage statistics cleared.");
            } else {
                println!("Reset cancelled.");
            }
            Ok(())
        }
    }
}
