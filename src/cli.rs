use crate::acquire::DEFAULT_CLONE_JOBS;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "locmap")]
#[command(about = "Aggregate per-month lines-of-code contribution history across GitHub repositories")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone contributed repositories and build the aggregated history
    Scan {
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, help = "GitHub API token")]
        token: String,

        #[arg(long, help = "Analyze a single repository (owner/name)")]
        repo: Option<String>,

        #[arg(long, default_value = "github_stats", help = "Output directory")]
        output: PathBuf,

        #[arg(long, default_value_t = DEFAULT_CLONE_JOBS, help = "Maximum concurrent clone operations")]
        clone_jobs: usize,

        #[arg(long, help = "Analysis worker threads (default: min(8, repositories))")]
        workers: Option<usize>,
    },
    /// Merge previously exported history files into one
    Merge {
        #[arg(required = true, help = "History JSON files to merge")]
        files: Vec<PathBuf>,

        #[arg(short, long, default_value = "merged_loc_history.json", help = "Output file path")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Scan { token, repo, output, clone_jobs, workers } => {
                crate::scan::exec(token, repo, output, clone_jobs, workers).await
            }
            Commands::Merge { files, output } => crate::merge::exec(files, output),
        }
    }
}
