use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::debug;

use check_workflow::config::{Config, DEFAULT_REMOTE_REF, DEFAULT_WORKFLOW_ROOT};
use check_workflow::github::GitHubClient;
use check_workflow::logging;
use check_workflow::report::{ReportFormat, format_outdated};
use check_workflow::source::{LocalSource, RemoteSource, WorkflowSource};
use check_workflow::version::checker::{CheckOptions, check_workflows};

#[derive(Parser)]
#[command(name = "check-workflow")]
#[command(version, about = "Find GitHub Actions pinned behind their latest compatible release")]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check workflows in a local directory
    Local {
        /// Workflow root
        #[arg(short, long, default_value = DEFAULT_WORKFLOW_ROOT)]
        root: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check workflows of a GitHub repository
    Remote {
        /// Query repository parent
        org: String,

        /// Query repository
        repo: String,

        /// Query branch (defaults to the repository's default branch)
        #[arg(short, long, default_value = DEFAULT_REMOTE_REF)]
        branch: String,

        /// Workflow root
        #[arg(short, long, default_value = DEFAULT_WORKFLOW_ROOT)]
        root: String,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Render the report as markdown tables
    #[arg(short, long)]
    markdown: bool,
}

impl OutputArgs {
    fn format(&self) -> ReportFormat {
        if self.markdown {
            ReportFormat::Markdown
        } else {
            ReportFormat::Plain
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    logging::init(&config.logging, cli.verbose);
    debug!("Loaded configuration for endpoint {}", config.github.endpoint);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, config))
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    let client = GitHubClient::new(&config.github)?;
    let options = CheckOptions {
        fetch_concurrency: config.check.fetch_concurrency,
    };

    let (workflows, format) = match &command {
        Command::Local { root, output } => (
            LocalSource::new(root).fetch_workflows().await?,
            output.format(),
        ),
        Command::Remote {
            org,
            repo,
            branch,
            root,
            output,
        } => (
            RemoteSource::new(&client, org, repo)
                .with_reference(branch)
                .with_root(root)
                .fetch_workflows()
                .await?,
            output.format(),
        ),
    };

    let report = check_workflows(&workflows, &client, &options).await?;
    if !report.is_empty() {
        print!("{}", format_outdated(&report, format));
    }

    Ok(())
}
