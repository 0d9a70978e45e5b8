use crate::demo::{run_demo, run_window_check, DemoArgs, WindowArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use talentflow::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "TalentFlow",
    about = "Run and demonstrate the TalentFlow hiring pipeline from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Assessment scheduling helpers
    Test {
        #[command(subcommand)]
        command: TestCommand,
    },
    /// Run an end-to-end CLI demo from job posting to graded assessment
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum TestCommand {
    /// Check whether a scheduling window fits a test of the given length
    Window(WindowArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Test {
            command: TestCommand::Window(args),
        } => run_window_check(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
