use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "studyquest", version, about = "StudyQuest CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Points, level and unlocked games as JSON
    Status,
    /// Manual point adjustments
    Points {
        #[command(subcommand)]
        action: commands::points::PointsAction,
    },
    /// Study task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Calendar event management
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Minigames and their rewards
    Game {
        #[command(subcommand)]
        action: commands::game::GameAction,
    },
    /// Focus timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Study assistant chat
    Assistant {
        #[command(subcommand)]
        action: commands::assistant::AssistantAction,
    },
    /// Sign in with a local profile
    Login {
        /// Display name
        name: String,
        /// Email address
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in profile
    Whoami,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STUDYQUEST_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Status => commands::status::run(),
        Commands::Points { action } => commands::points::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Event { action } => commands::event::run(action),
        Commands::Game { action } => commands::game::run(action),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Assistant { action } => commands::assistant::run(action),
        Commands::Login { name, email } => commands::auth::login(name, email),
        Commands::Logout => commands::auth::logout(),
        Commands::Whoami => commands::auth::whoami(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
