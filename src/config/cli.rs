use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "wash-booking")]
#[command(about = "Window washing quotes and job booking")]
pub struct CliConfig {
    /// Path to the booking configuration file
    #[arg(short, long, default_value = "configs/booking.toml", global = true)]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the submission endpoint
    Serve {
        /// Override `server.bind` from the config file
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print quotes for one or more pane counts (reads stdin when none are given)
    Quote {
        panes: Vec<String>,

        /// Price table CSV to use instead of the built-in table
        #[arg(long)]
        table: Option<String>,
    },

    /// Submit one job from a JSON file
    Submit {
        #[arg(short, long)]
        file: String,
    },
}
