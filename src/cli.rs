use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "relaybot")]
#[command(about = "Chat relay bot backed by an OpenAI-compatible completion API", long_about = None)]
pub struct Args {
    #[arg(short = 'c', long = "config", help = "Path to a YAML config file")]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'm',
        long = "memory-file",
        help = "Conversation memory file (overrides MEMORY_FILE)"
    )]
    pub memory_file: Option<PathBuf>,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    #[arg(long = "purge", help = "Purge inactive conversations, save, and exit")]
    pub purge: bool,

    #[arg(long = "clear", help = "Delete all conversation memory and exit")]
    pub clear_memory: bool,
}
