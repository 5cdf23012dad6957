use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gh-profile",
    about = "Look up a GitHub user and render their profile, languages and activity",
    version,
    long_about = None
)]
pub struct Args {
    /// GitHub username to look up
    pub username: Option<String>,

    /// Page location to use as the address bar (a `username` parameter triggers a search)
    #[arg(long)]
    pub url: Option<String>,

    /// Write the export document for the searched user into this directory
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Copy the shareable link of the searched user to the clipboard
    #[arg(long)]
    pub share: bool,

    /// Switch between the light and dark theme and remember the choice
    #[arg(long)]
    pub toggle_theme: bool,

    /// Print the search history
    #[arg(long)]
    pub history: bool,

    /// Forget the search history
    #[arg(long)]
    pub clear_history: bool,

    /// Print username suggestions for a partial name
    #[arg(long, value_name = "QUERY")]
    pub suggest: Option<String>,

    /// Keep reading commands and usernames from stdin
    #[arg(short, long)]
    pub interactive: bool,

    /// Print Prometheus metrics before exiting
    #[arg(long)]
    pub metrics: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
