mod args;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use common::timing::{Debouncer, Throttle};
use common::{config::AppConfig, logging};
use gh_client::RestGithubClient;
use prometheus::{Encoder, TextEncoder};
use store::{FileStore, Storage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use viewer::{
    AssumeOnline, DnsProbe, Direction, NetworkProbe, ProfileViewer, SearchOutcome,
    SuggestionList, SystemClipboard, TerminalView,
};

use crate::args::Args;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const SUGGEST_DEBOUNCE: Duration = Duration::from_millis(300);
const CONNECTIVITY_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logging::init_logging(if args.verbose { "debug" } else { "warn" });

    let mut config = AppConfig::load()?;
    if let Some(url) = &args.url {
        config.viewer.page_url = url.clone();
    }

    let storage_path = config.storage.resolved_path()?;
    let storage = Storage::new(Arc::new(FileStore::new(&storage_path)));
    let client = Arc::new(RestGithubClient::from_config(&config.github)?);
    let probe: Arc<dyn NetworkProbe> = match DnsProbe::for_base(&config.github.api_base, PROBE_TIMEOUT) {
        Some(probe) => Arc::new(probe),
        None => Arc::new(AssumeOnline),
    };
    let viewer = Arc::new(
        ProfileViewer::builder(client, storage)
            .config(config.viewer.clone())
            .view(Arc::new(TerminalView::stdout(std::io::stdout().is_terminal())))
            .probe(probe.clone())
            .clipboard(Arc::new(SystemClipboard::new()))
            .build()?,
    );
    info!(storage = %storage_path.display(), "gh-profile ready");

    if args.clear_history {
        viewer.clear_history();
    }
    if args.toggle_theme {
        viewer.toggle_theme();
    }
    if let Some(query) = &args.suggest {
        print_list(viewer.suggestions(query).items());
    }
    if args.history {
        print_list(&viewer.history());
    }

    let mut outcome = match &args.username {
        Some(username) => Some(viewer.handle_search(username).await),
        None => viewer.start().await,
    };

    if args.share {
        if let Some(link) = viewer.share_profile().await {
            println!("{}", link.url);
        }
    }
    if let Some(dir) = &args.export {
        export(&viewer, dir);
    }

    if args.interactive {
        if let Some(last) = interactive(viewer.clone(), probe).await? {
            outcome = Some(last);
        }
    }

    if args.metrics {
        print_metrics()?;
    }

    Ok(match outcome {
        Some(SearchOutcome::Failed(_)) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn print_list(items: &[String]) {
    for item in items {
        println!("  {item}");
    }
}

fn export(viewer: &ProfileViewer, dir: &Path) {
    match viewer.export_profile(dir) {
        Ok(Some(path)) => println!("{}", path.display()),
        Ok(None) => warn!("nothing to export yet"),
        Err(err) => warn!(error = %err, dir = %dir.display(), "export failed"),
    }
}

fn print_metrics() -> Result<()> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .context("encoding metrics")?;
    print!("{}", String::from_utf8_lossy(&buffer));
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Search(String),
    Suggest(String),
    Navigate(Direction),
    Pick,
    Retry,
    Clear,
    Theme,
    Share,
    Export(PathBuf),
    History,
    ClearHistory,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Some(query) = line.strip_prefix('?') {
            return Some(Command::Suggest(query.trim().to_string()));
        }
        let Some(rest) = line.strip_prefix(':') else {
            return Some(Command::Search(line.to_string()));
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        Some(match name {
            "down" | "j" => Command::Navigate(Direction::Down),
            "up" | "k" => Command::Navigate(Direction::Up),
            "pick" => Command::Pick,
            "retry" | "r" => Command::Retry,
            "clear" => Command::Clear,
            "theme" => Command::Theme,
            "share" => Command::Share,
            "export" => Command::Export(PathBuf::from(if arg.is_empty() { "." } else { arg })),
            "history" | "h" => Command::History,
            "clear-history" => Command::ClearHistory,
            "help" => Command::Help,
            "quit" | "q" => Command::Quit,
            _ => return None,
        })
    }
}

const HELP: &str = "\
  <username>        search
  ?<partial>        suggestions
  :down / :up       move through the suggestions
  :pick             search for the selected suggestion
  :retry            repeat the last search
  :clear            clear the current result
  :theme            toggle light/dark
  :share            copy the shareable link
  :export [dir]     write the export document
  :history          show search history
  :clear-history    forget search history
  :quit";

/// Reads commands from stdin until EOF or `:quit`; a pending suggestion
/// lookup still prints before returning.
async fn interactive(
    viewer: Arc<ProfileViewer>,
    probe: Arc<dyn NetworkProbe>,
) -> Result<Option<SearchOutcome>> {
    let debouncer = Debouncer::new(SUGGEST_DEBOUNCE);
    let connectivity = Throttle::new(CONNECTIVITY_INTERVAL);
    let suggestions = Arc::new(Mutex::new(SuggestionList::default()));
    let mut online: Option<bool> = None;
    let mut last = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if connectivity.try_acquire() {
            let now = probe.is_online().await;
            if online.is_some_and(|before| before != now) {
                viewer.notify_connectivity(now);
            }
            online = Some(now);
        }

        let Some(command) = Command::parse(&line) else {
            println!("unknown command; :help lists them");
            continue;
        };
        match command {
            Command::Search(input) => last = Some(viewer.handle_search(&input).await),
            Command::Suggest(query) => {
                let viewer = viewer.clone();
                let suggestions = suggestions.clone();
                debouncer.call(async move {
                    let list = viewer.suggestions(&query);
                    print_list(list.items());
                    *suggestions.lock().unwrap_or_else(|e| e.into_inner()) = list;
                });
            }
            Command::Navigate(direction) => {
                debouncer.flush().await;
                let mut list = suggestions.lock().unwrap_or_else(|e| e.into_inner());
                list.navigate(direction);
                if let Some(selected) = list.selected() {
                    println!("> {selected}");
                }
            }
            Command::Pick => {
                debouncer.flush().await;
                let picked = suggestions
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .commit();
                match picked {
                    Some(username) => last = Some(viewer.handle_search(&username).await),
                    None => println!("no suggestion selected"),
                }
            }
            Command::Retry => {
                if let Some(outcome) = viewer.retry().await {
                    last = Some(outcome);
                }
            }
            Command::Clear => viewer.clear_search(),
            Command::Theme => {
                viewer.toggle_theme();
            }
            Command::Share => {
                if let Some(link) = viewer.share_profile().await {
                    println!("{}", link.url);
                }
            }
            Command::Export(dir) => export(&viewer, &dir),
            Command::History => print_list(&viewer.history()),
            Command::ClearHistory => viewer.clear_history(),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }
    debouncer.flush().await;
    Ok(last)
}
