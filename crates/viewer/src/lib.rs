pub mod address;
pub mod charts;
pub mod clipboard;
pub mod error;
pub mod export;
pub mod metrics;
pub mod network;
pub mod service;
pub mod suggest;
pub mod view;

pub use address::{AddressBar, USERNAME_PARAM};
pub use charts::{ChartEngine, ChartKind, ChartManager, ChartRender, EngineState, SlotState};
pub use clipboard::{Clipboard, SystemClipboard};
pub use error::{Banner, SearchFailure};
pub use export::ExportDocument;
pub use network::{AssumeOnline, DnsProbe, NetworkProbe};
pub use service::{ProfileReport, ProfileViewer, ProfileViewerBuilder, SearchOutcome, SharedLink};
pub use suggest::{suggest, Direction, SuggestionList};
pub use view::{ProfileCard, RepoCard, TerminalView, Toast, ToastKind, ViewSink};
