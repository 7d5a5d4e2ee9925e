//! Concrete strategy adapters.
//!
//! Each adapter wraps one retrieval mechanism behind the `StrategyAdapter`
//! trait: the native extractor subprocess, relay APIs, alternate front-end
//! instances, a raw stream dump, and an external browser-capture helper. The
//! engine never sees anything below the trait.

mod browser;
mod extractor;
mod frontend;
mod probe;
mod relay;
mod stream_dump;

pub use browser::BrowserAdapter;
pub use extractor::ExtractorAdapter;
pub use frontend::FrontendAdapter;
pub use probe::{bootstrap, detect_tools, Bootstrap, ToolAvailability};
pub use relay::RelayAdapter;
pub use stream_dump::StreamDumpAdapter;
