//! Appforge engine: the webpage-to-app conversion pipeline and its worker.
mod bundle;
mod config;
mod convert;
mod decode;
mod engine;
mod fetch;
mod identity;
mod persist;
mod probe;
mod scaffold;
mod types;

pub use bundle::{BundleCommand, BundleTarget, Bundler, CommandBundler, ParseBundleTargetError};
pub use config::EngineConfig;
pub use convert::{AppConverter, ProgressSink};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use engine::{ChannelProgressSink, EngineHandle};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use identity::{validate_url, AppIdentity, APP_VERSION};
pub use persist::{ensure_output_dir, reset_dir, AtomicFileWriter, PersistError};
pub use probe::{extract_title, PageProbe, ProbeResult};
pub use scaffold::{prepare_app_dir, write_scaffold, ScaffoldSummary};
pub use types::{
    ConversionOutcome, ConvertError, ConvertRequest, EngineEvent, FailureKind, FetchMetadata,
    FetchOutput, RequestId, Stage,
};
