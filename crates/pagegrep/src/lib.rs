//! pagegrep: fetch a list of web pages, extract regex matches from each, and
//! persist the matches with per-page timing and error metadata.

pub mod fetch;
pub mod matcher;
pub mod output;
pub mod pipeline;
pub mod samples;
pub mod templates;
pub mod types;

pub use fetch::{fetch, FetchError, HttpPool, PoolConfig};
pub use matcher::{find_matches, match_page};
pub use output::{read_results, JsonFileSink, MemorySink, ResultSink};
pub use pipeline::{flush, Pipeline, RunOptions, RunOutcome, RunSummary};
pub use samples::{load_samples, write_demo_samples};
pub use templates::{resolve, TemplateTable};
pub use types::*;
