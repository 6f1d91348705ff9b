// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod assemble;
pub mod cluster;
pub mod config;
pub mod extract;
pub mod filter;
pub mod pipeline;
pub mod price;
pub mod recognizer;
pub mod types;
pub mod vision;

pub use assemble::{ReceiptAssembler, ReceiptDocument, DEFAULT_CURRENCY};
pub use cluster::{LineClusterer, LineOrder};
pub use config::{ConfigError, PipelineConfig};
pub use extract::{Extraction, NameOrder, ProductExtractor};
pub use filter::{is_quantity_only, FilterStage, KeywordFilter, SkipReason, SkippedLine};
pub use pipeline::{PipelineError, ReceiptPipeline, ScanResult};
pub use price::{find_price, PriceMatch};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, ReplayRecognizer};
pub use types::{Line, Point, ProductRecord, Token};
pub use vision::VisionResponse;
