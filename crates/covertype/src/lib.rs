#![forbid(unsafe_code)]

pub mod artifacts;
pub mod batch;
pub mod clock;
pub mod domain;
pub mod encoding;
pub mod error;
pub mod history;
pub mod prediction;
pub mod session;
pub mod tabular;
pub mod template;

pub use artifacts::ArtifactStore;
pub use batch::{BatchInput, BatchOutcome};
pub use encoding::{InputAdvisory, encode, review};
pub use error::{
    BatchValidationError, EncodingError, Error, HistoryError, ModelError, OneHotBlock,
    PredictionError,
};
pub use history::{
    BatchRecord, ExportFormat, HistoryFile, HistoryKind, HistoryQuery, HistoryRecord,
    HistoryRepository, HistoryStore, HistorySummary, JsonFileRepository, MemoryRepository,
    SingleRecord,
};
pub use prediction::{
    Classifier, ConfidenceLevel, PredictionResult, PredictionService, TreeEnsemble, TreeNode,
};
pub use session::{BatchPrediction, Session, SinglePrediction};
pub use template::{random_sample, template_csv};

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    CoverType, FEATURE_COUNT, FEATURE_NAMES, FeatureVector, SoilType, TerrainSample,
    WildernessArea,
};
