pub mod error;
pub mod extract;
pub mod http;
pub mod pipeline;
pub mod remote;
pub mod store;
pub mod sync;
pub mod types;

pub use error::{FetchError, RemoteError, StoreError, SyncError};
pub use extract::{Extractor, HeuristicExtractor, StructuredDataExtractor};
pub use http::{FetchClient, FetchClientBuilder, HttpClient, MockClient, MockResponse};
pub use pipeline::RecipePipeline;
pub use remote::{DriveClient, MockRemoteStore, RemoteStore, JSON_MIME};
pub use store::{MemoryStore, RecipeStore, SqliteStore};
pub use sync::{SyncReconciler, RECIPES_FILE};
pub use types::{Category, FileMeta, Recipe, SyncOutcome};
