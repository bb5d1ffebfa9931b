pub mod use_cases;

pub use use_cases::auth::{AuthSession, AuthSettings, AuthUseCase};
pub use use_cases::catalog::CatalogUseCase;
pub use use_cases::file_ingestion::FileIngestionUseCase;
pub use use_cases::search::SearchUseCase;
pub use use_cases::upload::UploadUseCase;
