use serde::Serialize;
use uuid::Uuid;

use roomquote_catalog::GatewayError;
use roomquote_estimate::EstimateError;
use roomquote_store::StoreError;

/// Externally facing error: a human-readable message plus a stable
/// machine-readable kind so the UI can special-case situations like
/// duplicate products ("replace instead?") or primary-category conflicts.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Estimate not found: {0}")]
    EstimateNotFound(String),

    #[error("Room not found: {0}")]
    RoomNotFound(Uuid),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    #[error("That product is already in this room")]
    DuplicateProduct(Uuid),

    #[error("Room dimensions must be numbers greater than zero")]
    InvalidDimensions,

    #[error("Markup must be zero or greater")]
    InvalidMarkup,

    #[error("This room already contains a product from a primary category")]
    PrimaryCategoryConflict(Uuid),

    #[error("The product catalog is currently unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Category rule configuration is missing")]
    ConfigurationMissing,

    #[error("The session store is currently unavailable: {0}")]
    StoreUnavailable(String),
}

impl ApiError {
    /// Stable tag for programmatic handling.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::EstimateNotFound(_)
            | ApiError::RoomNotFound(_)
            | ApiError::ProductNotFound(_)
            | ApiError::NoteNotFound(_) => "not_found",
            ApiError::DuplicateProduct(_) => "duplicate_product",
            ApiError::InvalidDimensions => "invalid_dimensions",
            ApiError::InvalidMarkup => "invalid_markup",
            ApiError::PrimaryCategoryConflict(_) => "primary_category_conflict",
            ApiError::CatalogUnavailable(_) => "catalog_unavailable",
            ApiError::ConfigurationMissing => "configuration_missing",
            ApiError::StoreUnavailable(_) => "store_unavailable",
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

/// Serializable error payload handed to the transport layer.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

impl From<EstimateError> for ApiError {
    fn from(err: EstimateError) -> Self {
        match err {
            EstimateError::RoomNotFound(id) => ApiError::RoomNotFound(id),
            EstimateError::ProductNotFound(id) => ApiError::ProductNotFound(id),
            EstimateError::NoteNotFound(id) => ApiError::NoteNotFound(id),
            EstimateError::DuplicateProduct(id) => ApiError::DuplicateProduct(id),
            EstimateError::InvalidDimensions => ApiError::InvalidDimensions,
            EstimateError::PrimaryCategoryConflict(id) => ApiError::PrimaryCategoryConflict(id),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(id) => ApiError::ProductNotFound(id),
            GatewayError::Unavailable(message) => ApiError::CatalogUnavailable(message),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) => ApiError::StoreUnavailable(message),
        }
    }
}
