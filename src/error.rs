use thiserror::Error;

/// Client-side stock-ceiling violations, detected before any network call.
///
/// The two cases carry distinct messages so the view layer can tell a line
/// that is already maxed out apart from one that still has headroom.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("Maximum available quantity already in cart")]
    AlreadyAtMax,

    #[error("Only {0} more available in this size")]
    OnlyAvailable(u32),
}

/// Failures talking to the remote storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP response. `conflicts` holds the per-line messages of
    /// a structured stock-conflict rejection when the server sent one.
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        conflicts: Vec<String>,
    },

    #[error("response decode error: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: message.into(),
            conflicts: Vec::new(),
        }
    }

    /// Stock-conflict lines from an order rejection, if any.
    pub fn stock_conflicts(&self) -> Option<&[String]> {
        match self {
            ApiError::Status { conflicts, .. } if !conflicts.is_empty() => Some(conflicts),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("corrupt persisted state: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Order-placement failures. Stock conflicts are distinguished so the caller
/// can send the user back to the cart instead of retrying.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("some items are no longer available")]
    StockConflict(Vec<String>),

    #[error("cart is empty")]
    EmptyCart,

    #[error("guest checkout requires an email address")]
    MissingGuestEmail,

    #[error(transparent)]
    Api(#[from] ApiError),
}
