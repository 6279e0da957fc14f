use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached at construction time.
    #[error("Connection to MongoDB failed: {0}")]
    Connect(#[source] mongodb::error::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("Store operation failed: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("Record could not be encoded: {0}")]
    Encode(#[from] bson::ser::Error),
}
