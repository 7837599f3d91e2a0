use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record store I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Record '{key}' could not be (de)serialized: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid record key '{0}'")]
    InvalidKey(String),
}
