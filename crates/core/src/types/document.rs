//! The contract every persisted document type fulfils.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record stored in a named collection.
///
/// Storage backends only need the collection name and each document's
/// numeric key; everything else travels as JSON.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    /// Collection name, used as the file stem and the database collection key.
    const COLLECTION: &'static str;

    /// The document's identifier as a raw integer.
    fn key(&self) -> i64;
}
