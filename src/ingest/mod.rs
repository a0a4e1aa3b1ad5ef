mod ingestor;
mod session;

pub use ingestor::{IngestUpdate, StreamIngestor};
pub use session::SessionId;
