pub use super::model::{FieldMap, ParseError};

pub trait LogParser: Send + Sync {
    /// parse a raw log line into a fully populated field map
    fn parse(&self, raw: &[u8]) -> Result<FieldMap, ParseError>;
}
