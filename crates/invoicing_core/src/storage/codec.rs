//! Record codec contract and JSON implementation.
//!
//! # Invariants
//! - `encode` output is a single line.
//! - `decode(encode(r)) == r` for every record the codec accepts.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug)]
pub enum CodecError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode record: {err}"),
            Self::Decode(err) => write!(f, "failed to decode record: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err),
        }
    }
}

/// Converts records to and from their one-line stored form.
pub trait RecordCodec<T> {
    fn encode(&self, record: &T) -> CodecResult<String>;
    fn decode(&self, line: &str) -> CodecResult<T>;
}

/// Compact JSON codec; string escapes keep every record on one line.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T> RecordCodec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, record: &T) -> CodecResult<String> {
        serde_json::to_string(record).map_err(CodecError::Encode)
    }

    fn decode(&self, line: &str) -> CodecResult<T> {
        serde_json::from_str(line).map_err(CodecError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::{CodecError, JsonCodec, RecordCodec};
    use crate::model::invoice::{Company, Invoice, InvoiceEntry, Vat};

    fn multiline_invoice() -> Invoice {
        Invoice::new(
            "2024-05-01",
            Company::new("111-222-33-44", "Line one\nLine two", "Buyer"),
            Company::new("5556667788", "Street 1", "Seller"),
            vec![InvoiceEntry::new("desc\r\nwith breaks", 1, 100, Vat::Vat8)],
        )
    }

    #[test]
    fn encoded_record_is_single_line_and_decodes_back() {
        let invoice = multiline_invoice();
        let line = JsonCodec.encode(&invoice).unwrap();

        assert!(!line.contains('\n'));
        assert!(!line.contains('\r'));

        let decoded: Invoice = JsonCodec.decode(&line).unwrap();
        assert_eq!(decoded, invoice);
    }

    #[test]
    fn malformed_line_is_a_decode_error() {
        let result: Result<Invoice, _> = JsonCodec.decode("{not json");
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }
}
