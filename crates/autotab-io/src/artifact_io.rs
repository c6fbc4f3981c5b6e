use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{IoError, IoResult};

/// Identifying header of a serialized payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadHeader {
    pub format: String,
    pub version: u32,
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    format: &'a str,
    version: u32,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    payload: T,
}

/// Serialize `payload` as JSON inside a `{format, version, payload}` envelope.
pub fn encode_versioned<T: Serialize>(format: &str, version: u32, payload: &T) -> IoResult<Vec<u8>> {
    let envelope = EnvelopeRef {
        format,
        version,
        payload,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Read only the envelope header, without decoding the payload.
pub fn peek_header(bytes: &[u8]) -> IoResult<PayloadHeader> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decode an envelope written by [`encode_versioned`].
///
/// Fails when the format name differs or the version is newer than
/// `max_version`; older versions are handed to serde as is.
pub fn decode_versioned<T: DeserializeOwned>(
    bytes: &[u8],
    format: &str,
    max_version: u32,
) -> IoResult<T> {
    let header = peek_header(bytes)?;
    if header.format != format {
        return Err(IoError::FormatMismatch {
            expected: format.to_string(),
            found: header.format,
        });
    }
    if header.version > max_version {
        return Err(IoError::UnsupportedVersion {
            format: header.format,
            found: header.version,
            supported: max_version,
        });
    }
    let envelope: Envelope<T> = serde_json::from_slice(bytes)?;
    Ok(envelope.payload)
}
