use uuid::Uuid;

use crate::error::{Result, TanzuError};

const TRACE_ID_LEN: usize = 16;
const SPAN_ID_LEN: usize = 8;

/// Converts a 16-byte OTLP trace id into the backend's UUID form.
pub fn trace_id_to_uuid(id: &[u8]) -> Result<Uuid> {
    if id.len() != TRACE_ID_LEN || is_zero(id) {
        return Err(TanzuError::InvalidTraceId);
    }
    Uuid::from_slice(id).map_err(|_| TanzuError::InvalidTraceId)
}

/// Converts an 8-byte OTLP span id into a UUID, left-padding with zeros.
pub fn span_id_to_uuid(id: &[u8]) -> Result<Uuid> {
    if is_zero(id) {
        return Err(TanzuError::InvalidSpanId);
    }
    pad_span_id(id)
}

/// An empty or all-zero parent id marks a root span.
pub fn parent_span_id_to_uuid(id: &[u8]) -> Result<Option<Uuid>> {
    if is_zero(id) && (id.is_empty() || id.len() == SPAN_ID_LEN) {
        return Ok(None);
    }
    pad_span_id(id).map(Some)
}

fn pad_span_id(id: &[u8]) -> Result<Uuid> {
    let bytes: [u8; SPAN_ID_LEN] = id.try_into().map_err(|_| TanzuError::InvalidSpanId)?;
    let mut padded = [0u8; TRACE_ID_LEN];
    padded[TRACE_ID_LEN - SPAN_ID_LEN..].copy_from_slice(&bytes);
    Ok(Uuid::from_bytes(padded))
}

fn is_zero(id: &[u8]) -> bool {
    id.iter().all(|b| *b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_trace_id() {
        let id = [
            0x4b, 0xf9, 0x2f, 0x35, 0x77, 0xb3, 0x4d, 0xa6, 0xa3, 0xce, 0x92, 0x9d, 0x0e, 0x0e,
            0x47, 0x36,
        ];
        let uuid = trace_id_to_uuid(&id).unwrap();
        assert_eq!(uuid.to_string(), "4bf92f35-77b3-4da6-a3ce-929d0e0e4736");
    }

    #[test]
    fn pads_span_id() {
        let id = [0x00, 0xf0, 0x67, 0xaa, 0x0b, 0xa9, 0x02, 0xb7];
        let uuid = span_id_to_uuid(&id).unwrap();
        assert_eq!(uuid.to_string(), "00000000-0000-0000-00f0-67aa0ba902b7");
    }

    #[test]
    fn rejects_bad_trace_ids() {
        assert!(matches!(
            trace_id_to_uuid(&[0; 16]),
            Err(TanzuError::InvalidTraceId)
        ));
        assert!(matches!(
            trace_id_to_uuid(&[1; 8]),
            Err(TanzuError::InvalidTraceId)
        ));
        assert!(matches!(
            trace_id_to_uuid(&[]),
            Err(TanzuError::InvalidTraceId)
        ));
    }

    #[test]
    fn rejects_bad_span_ids() {
        assert!(matches!(
            span_id_to_uuid(&[0; 8]),
            Err(TanzuError::InvalidSpanId)
        ));
        assert!(matches!(
            span_id_to_uuid(&[1; 16]),
            Err(TanzuError::InvalidSpanId)
        ));
        assert!(matches!(span_id_to_uuid(&[]), Err(TanzuError::InvalidSpanId)));
    }

    #[test]
    fn parent_id_handling() {
        assert_eq!(parent_span_id_to_uuid(&[]).unwrap(), None);
        assert_eq!(parent_span_id_to_uuid(&[0; 8]).unwrap(), None);
        assert_eq!(
            parent_span_id_to_uuid(&[2; 8]).unwrap().unwrap().to_string(),
            "00000000-0000-0000-0202-020202020202"
        );
        assert!(matches!(
            parent_span_id_to_uuid(&[2; 5]),
            Err(TanzuError::InvalidSpanId)
        ));
    }
}
