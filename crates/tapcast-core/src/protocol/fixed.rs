//! Fixed-point conversions for touch pressure and scroll deltas.
//!
//! The wire format represents bounded floats as 16-bit integers scaled by
//! 2^15 (signed) or 2^16 (unsigned). Conversion truncates toward zero and
//! clamps to the representable range, so `1.0` maps to the maximum value
//! rather than overflowing.

use crate::protocol::codec::ProtocolError;

/// Converts a float in `[-1.0, 1.0]` to a signed 16-bit fixed-point value.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidArgument`] for out-of-range or non-finite
/// input.
pub fn fixed16_signed(value: f32) -> Result<i16, ProtocolError> {
    if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
        return Err(ProtocolError::InvalidArgument(format!(
            "signed fixed-point input {value} outside [-1.0, 1.0]"
        )));
    }
    // `as` casts on floats truncate toward zero, matching the wire contract.
    let scaled = (f64::from(value) * 32768.0) as i64;
    Ok(scaled.clamp(-32768, 32767) as i16)
}

/// Converts a float in `[0.0, 1.0]` to an unsigned 16-bit fixed-point value.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidArgument`] for out-of-range or non-finite
/// input.
pub fn fixed16_unsigned(value: f32) -> Result<u16, ProtocolError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ProtocolError::InvalidArgument(format!(
            "unsigned fixed-point input {value} outside [0.0, 1.0]"
        )));
    }
    let scaled = (f64::from(value) * 65536.0) as i64;
    Ok(scaled.clamp(0, 65535) as u16)
}
