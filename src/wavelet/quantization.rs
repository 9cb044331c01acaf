//! Shift based quantization of detail coefficients.

/// Rounds `value` towards zero by `strength` bits, keeping the sign
/// symmetric around zero.
pub fn quantize(value: i32, strength: u32) -> i32 {
    if strength == 0 {
        return value;
    }
    if value > 0 {
        value >> strength
    } else {
        -((value.unsigned_abs() >> strength) as i32)
    }
}

pub fn dequantize(value: i32, strength: u32) -> i32 {
    if strength == 0 {
        return value;
    }
    value.wrapping_shl(strength)
}

/// Strength applied to the detail subbands of `level` (0 = finest).
pub fn level_strength(quality: u32, level: usize) -> u32 {
    quality.saturating_sub(level.min(u32::MAX as usize) as u32)
}
