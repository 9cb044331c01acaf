//! Haar butterfly.

/// Forward transform of a sample pair into approximation `s` and detail `d`.
#[inline]
pub fn forward(s1: i32, s2: i32) -> (i32, i32) {
    let d = s2.wrapping_sub(s1);
    let s = s1.wrapping_add(d >> 1);
    (s, d)
}

/// Exact inverse of [`forward`].
#[inline]
pub fn inverse(s: i32, d: i32) -> (i32, i32) {
    let s1 = s.wrapping_sub(d >> 1);
    let s2 = d.wrapping_add(s1);
    (s1, s2)
}
