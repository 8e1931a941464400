//! Stable display colors for tags.

/// Colors a tag can take, in palette order.
pub const PALETTE: [&str; 10] = [
    "blue", "green", "purple", "magenta", "yellow", "bright_blue", "red", "bright_red", "cyan",
    "bright_cyan",
];

/// Pick a palette color for `name`.
///
/// The same name always maps to the same color, and the mapping matches the
/// web dashboard: the running hash is a double and only the shifted operand
/// is truncated to 32 bits.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn color_for_name(name: &str) -> &'static str {
    let mut hash = 0.0_f64;
    for unit in name.encode_utf16() {
        let shifted = f64::from(to_int32(hash).wrapping_shl(5));
        hash = f64::from(unit) + (shifted - hash);
    }
    let index = (hash.abs() % PALETTE.len() as f64) as usize;
    PALETTE[index]
}

/// ECMAScript `ToInt32`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]
fn to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    (value.trunc().rem_euclid(4_294_967_296.0) as u32) as i32
}
