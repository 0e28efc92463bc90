//! Small numeric helpers shared by ball physics and paddle deflection.

/// Truncates `value` to an integer, but if that truncation collapses a
/// non-zero value to zero, restores `±1` with the original sign. Used by
/// both `IncreaseVelocity` and the paddle-deflection conversion: integer
/// ball velocities must never silently stall out because a small float
/// component floored to zero.
pub fn to_int_preserving_sign(value: f64) -> i64 {
    let truncated = value.trunc() as i64;
    if truncated == 0 && value != 0.0 {
        if value > 0.0 { 1 } else { -1 }
    } else {
        truncated
    }
}

/// Euclidean speed of an integer velocity.
pub fn speed_i(vx: i64, vy: i64) -> f64 {
    ((vx * vx + vy * vy) as f64).sqrt()
}

/// Scales an integer velocity to the given target speed, preserving
/// direction, rounding each axis with [`to_int_preserving_sign`].
pub fn scale_to_speed(vx: i64, vy: i64, target_speed: f64) -> (i64, i64) {
    let current = speed_i(vx, vy);
    if current == 0.0 {
        return (0, 0);
    }
    let factor = target_speed / current;
    (
        to_int_preserving_sign(vx as f64 * factor),
        to_int_preserving_sign(vy as f64 * factor),
    )
}
