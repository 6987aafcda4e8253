//! Contiguous-arc test on the 16-pixel Bresenham circle

/// Check if there are at least `min_count` consecutive set bits in the circular 16-bit mask.
///
/// For a run of length n we need `mask & rot(mask, 1) & ... & rot(mask, n - 1) != 0`.
pub fn has_consecutive_bits(mask: u16, min_count: usize) -> bool {
    if min_count > 16 || min_count == 0 {
        return false;
    }

    let mut test_mask = mask;
    for i in 1..min_count {
        test_mask &= mask.rotate_left(i as u32);
        if test_mask == 0 {
            return false;
        }
    }

    test_mask != 0
}

/// Reference implementation walking the circle twice to handle wrap-around
#[cfg(test)]
fn has_consecutive_bits_walk(mask: u16, min_count: usize) -> bool {
    if min_count > 16 || min_count == 0 {
        return false;
    }

    let mut run = 0;
    for i in 0..32 {
        if mask & (1 << (i % 16)) != 0 {
            run += 1;
            if run >= min_count {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}
