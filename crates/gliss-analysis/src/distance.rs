/// Stepwise distance between two chords given as grid indices.
///
/// The smaller set drives the sum: each of its steps contributes the
/// distance to its nearest step in the larger set. Steps of the larger set
/// may be the nearest neighbour of several notes, so this is not a
/// matching distance. Argument order does not matter.
pub fn chord_distance(a: &[usize], b: &[usize]) -> usize {
    if a.len() <= b.len() {
        directed_distance(a, b)
    } else {
        directed_distance(b, a)
    }
}

/// Sum over `from` of the distance to the nearest step in `to`.
///
/// Unlike [`chord_distance`] this does not reorder its arguments, so
/// `directed_distance(a, b)` and `directed_distance(b, a)` differ when the
/// chords have different sizes. An empty `to` contributes nothing.
pub fn directed_distance(from: &[usize], to: &[usize]) -> usize {
    from.iter()
        .map(|&s| to.iter().map(|&t| s.abs_diff(t)).min().unwrap_or(0))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_chords_are_zero() {
        assert_eq!(chord_distance(&[10, 20, 30], &[10, 20, 30]), 0);
    }

    #[test]
    fn smaller_chord_drives_sum() {
        // 10 -> 11 (1), 20 -> 18 (2); 40 is never visited
        assert_eq!(chord_distance(&[10, 20], &[11, 18, 40]), 3);
        assert_eq!(chord_distance(&[11, 18, 40], &[10, 20]), 3);
    }

    #[test]
    fn larger_notes_can_be_reused() {
        // both 10 and 12 snap to 11
        assert_eq!(chord_distance(&[10, 12], &[11, 50, 60]), 2);
    }

    #[test]
    fn directed_distance_is_asymmetric() {
        let a = [10, 20];
        let b = [10, 20, 30];
        assert_eq!(directed_distance(&a, &b), 0);
        assert_eq!(directed_distance(&b, &a), 10);
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(chord_distance(&[], &[1, 2]), 0);
        assert_eq!(directed_distance(&[1, 2], &[]), 0);
    }
}
