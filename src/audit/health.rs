/// Library health out of 100, from album severities.
///
/// Each Warn album costs one unit, each Crit album two, normalized by two
/// units per album. Track counts don't matter: one Crit album costs the
/// same however many tracks it holds. An empty library is fully healthy.
/// Halves round to even.
pub fn health_percent(album_count: usize, warn_albums: usize, crit_albums: usize) -> u8 {
    if album_count == 0 {
        return 100;
    }
    let penalty = (warn_albums + 2 * crit_albums) as f64;
    let max_units = (2 * album_count) as f64;
    let health = (100.0 * (1.0 - penalty / max_units)).round_ties_even();
    health.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_library_is_healthy() {
        assert_eq!(health_percent(0, 0, 0), 100);
    }

    #[test]
    fn no_issues_is_full_health() {
        assert_eq!(health_percent(12, 0, 0), 100);
    }

    #[test]
    fn single_warn_album_is_half() {
        assert_eq!(health_percent(1, 1, 0), 50);
    }

    #[test]
    fn single_crit_album_is_zero() {
        assert_eq!(health_percent(1, 0, 1), 0);
    }

    #[test]
    fn crit_weighs_double() {
        // 4 albums, 1 crit = 2 units of 8
        assert_eq!(health_percent(4, 0, 1), 75);
        assert_eq!(health_percent(4, 2, 0), 75);
    }

    #[test]
    fn rounds_to_nearest() {
        // 100 * (1 - 1/6) = 83.33
        assert_eq!(health_percent(3, 1, 0), 83);
        // 100 * (1 - 1/12) = 91.67
        assert_eq!(health_percent(6, 1, 0), 92);
    }

    #[test]
    fn halves_round_to_even() {
        // 100 * (1 - 1/8) = 87.5
        assert_eq!(health_percent(4, 1, 0), 88);
        // 100 * (1 - 3/8) = 62.5
        assert_eq!(health_percent(4, 3, 0), 62);
    }

    #[test]
    fn always_within_bounds() {
        for albums in 0..12 {
            for warn in 0..=albums {
                for crit in 0..=(albums - warn) {
                    let h = health_percent(albums, warn, crit);
                    assert!(h <= 100, "{albums}/{warn}/{crit} gave {h}");
                }
            }
        }
        // Inconsistent counts still clamp
        assert_eq!(health_percent(1, 5, 5), 0);
    }
}
