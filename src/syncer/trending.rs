use crate::models::Market;

/// Sum of four bounded components (spec.md §4.4 "Trending score").
pub fn compute_score(m: &Market) -> f64 {
    volume_component(m.volume_24h)
        + movement_component(m.change_24h)
        + velocity_component(m.volume_1h, m.volume_24h)
        + interest_component(m.probability)
}

fn volume_component(volume_24h: f64) -> f64 {
    if volume_24h >= 1_000_000.0 {
        40.0
    } else if volume_24h >= 500_000.0 {
        30.0
    } else if volume_24h >= 100_000.0 {
        20.0
    } else if volume_24h >= 50_000.0 {
        10.0
    } else {
        0.0
    }
}

fn movement_component(change_24h: f64) -> f64 {
    let magnitude = change_24h.abs();
    if magnitude >= 0.15 {
        30.0
    } else if magnitude >= 0.10 {
        25.0
    } else if magnitude >= 0.05 {
        15.0
    } else if magnitude >= 0.02 {
        10.0
    } else {
        0.0
    }
}

fn velocity_component(volume_1h: f64, volume_24h: f64) -> f64 {
    if volume_1h <= 0.0 || volume_24h <= 0.0 {
        return 0.0;
    }
    let ratio = volume_1h / (volume_24h / 24.0);
    if ratio >= 5.0 {
        20.0
    } else if ratio >= 3.0 {
        15.0
    } else if ratio >= 2.0 {
        10.0
    } else {
        0.0
    }
}

/// Rewards markets near a 50/50 split; may be negative at the extremes.
fn interest_component(probability: f64) -> f64 {
    10.0 - (probability - 0.5).abs() * 20.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_thresholds_step_down() {
        assert_eq!(volume_component(2_000_000.0), 40.0);
        assert_eq!(volume_component(500_000.0), 30.0);
        assert_eq!(volume_component(60_000.0), 10.0);
        assert_eq!(volume_component(1_000.0), 0.0);
    }

    #[test]
    fn interest_peaks_at_half() {
        assert_eq!(interest_component(0.5), 10.0);
        assert!(interest_component(0.99) < 0.0);
    }

    #[test]
    fn velocity_requires_both_positive() {
        assert_eq!(velocity_component(0.0, 100.0), 0.0);
        assert_eq!(velocity_component(100.0, 0.0), 0.0);
        assert_eq!(velocity_component(50.0, 100.0), 20.0);
    }
}
