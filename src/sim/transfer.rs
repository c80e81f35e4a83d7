//! Per-band steady-state gain of the room relative to the emitted spectrum.

use super::histogram::IrHistogram;

/// Added to emitted energy before dividing
pub const TRANSFER_EPSILON: f64 = 1e-10;

/// First time bin carrying any energy, i.e. the direct-sound arrival
pub fn direct_arrival_bin(ir: &IrHistogram) -> Option<usize> {
    ir.rows()
        .position(|row| row.iter().sum::<f32>() > 0.0)
}

/// Direct-window length in bins: `round(seconds * rate)`, at least one bin
pub fn direct_window_bins(direct_window_s: f32, sample_rate: f32) -> usize {
    ((direct_window_s * sample_rate).round() as usize).max(1)
}

/// `sqrt(received_b / emitted_b)` over the direct-sound window.
///
/// Sums each band over `[arrival, arrival + window)` (clipped to the
/// histogram) and normalizes by the emitter's energy in that band. Returns
/// zeros until sound has arrived. Bands missing from `emitter` count as
/// silent.
pub fn compute_transfer_function(
    ir: &IrHistogram,
    direct_window_s: f32,
    sample_rate: f32,
    emitter: &[f32],
) -> Vec<f32> {
    let mut out = vec![0.0; ir.bands()];
    let Some(arrival) = direct_arrival_bin(ir) else {
        return out;
    };

    let end = arrival
        .saturating_add(direct_window_bins(direct_window_s, sample_rate))
        .min(ir.bins());
    let mut sums = vec![0.0f64; ir.bands()];
    for bin in arrival..end {
        for (sum, &value) in sums.iter_mut().zip(ir.row(bin)) {
            *sum += value as f64;
        }
    }

    for (band, (gain, sum)) in out.iter_mut().zip(&sums).enumerate() {
        *gain = band_gain(*sum, emitter.get(band).copied().unwrap_or(0.0));
    }
    out
}

/// Transfer function straight from the engine's received-energy vector
pub fn transfer_from_received(listener: &[f32], emitter: &[f32]) -> Vec<f32> {
    listener
        .iter()
        .enumerate()
        .map(|(band, &received)| {
            band_gain(received as f64, emitter.get(band).copied().unwrap_or(0.0))
        })
        .collect()
}

/// Scale received energies so the loudest band is 1.0 (all zeros stay zero)
pub fn normalize_received(raw: &[f32]) -> Vec<f32> {
    let max = raw.iter().copied().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return vec![0.0; raw.len()];
    }
    raw.iter().map(|&value| value / max).collect()
}

fn band_gain(received: f64, emitted: f32) -> f32 {
    let ratio = received.max(0.0) / (emitted.max(0.0) as f64 + TRANSFER_EPSILON);
    ratio.sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_silent_histogram_gives_zeros() {
        let ir = IrHistogram::new(100, 4);
        assert_eq!(direct_arrival_bin(&ir), None);
        assert_eq!(
            compute_transfer_function(&ir, 0.001, 44100.0, &[1.0; 4]),
            vec![0.0; 4]
        );
    }

    #[test]
    fn test_single_bin_direct_sound() {
        // 0.001 s at 44.1 kHz = 44 bins; energy only at bin 0, band 0
        let mut ir = IrHistogram::new(44000, 10);
        ir.set(0, 0, 4.0);

        let mut emitter = [0.0; 10];
        emitter[0] = 1.0;
        let tf = compute_transfer_function(&ir, 0.001, 44100.0, &emitter);

        assert!((tf[0] - 2.0).abs() < 1e-6);
        assert!(tf[1..].iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_window_starts_at_arrival() {
        let mut ir = IrHistogram::new(200, 1);
        ir.set(50, 0, 1.0);
        ir.set(52, 0, 3.0);
        // outside a 10-bin window
        ir.set(70, 0, 100.0);

        assert_eq!(direct_arrival_bin(&ir), Some(50));
        let tf = compute_transfer_function(&ir, 10.0 / 44100.0, 44100.0, &[1.0]);
        assert!((tf[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_window_clipped_to_histogram() {
        let mut ir = IrHistogram::new(10, 1);
        ir.set(9, 0, 9.0);
        let tf = compute_transfer_function(&ir, 1.0, 44100.0, &[1.0]);
        assert!((tf[0] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_huge_window_covers_rest_of_histogram() {
        let mut ir = IrHistogram::new(10, 1);
        ir.set(3, 0, 1.0);
        ir.set(9, 0, 3.0);
        for window_s in [1e30, f32::INFINITY] {
            let tf = compute_transfer_function(&ir, window_s, 44100.0, &[1.0]);
            assert!((tf[0] - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_window_still_covers_one_bin() {
        assert_eq!(direct_window_bins(0.0, 44100.0), 1);
        assert_eq!(direct_window_bins(0.001, 44100.0), 44);
    }

    #[test]
    fn test_received_helpers() {
        let tf = transfer_from_received(&[4.0, 9.0], &[1.0, 1.0]);
        assert!((tf[0] - 2.0).abs() < 1e-6);
        assert!((tf[1] - 3.0).abs() < 1e-6);

        assert_eq!(normalize_received(&[1.0, 4.0, 2.0]), vec![0.25, 1.0, 0.5]);
        assert_eq!(normalize_received(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert!(normalize_received(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_transfer_is_finite_and_non_negative(
            cells in prop::collection::vec(0.0f32..1e6, 64 * 4),
            emitter in prop::collection::vec(1e-3f32..1e6, 4),
            window_s in 0.0f32..0.01,
        ) {
            let ir = IrHistogram::from_data(64, 4, cells).unwrap();
            let tf = compute_transfer_function(&ir, window_s, 44100.0, &emitter);
            prop_assert_eq!(tf.len(), 4);
            for gain in tf {
                prop_assert!(gain.is_finite());
                prop_assert!(gain >= 0.0);
            }
        }
    }
}
