use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Power lines are drawn darker than the torque line of the same run.
const POWER_LIGHTNESS: f32 = 0.45;
const TORQUE_LIGHTNESS: f32 = 0.65;

fn hsl_to_rgb(hue: f32, lightness: f32) -> [u8; 3] {
    let rgb: Srgb = Hsl::new(hue, 0.75, lightness).into_color();
    [
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    ]
}

/// One `(power, torque)` colour pair per series, using evenly spaced hues.
/// Both lines of a run share a hue.
pub fn trace_colors(n: usize) -> Vec<([u8; 3], [u8; 3])> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            (
                hsl_to_rgb(hue, POWER_LIGHTNESS),
                hsl_to_rgb(hue, TORQUE_LIGHTNESS),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_sizes() {
        assert!(trace_colors(0).is_empty());
        assert_eq!(trace_colors(3).len(), 3);
    }

    #[test]
    fn palette_colours_are_distinct() {
        let colours: Vec<[u8; 3]> = trace_colors(4).into_iter().map(|(p, _)| p).collect();
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn first_hue_is_red() {
        let ([r, g, b], _) = trace_colors(1)[0];
        assert!(r > g && r > b);
    }

    #[test]
    fn torque_shade_is_lighter() {
        for (power, torque) in trace_colors(4) {
            let sum = |c: [u8; 3]| c.iter().map(|&v| v as u32).sum::<u32>();
            assert!(sum(torque) > sum(power));
        }
    }
}
