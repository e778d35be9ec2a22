//! Frame-stepped alpha ramps. The game advances one step per rendered frame
//! instead of sleeping inside an animation loop, so input and quit handling
//! stay live while something is flashing or fading.

/// Opacity ramp that climbs 0 -> 255 and back down, one value per frame.
/// Used for button flashes and the white game-over strobe.
#[derive(Clone, Debug)]
pub struct TwoPassRamp {
    step: i32,
    alpha: i32,
    descending: bool,
}

impl TwoPassRamp {
    pub fn new(step: u8) -> Self {
        TwoPassRamp {
            step: step as i32,
            alpha: 0,
            descending: false,
        }
    }
}

impl Iterator for TwoPassRamp {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if !self.descending {
            if self.alpha < 255 {
                let a = self.alpha;
                self.alpha += self.step;
                return Some(a as u8);
            }
            self.descending = true;
            self.alpha = 255;
        }
        if self.alpha > 0 {
            let a = self.alpha;
            self.alpha -= self.step;
            Some(a as u8)
        } else {
            None
        }
    }
}

/// One-way 0 -> 255 ramp for background color transitions. The final color
/// is applied by the caller once the ramp runs out.
#[derive(Clone, Debug)]
pub struct FadeIn {
    step: i32,
    alpha: i32,
}

impl FadeIn {
    pub fn new(step: u8) -> Self {
        FadeIn {
            step: step as i32,
            alpha: 0,
        }
    }
}

impl Iterator for FadeIn {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.alpha < 255 {
            let a = self.alpha;
            self.alpha += self.step;
            Some(a as u8)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The flash ramp rises in steps of 50 and falls from full opacity in the
    /// same steps, never emitting 255 on the way up or 0 on the way down.
    #[test]
    fn flash_ramp_emits_both_passes() {
        let values: Vec<u8> = TwoPassRamp::new(50).collect();
        assert_eq!(
            values,
            [0, 50, 100, 150, 200, 250, 255, 205, 155, 105, 55, 5]
        );
    }

    #[test]
    fn flash_ramp_is_finite() {
        let mut ramp = TwoPassRamp::new(50);
        for _ in 0..12 {
            assert!(ramp.next().is_some());
        }
        assert_eq!(ramp.next(), None);
        assert_eq!(ramp.next(), None);
    }

    #[test]
    fn ramp_with_exact_divisor_peaks_once() {
        let values: Vec<u8> = TwoPassRamp::new(51).collect();
        assert_eq!(values, [0, 51, 102, 153, 204, 255, 204, 153, 102, 51]);
    }

    #[test]
    fn fade_stops_short_of_full_opacity() {
        let values: Vec<u8> = FadeIn::new(40).collect();
        assert_eq!(values, [0, 40, 80, 120, 160, 200, 240]);
    }

    #[test]
    fn fade_is_finite() {
        let mut fade = FadeIn::new(40);
        assert_eq!(fade.by_ref().count(), 7);
        assert_eq!(fade.next(), None);
    }
}
