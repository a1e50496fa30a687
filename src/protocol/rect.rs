use crate::VncError;
use tokio::io::{AsyncRead, AsyncReadExt};

/// A framebuffer region named by an update rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub(crate) async fn read<S>(reader: &mut S) -> Result<Self, VncError>
    where
        S: AsyncRead + Unpin,
    {
        Ok(Self {
            x: reader.read_u16().await?,
            y: reader.read_u16().await?,
            width: reader.read_u16().await?,
            height: reader.read_u16().await?,
        })
    }

    pub(crate) fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Aspect ratios of commercially common displays, used by [`Screen::score`].
const SCREEN_RATIOS: [(u64, u64); 6] = [(3, 2), (4, 3), (16, 10), (16, 9), (32, 9), (64, 27)];

/// A detected physical screen inside the composite framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Screen {
    /// A measure of confidence that this rectangle is a real display.
    ///
    /// Proportional to the pixel area; screens whose aspect ratio (best
    /// rational approximation with denominator at most 64) is not a
    /// standard one are further multiplied by the ratio or its
    /// reciprocal, whichever is smaller.
    pub fn score(&self) -> f64 {
        let area = self.width as f64 * self.height as f64;
        if self.width == 0 || self.height == 0 {
            return 0.0;
        }
        let wide = limit_denominator(self.width as u64, self.height as u64, 64);
        let tall = limit_denominator(self.height as u64, self.width as u64, 64);
        let standard = SCREEN_RATIOS
            .iter()
            .any(|&ratio| ratio == wide || ratio == tall);
        if standard {
            area
        } else {
            area * self.width.min(self.height) as f64 / self.width.max(self.height) as f64
        }
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// The closest fraction to `n / d` whose denominator is at most `max_d`
/// (continued-fraction walk, as `fractions.Fraction.limit_denominator`).
fn limit_denominator(n: u64, d: u64, max_d: u64) -> (u64, u64) {
    let g = gcd(n, d);
    let (n, d) = (n / g, d / g);
    if d <= max_d {
        return (n, d);
    }
    let (mut p0, mut q0, mut p1, mut q1) = (0u64, 1u64, 1u64, 0u64);
    let (mut num, mut den) = (n, d);
    loop {
        let a = num / den;
        let q2 = q0 + a * q1;
        if q2 > max_d {
            break;
        }
        (p0, q0, p1, q1) = (p1, q1, p0 + a * p1, q2);
        (num, den) = (den, num - a * den);
    }
    let k = (max_d - q0) / q1;
    let (lo_n, lo_d) = (p0 + k * p1, q0 + k * q1);
    let (hi_n, hi_d) = (p1, q1);
    // |hi - n/d| <= |n/d - lo| decided by cross-multiplication.
    let hi_err = (hi_n as i128 * d as i128 - n as i128 * hi_d as i128).abs() * lo_d as i128;
    let lo_err = (n as i128 * lo_d as i128 - lo_n as i128 * d as i128).abs() * hi_d as i128;
    if hi_err <= lo_err {
        (hi_n, hi_d)
    } else {
        (lo_n, lo_d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_ratios_reduce() {
        assert_eq!(limit_denominator(1920, 1080, 64), (16, 9));
        assert_eq!(limit_denominator(1600, 1200, 64), (4, 3));
        assert_eq!(limit_denominator(5, 10, 64), (1, 2));
    }

    #[test]
    fn near_ratios_approximate() {
        // 1366x768 is not exactly 16:9 but rounds to it within
        // denominator 64.
        assert_eq!(limit_denominator(1366, 768, 64), (16, 9));
    }

    #[test]
    fn standard_aspect_outranks_odd_aspect() {
        let standard = Screen { x: 0, y: 0, width: 1600, height: 900 };
        let odd = Screen { x: 0, y: 0, width: 1600, height: 1100 };
        // 16:9 scores its full area; 16:11 is penalised below it even
        // though it has more pixels.
        assert_eq!(standard.score(), 1600.0 * 900.0);
        assert_eq!(odd.score(), 1600.0 * 1100.0 * 1100.0 / 1600.0);
        assert!(standard.score() > odd.score());
    }

    #[test]
    fn rotated_standard_ratio_counts() {
        let portrait = Screen { x: 0, y: 0, width: 1080, height: 1920 };
        assert_eq!(portrait.score(), 1080.0 * 1920.0);
    }
}
