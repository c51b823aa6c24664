use crate::{renderer::Rgba, world::MIP_LEVELS};

/// Mip steps taken between the eye and `far` on a surface seen head-on.
const MIP_FACTOR: f32 = 4.0;

/// Scale the colour channels of `c` by `level`, alpha untouched.
///
/// `level >= 1.0` returns `c` unchanged so fully lit surfaces keep their
/// exact texel colour.
#[inline(always)]
pub fn shade(c: Rgba, level: f32) -> Rgba {
    if level >= 1.0 {
        return c;
    }
    let k = (level.max(0.0) * 256.0) as u32;
    let r = ((c >> 16 & 0xFF) * k) >> 8;
    let g = ((c >> 8 & 0xFF) * k) >> 8;
    let b = ((c & 0xFF) * k) >> 8;
    (c & 0xFF00_0000) | r << 16 | g << 8 | b
}

/// Brightness factor for a surface `depth` units away when distance
/// shading is on: full up close, falling off cubically towards `far`.
#[inline(always)]
pub fn diminish(depth: f32, far: f32) -> f32 {
    if far <= 0.0 {
        return 1.0;
    }
    let l = (1.0 - depth / far).clamp(0.0, 1.0);
    (1.5 * l * l * l).min(1.0)
}

/// Mip level for a surface `depth` units away.
///
/// Level `k` starts at `k / (MIP_FACTOR + bias)` of `far`.  Planes pass
/// their depth per unit of height offset as `bias`, so rows near the
/// horizon, seen at a grazing angle, drop levels sooner.
#[inline(always)]
pub fn mip_level(depth: f32, far: f32, bias: f32) -> usize {
    if far <= 0.0 || !depth.is_finite() {
        return 0;
    }
    let nd = (depth / far).clamp(0.0, 1.0);
    (((MIP_FACTOR + bias.abs()) * nd) as usize).min(MIP_LEVELS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_light_is_identity() {
        assert_eq!(shade(0xFF_123456, 1.0), 0xFF_123456);
        assert_eq!(shade(0xFF_123456, 3.0), 0xFF_123456);
    }

    #[test]
    fn half_light_halves_channels() {
        assert_eq!(shade(0xFF_804020, 0.5), 0xFF_402010);
        assert_eq!(shade(0x80_FFFFFF, 0.0), 0x80_000000);
    }

    #[test]
    fn distance_falloff() {
        assert_eq!(diminish(0.0, 100.0), 1.0);
        assert_eq!(diminish(100.0, 100.0), 0.0);
        assert_eq!(diminish(500.0, 100.0), 0.0);
        let mid = diminish(50.0, 100.0);
        assert!((mid - 0.1875).abs() < 1e-6);
    }

    #[test]
    fn mip_steps_with_depth_and_bias() {
        assert_eq!(mip_level(0.0, 512.0, 0.0), 0);
        assert_eq!(mip_level(127.0, 512.0, 0.0), 0);
        assert_eq!(mip_level(128.0, 512.0, 0.0), 1);
        assert_eq!(mip_level(300.0, 512.0, 0.0), 2);
        assert_eq!(mip_level(5000.0, 512.0, 0.0), MIP_LEVELS - 1);
        // grazing planes coarsen sooner
        assert_eq!(mip_level(64.0, 512.0, 12.0), 2);
        assert_eq!(mip_level(f32::INFINITY, 512.0, 0.0), 0);
        assert_eq!(mip_level(300.0, 0.0, 0.0), 0);
    }
}
