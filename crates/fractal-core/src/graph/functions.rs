//! Parametric surface library.
//!
//! Every function maps `(u, v)` in `[-1, 1]` and time `t` to a point.
//! Wave, multi-wave and ripple are height fields over the `u`/`v` plane;
//! sphere and torus wrap `u` around the vertical axis.

use std::f32::consts::PI;

use glam::Vec3;

use crate::math::smoothstep;

#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum FunctionName {
    #[default]
    Wave = 0,
    MultiWave = 1,
    Ripple = 2,
    Sphere = 3,
    Torus = 4,
}

impl FunctionName {
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Wave,
        Self::MultiWave,
        Self::Ripple,
        Self::Sphere,
        Self::Torus,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Function at `index`, falling back to `Wave` for unknown indices.
    pub fn from_index(index: u32) -> Self {
        Self::ALL
            .get(index as usize)
            .copied()
            .unwrap_or(Self::Wave)
    }

    /// Next function in declaration order, wrapping to `Wave`.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::COUNT]
    }

    /// Pick one of the functions after `Wave` using `r` in `[0, 1)`.
    /// Drawing the current function yields `Wave` instead, so the result is
    /// never `self`.
    pub fn random_other_than(self, r: f32) -> Self {
        let span = (Self::COUNT - 1) as f32;
        let choice = 1 + ((r.clamp(0.0, 1.0) * span) as usize).min(Self::COUNT - 2);
        let choice = Self::ALL[choice];
        if choice == self {
            Self::Wave
        } else {
            choice
        }
    }

    /// Evaluate this function at `(u, v)` and time `t`.
    pub fn evaluate(self, u: f32, v: f32, t: f32) -> Vec3 {
        match self {
            Self::Wave => wave(u, v, t),
            Self::MultiWave => multi_wave(u, v, t),
            Self::Ripple => ripple(u, v, t),
            Self::Sphere => sphere(u, v, t),
            Self::Torus => torus(u, v, t),
        }
    }
}

/// Single travelling sine wave along the diagonal.
pub fn wave(u: f32, v: f32, t: f32) -> Vec3 {
    let y = (PI * (u + v + t)).sin();
    Vec3::new(u, y, v)
}

/// Slow rectified wave on the anti-diagonal plus a fast diagonal one.
pub fn multi_wave(u: f32, v: f32, t: f32) -> Vec3 {
    let mut y = (PI * 0.25 * (u - v + t)).sin().abs();
    y += (PI * (u + v + t)).cos();
    Vec3::new(u, y, v)
}

/// Outward ripple whose amplitude falls off with distance.
pub fn ripple(u: f32, v: f32, t: f32) -> Vec3 {
    let d = (u * u + v * v).sqrt();
    let y = (PI * (4.0 * d - t)).sin() / (1.0 + 10.0 * d);
    Vec3::new(u, y, v)
}

/// Sphere with animated twisting bands.
pub fn sphere(u: f32, v: f32, t: f32) -> Vec3 {
    let r = 0.9 + 0.1 * (PI * (6.0 * u + 4.0 * v + t)).sin();
    let s = (PI * 0.5 * v).cos();
    let q = r * s;
    Vec3::new(
        q * (PI * u).sin(),
        r * (PI * 0.5 * v).sin(),
        q * (PI * u).cos(),
    )
}

/// Torus with a pulsing major radius and a rippling minor radius.
pub fn torus(u: f32, v: f32, t: f32) -> Vec3 {
    let r1 = 0.7 + 0.1 * (PI * (6.0 * u + 0.5 * t)).sin();
    let r2 = 0.15 + 0.05 * (PI * (8.0 * u + 4.0 * v + 2.0 * t)).sin();
    let s = r1 + r2 * (PI * v).cos();
    Vec3::new(
        s * (PI * u).sin(),
        r2 * (PI * v).sin(),
        s * (PI * u).cos(),
    )
}

/// Blend from one function to another. `progress` is eased with a
/// smoothstep and the blend itself is unclamped.
pub fn morph(u: f32, v: f32, t: f32, from: FunctionName, to: FunctionName, progress: f32) -> Vec3 {
    from.evaluate(u, v, t)
        .lerp(to.evaluate(u, v, t), smoothstep(0.0, 1.0, progress))
}
