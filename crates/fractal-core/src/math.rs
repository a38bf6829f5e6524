/// GLSL-style fract: always in [0, 1), unlike `f32::fract` for negatives.
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Hash float to [0,1) - port of GLSL hash11
pub fn hash11(p: f32) -> f32 {
    let mut p = fract(p * 0.1031);
    p *= p + 33.33;
    p *= p + p;
    fract(p)
}

/// Smooth interpolation - port of GLSL smoothstep
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Uniform scale of fractal level `level`: halves with every level.
#[inline]
pub fn level_scale(level: usize) -> f32 {
    0.5_f32.powi(level as i32)
}

/// Number of parts on `level` of a 5-ary tree.
#[inline]
pub fn level_len(level: usize) -> usize {
    5_usize.pow(level as u32)
}

/// Total number of parts in a tree of `depth` levels: (5^depth - 1) / 4.
#[inline]
pub fn total_parts(depth: usize) -> usize {
    (5_usize.pow(depth as u32) - 1) / 4
}
