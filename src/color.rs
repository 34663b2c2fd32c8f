//! Canonical 32-bit ARGB colors and the integer blending helpers shared by every pixel path.

/// Canonical color: `0xAARRGGBB`, 8 bits per channel, straight (not premultiplied) alpha.
pub type Color = u32;

pub const TRANSPARENT: Color = 0x0000_0000;
pub const BLACK: Color = 0xff00_0000;
pub const WHITE: Color = 0xffff_ffff;

pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Color {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
    argb(0xff, r, g, b)
}

pub const fn alpha(c: Color) -> u8 {
    (c >> 24) as u8
}

pub const fn red(c: Color) -> u8 {
    (c >> 16) as u8
}

pub const fn green(c: Color) -> u8 {
    (c >> 8) as u8
}

pub const fn blue(c: Color) -> u8 {
    c as u8
}

/// Integer lerp where `part` 0..=255 maps onto 0..=256, so 255 lands exactly on `to`.
#[inline]
pub fn lerp(part: u8, from: u8, to: u8) -> u8 {
    let part = i32::from(part) + (i32::from(part) >> 7);
    let from = i32::from(from);
    (from + (((i32::from(to) - from) * part) >> 8)) as u8
}

/// Channel-wise lerp of two colors, alpha included.
pub fn lerp_color(part: u8, from: Color, to: Color) -> Color {
    argb(
        lerp(part, alpha(from), alpha(to)),
        lerp(part, red(from), red(to)),
        lerp(part, green(from), green(to)),
        lerp(part, blue(from), blue(to)),
    )
}

/// Source-over: `top`'s alpha decides how far `base` moves towards opaque `top`.
#[inline]
pub fn merge(base: Color, top: Color) -> Color {
    let part = alpha(top);
    match part {
        0 => base,
        255 => top,
        _ => lerp_color(part, base, top | 0xff00_0000),
    }
}

/// Per-channel multiply of `col` by `tint`.
pub fn tint(col: Color, tint: Color) -> Color {
    argb(
        lerp(alpha(tint), 0, alpha(col)),
        lerp(red(tint), 0, red(col)),
        lerp(green(tint), 0, green(col)),
        lerp(blue(tint), 0, blue(col)),
    )
}

fn palette_error(a: Color, b: Color) -> u32 {
    let d = |x: u8, y: u8| u32::from(x.abs_diff(y));
    d(alpha(a), alpha(b)) * 4 + d(red(a), red(b)) + d(green(a), green(b)) + d(blue(a), blue(b))
}

/// Index of the palette entry with the least weighted channel error; alpha counts four times.
pub fn closest_in_palette(palette: &[Color], color: Color) -> usize {
    let mut best = 0;
    let mut best_err = u32::MAX;
    for (i, &entry) in palette.iter().enumerate() {
        let err = palette_error(entry, color);
        if err < best_err {
            best = i;
            best_err = err;
        }
    }
    best
}

// Hue is 0..0x600: six 256-step phases.
fn hsv_wide(a: u8, h: u16, s: u8, v: u8) -> Color {
    let phase = (h >> 8) as u8;
    let frac = (h & 0xff) as u8;
    let (up, down) = if h & 0x100 != 0 {
        (0xff, lerp(s, 0xff, !frac))
    } else {
        (lerp(s, 0xff, frac), 0xff)
    };
    let up = lerp(v, 0, up);
    let down = lerp(v, 0, down);
    let other = lerp(v, 0, !s);
    let (r, g, b) = match phase >> 1 {
        1 => (other, down, up),
        2 => (up, other, down),
        _ => (down, up, other),
    };
    argb(a, r, g, b)
}

/// Opaque color from hue, saturation and value, all 0..=255.
pub fn hsv(h: u8, s: u8, v: u8) -> Color {
    hsv_wide(255, u16::from(h) * 6, s, v)
}

pub fn ahsv(a: u8, h: u8, s: u8, v: u8) -> Color {
    hsv_wide(a, u16::from(h) * 6, s, v)
}

/// Like [`hsv`] with hue in degrees (0..360).
pub fn hsv_degrees(h: u16, s: u8, v: u8) -> Color {
    let h = u32::from(h % 360) * 6 * 255 / 359;
    hsv_wide(255, h as u16, s, v)
}

/// Inverse of [`hsv`]; returns `(h, s, v)` in 0..=255.
pub fn undo_hsv(c: Color) -> (u8, u8, u8) {
    let (r, g, b) = (red(c), green(c), blue(c));
    if r == g && g == b {
        return (0, 0, r);
    }

    let mut levels = [r, g, b];
    levels.sort_unstable_by(|a, b| b.cmp(a));
    let [high, middle, low] = levels;

    let scale = |x: u8| (u32::from(x) * 255 / u32::from(high)) as u8;
    let (middle_n, low_n) = (scale(middle), scale(low));
    let v = high;
    let s = !low_n;

    // Recover the interpolation position of the middle channel.
    let denom = u32::from(s) + (u32::from(s) >> 7);
    let num = (i32::from(middle_n) - 0xff + i32::from(s)).max(0) as u32;
    let x = ((num << 8) / denom.max(1)).min(255) as u16;

    let wide = if r == high {
        if g == middle { x } else { 0x500 | (255 - x) }
    } else if g == high {
        if b == middle { 0x200 | x } else { 0x100 | (255 - x) }
    } else if r == middle {
        0x400 | x
    } else {
        0x300 | (255 - x)
    };
    (((wide + 3) / 6) as u8, s, v)
}

#[cfg(test)]
#[path = "../tests/unit/color.rs"]
mod tests;
