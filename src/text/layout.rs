use crate::foundation::core::Vec2f;
use crate::text::font::Font;

/// Where text sits relative to its anchor point, along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    #[default]
    Begin,
    Center,
    End,
}

/// Split on `\r\n`, `\r` and `\n`; a trailing break yields a final empty line.
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let s = rest?;
        match s.find(['\r', '\n']) {
            Some(i) => {
                let skip = if s[i..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&s[i + skip..]);
                Some(&s[..i])
            }
            None => {
                rest = None;
                Some(s)
            }
        }
    })
}

/// Codepoint a character is drawn as; a no-break space is an ordinary space.
pub(crate) fn glyph_code(c: char) -> u32 {
    match c {
        '\u{a0}' => 0x20,
        c => u32::from(c),
    }
}

/// Scale from the font's own pixels to `size`.
pub(crate) fn size_mul(font: &Font, size: f32) -> f32 {
    size / f32::from(font.default_size.max(1))
}

/// Width of one line in font pixels; characters the font lacks take no space.
pub fn line_width(font: &Font, line: &str) -> f32 {
    line.chars()
        .filter_map(|c| font.glyph(glyph_code(c)))
        .map(|g| g.advance as f32)
        .sum()
}

/// Bounding size of `text` drawn at `size` pixels.
pub fn text_size(font: &Font, size: f32, text: &str) -> Vec2f {
    let mul = size_mul(font, size);
    let mut width = 0f32;
    let mut count = 0usize;
    for line in lines(text) {
        width = width.max(line_width(font, line));
        count += 1;
    }
    Vec2f::new(
        width * mul,
        count as f32 * f32::from(font.default_size) * mul,
    )
}

/// Line breaks in `text`, counting `\r\n` once.
pub fn count_newlines(text: &str) -> usize {
    lines(text).count() - 1
}

/// Vertical shift applied to the first line for `valign`.
pub(crate) fn valign_offset(text: &str, size: f32, valign: Align) -> f32 {
    let n = count_newlines(text) as f32;
    match valign {
        Align::Begin => 0.0,
        Align::Center => -n * size * 0.5,
        Align::End => -n * size,
    }
}

/// Horizontal shift applied to a line of `width` for `halign`.
pub(crate) fn halign_offset(width: f32, halign: Align) -> f32 {
    match halign {
        Align::Begin => 0.0,
        Align::Center => -width * 0.5,
        Align::End => -width,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
