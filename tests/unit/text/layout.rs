use super::*;

fn mono_font() -> Font {
    let mut font = Font::new("mono", 4, false);
    font.push_mono(0x20, 0x7e, (3, 4), 1, &[0u8; 95 * 4]).unwrap();
    font
}

#[test]
fn lines_split_on_every_break_style() {
    let split: Vec<&str> = lines("a\nb\r\nc\rd").collect();
    assert_eq!(split, ["a", "b", "c", "d"]);
    let split: Vec<&str> = lines("end\n").collect();
    assert_eq!(split, ["end", ""]);
    assert_eq!(lines("").count(), 1);
    assert_eq!(count_newlines("x\r\ny\n"), 2);
}

#[test]
fn size_uses_the_widest_line() {
    let font = mono_font();
    assert_eq!(text_size(&font, 4.0, "ab\nabcd"), Vec2f::new(12.0, 8.0));
    assert_eq!(text_size(&font, 8.0, "ab"), Vec2f::new(12.0, 8.0));
    assert_eq!(text_size(&font, 4.0, ""), Vec2f::new(0.0, 4.0));
}

#[test]
fn missing_glyphs_take_no_space() {
    let font = mono_font();
    assert_eq!(line_width(&font, "a\u{e9}b"), 6.0);
    assert_eq!(line_width(&font, "a\u{a0}b"), 9.0);
}

#[test]
fn alignment_offsets() {
    assert_eq!(halign_offset(10.0, Align::Begin), 0.0);
    assert_eq!(halign_offset(10.0, Align::Center), -5.0);
    assert_eq!(halign_offset(10.0, Align::End), -10.0);
    assert_eq!(valign_offset("a\nb\nc", 6.0, Align::Center), -6.0);
    assert_eq!(valign_offset("a\nb\nc", 6.0, Align::End), -12.0);
    assert_eq!(valign_offset("abc", 6.0, Align::End), 0.0);
}
