use super::*;

#[test]
fn lerp_hits_both_endpoints() {
    assert_eq!(lerp(0, 10, 200), 10);
    assert_eq!(lerp(255, 10, 200), 200);
    assert_eq!(lerp(255, 200, 10), 10);
    let mid = lerp(128, 0, 255);
    assert!((127..=129).contains(&mid));
}

#[test]
fn merge_opacity_extremes() {
    let base = rgb(10, 20, 30);
    assert_eq!(merge(base, 0x00ff_ffff), base);
    assert_eq!(merge(base, rgb(1, 2, 3)), rgb(1, 2, 3));
}

#[test]
fn merge_half_alpha_moves_halfway_and_raises_alpha() {
    let out = merge(argb(0, 0, 0, 0), argb(128, 255, 255, 255));
    assert!((127..=129).contains(&alpha(out)));
    assert!((127..=129).contains(&red(out)));
}

#[test]
fn tint_with_white_is_identity() {
    let c = argb(200, 1, 128, 255);
    assert_eq!(tint(c, WHITE), c);
    assert_eq!(tint(c, BLACK) & 0x00ff_ffff, 0);
}

#[test]
fn closest_in_palette_weights_alpha() {
    let palette = [0xff00_0000, 0xffff_ffff, 0x00ff_ffff];
    assert_eq!(closest_in_palette(&palette, 0xfff0_f0f0), 1);
    assert_eq!(closest_in_palette(&palette, 0x10ff_ffff), 2);
    assert_eq!(closest_in_palette(&[], 0x1234_5678), 0);
}

#[test]
fn hsv_primaries() {
    assert_eq!(hsv(0, 255, 255), rgb(255, 0, 0));
    assert_eq!(hsv(0, 0, 255), WHITE);
    assert_eq!(hsv(0, 255, 0), BLACK);
    assert_eq!(alpha(ahsv(7, 0, 255, 255)), 7);
}

#[test]
fn undo_hsv_recovers_red_and_grey() {
    assert_eq!(undo_hsv(rgb(255, 0, 0)), (0, 255, 255));
    assert_eq!(undo_hsv(rgb(90, 90, 90)), (0, 0, 90));
}
