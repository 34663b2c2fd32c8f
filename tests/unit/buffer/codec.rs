use super::*;

fn sample_colors() -> Vec<Color> {
    let mut out = vec![0, 0xffff_ffff, 0xff00_0000, 0x8040_2010, 0x7fff_00ff];
    let mut x = 0x1234_5678u32;
    for _ in 0..256 {
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        out.push(x);
    }
    out
}

#[test]
fn canonical_native_canonical_is_stable() {
    for format in PixelFormat::ALL.into_iter().filter(|f| !f.is_palette()) {
        for c in sample_colors() {
            let once = to_canonical(format, &[], to_native(format, c));
            let twice = to_canonical(format, &[], to_native(format, once));
            assert_eq!(once, twice, "{format} drifted for {c:#010x}");
        }
    }
}

#[test]
fn every_native_value_survives_a_round_trip() {
    for format in [
        PixelFormat::Grey1,
        PixelFormat::Grey2,
        PixelFormat::Grey4,
        PixelFormat::Grey8,
        PixelFormat::Rgb332,
        PixelFormat::Argb1111,
        PixelFormat::Argb2222,
    ] {
        for v in 0..=format.value_mask() {
            assert_eq!(to_native(format, to_canonical(format, &[], v)), v, "{format} value {v}");
        }
    }
}

#[test]
fn sixteen_bit_round_trips() {
    for v in (0..=0xffffu32).step_by(7) {
        for format in [PixelFormat::Rgb565, PixelFormat::Argb4444] {
            assert_eq!(to_native(format, to_canonical(format, &[], v)), v);
        }
    }
}

#[test]
fn known_encodings() {
    assert_eq!(to_native(PixelFormat::Rgb565, 0xffff_0000), 0xf800);
    assert_eq!(to_native(PixelFormat::Rgb565, 0xff00_ff00), 0x07e0);
    assert_eq!(to_native(PixelFormat::Rgb332, 0xff00_00ff), 0x03);
    assert_eq!(to_native(PixelFormat::Argb4444, 0x80ff_8040), 0x8f84);
    assert_eq!(to_native(PixelFormat::Rgb888, 0x1234_5678), 0x0034_5678);
    assert_eq!(to_native(PixelFormat::Grey1, 0xff80_8080), 0);
    assert_eq!(to_native(PixelFormat::Grey1, 0xff81_8181), 1);
}

#[test]
fn widening_replicates_bits() {
    assert_eq!(to_canonical(PixelFormat::Rgb565, &[], 0xffff), 0xffff_ffff);
    assert_eq!(to_canonical(PixelFormat::Rgb332, &[], 0xe0), 0xffff_0000);
    assert_eq!(to_canonical(PixelFormat::Grey2, &[], 1), 0xff55_5555);
    assert_eq!(to_canonical(PixelFormat::Grey4, &[], 0xf), 0xffff_ffff);
    assert_eq!(to_canonical(PixelFormat::Rgb888, &[], 0x0012_3456), 0xff12_3456);
    assert_eq!(to_canonical(PixelFormat::Argb1111, &[], 0x7), 0x00ff_ffff);
}

#[test]
fn palette_lookup_falls_back_to_first_entry() {
    let pal = [0xff11_1111, 0xff22_2222];
    assert_eq!(to_canonical(PixelFormat::Pal8, &pal, 1), 0xff22_2222);
    assert_eq!(to_canonical(PixelFormat::Pal8, &pal, 9), 0xff11_1111);
    assert_eq!(to_canonical(PixelFormat::Pal8, &[], 3), 0);
    assert_eq!(to_native(PixelFormat::Pal4, 0x1234_5673), 3);
}
