/// How a format's native values map to colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Palette,
    Grey,
    Color,
}

/// Bit layout of a pixel format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FormatInfo {
    pub bpp: u8,
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub kind: FormatKind,
}

/// Native pixel formats.
///
/// Palette formats store an index into the buffer's palette; every other format stores the
/// color itself at reduced precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    Pal1,
    Pal2,
    Pal4,
    Pal8,
    Pal16,
    Grey1,
    Grey2,
    Grey4,
    Grey8,
    Rgb332,
    Rgb565,
    Argb1111,
    Argb2222,
    Argb4444,
    Rgb888,
    Argb8888,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 16] = [
        PixelFormat::Pal1,
        PixelFormat::Pal2,
        PixelFormat::Pal4,
        PixelFormat::Pal8,
        PixelFormat::Pal16,
        PixelFormat::Grey1,
        PixelFormat::Grey2,
        PixelFormat::Grey4,
        PixelFormat::Grey8,
        PixelFormat::Rgb332,
        PixelFormat::Rgb565,
        PixelFormat::Argb1111,
        PixelFormat::Argb2222,
        PixelFormat::Argb4444,
        PixelFormat::Rgb888,
        PixelFormat::Argb8888,
    ];

    pub const fn info(self) -> FormatInfo {
        const fn pal(bpp: u8) -> FormatInfo {
            FormatInfo {
                bpp,
                a: 1,
                r: 0,
                g: 0,
                b: 0,
                kind: FormatKind::Palette,
            }
        }
        const fn grey(bpp: u8) -> FormatInfo {
            FormatInfo {
                bpp,
                a: 0,
                r: 0,
                g: 0,
                b: 0,
                kind: FormatKind::Grey,
            }
        }
        const fn argb(bpp: u8, a: u8, r: u8, g: u8, b: u8) -> FormatInfo {
            FormatInfo {
                bpp,
                a,
                r,
                g,
                b,
                kind: FormatKind::Color,
            }
        }
        match self {
            PixelFormat::Pal1 => pal(1),
            PixelFormat::Pal2 => pal(2),
            PixelFormat::Pal4 => pal(4),
            PixelFormat::Pal8 => pal(8),
            PixelFormat::Pal16 => pal(16),
            PixelFormat::Grey1 => grey(1),
            PixelFormat::Grey2 => grey(2),
            PixelFormat::Grey4 => grey(4),
            PixelFormat::Grey8 => grey(8),
            PixelFormat::Rgb332 => argb(8, 0, 3, 3, 2),
            PixelFormat::Rgb565 => argb(16, 0, 5, 6, 5),
            PixelFormat::Argb1111 => argb(4, 1, 1, 1, 1),
            PixelFormat::Argb2222 => argb(8, 2, 2, 2, 2),
            PixelFormat::Argb4444 => argb(16, 4, 4, 4, 4),
            PixelFormat::Rgb888 => argb(24, 0, 8, 8, 8),
            PixelFormat::Argb8888 => argb(32, 8, 8, 8, 8),
        }
    }

    pub const fn bpp(self) -> u32 {
        self.info().bpp as u32
    }

    pub fn is_palette(self) -> bool {
        self.info().kind == FormatKind::Palette
    }

    pub fn is_grey(self) -> bool {
        self.info().kind == FormatKind::Grey
    }

    /// True when stored pixels can be translucent; palette entries always may be.
    pub fn has_alpha(self) -> bool {
        self.info().a > 0
    }

    /// Mask covering one native value.
    pub const fn value_mask(self) -> u32 {
        let bpp = self.bpp();
        if bpp >= 32 { u32::MAX } else { (1 << bpp) - 1 }
    }

    /// Bytes needed for a `width` x `height` image, rounded up to a whole byte.
    pub fn storage_len(self, width: u32, height: u32) -> usize {
        let bits = u64::from(self.bpp()) * u64::from(width) * u64::from(height);
        bits.div_ceil(8) as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::Pal1 => "pal1",
            PixelFormat::Pal2 => "pal2",
            PixelFormat::Pal4 => "pal4",
            PixelFormat::Pal8 => "pal8",
            PixelFormat::Pal16 => "pal16",
            PixelFormat::Grey1 => "grey1",
            PixelFormat::Grey2 => "grey2",
            PixelFormat::Grey4 => "grey4",
            PixelFormat::Grey8 => "grey8",
            PixelFormat::Rgb332 => "rgb332",
            PixelFormat::Rgb565 => "rgb565",
            PixelFormat::Argb1111 => "argb1111",
            PixelFormat::Argb2222 => "argb2222",
            PixelFormat::Argb4444 => "argb4444",
            PixelFormat::Rgb888 => "rgb888",
            PixelFormat::Argb8888 => "argb8888",
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for PixelFormat {
    type Err = crate::foundation::error::RasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PixelFormat::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Self::Err::param(format!("unknown pixel format '{s}'")))
    }
}
