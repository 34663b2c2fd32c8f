use super::*;
use crate::color;
use crate::foundation::error::{ErrorCode, last_error};

const RED: Color = 0xffff_0000;

fn no_fonts() -> BTreeMap<String, Font> {
    BTreeMap::new()
}

#[test]
fn colors_parse_from_hex_or_numbers() {
    assert_eq!(parse_hex_color("#ff0000"), Ok(RED));
    assert_eq!(parse_hex_color("80ff0000"), Ok(0x80ff_0000));
    assert!(parse_hex_color("#f00").is_err());
    assert!(parse_hex_color("#zzzzzz").is_err());

    let c: SceneColor = serde_json::from_str("4294901760").unwrap();
    assert_eq!(c, SceneColor(RED));
    let c: SceneColor = serde_json::from_str("\"#00ff00\"").unwrap();
    assert_eq!(c, SceneColor(0xff00_ff00));
    assert_eq!(serde_json::to_string(&SceneColor(RED)).unwrap(), "\"#ffff0000\"");
}

#[test]
fn ops_are_tagged_and_flat() {
    let scene = Scene::from_json(
        r##"{
            "width": 8, "height": 6,
            "ops": [
                { "op": "background", "color": "#ffffff" },
                { "op": "rect", "x": 1, "y": 1, "w": 2, "h": 2, "color": "#ff0000" },
                { "op": "line", "x0": 0, "y0": 5, "x1": 7, "y1": 5, "color": "#0000ff",
                  "thickness": 1.0 },
                { "op": "push" },
                { "op": "translate", "x": 4, "y": 0 },
                { "op": "circle", "x": 1, "y": 1, "r": 1, "color": "#00ff00", "outline": true },
                { "op": "pop" }
            ]
        }"##,
    )
    .unwrap();
    assert_eq!(scene.format, PixelFormat::Argb8888);
    assert_eq!(scene.ops.len(), 7);
    assert_eq!(
        scene.ops[1],
        Op::Rect {
            rect: Rectf::new(1.0, 1.0, 2.0, 2.0),
            color: SceneColor(RED),
        }
    );
    assert!(matches!(
        scene.ops[2],
        Op::Line {
            thickness: Some(t),
            ..
        } if t == 1.0
    ));
}

#[test]
fn rendering_runs_every_op() {
    let scene = Scene::from_json(
        r##"{
            "width": 6, "height": 6,
            "ops": [
                { "op": "background", "color": "#ffffff" },
                { "op": "push" },
                { "op": "translate", "x": 2, "y": 2 },
                { "op": "rect", "x": 0, "y": 0, "w": 2, "h": 2, "color": "#ff0000" },
                { "op": "pop" },
                { "op": "clip", "x": 0, "y": 0, "w": 1, "h": 6 },
                { "op": "rect", "x": 0, "y": 0, "w": 6, "h": 1, "color": "#ff0000" }
            ]
        }"##,
    )
    .unwrap();
    let mut ctx = RenderContext::sync();
    let buf = scene.render(&mut ctx, &no_fonts()).unwrap();
    assert_eq!(buf.get_pixel(2, 2), RED);
    assert_eq!(buf.get_pixel(3, 3), RED);
    assert_eq!(buf.get_pixel(1, 1), color::WHITE);
    assert_eq!(buf.get_pixel(0, 0), RED);
    assert_eq!(buf.get_pixel(1, 0), color::WHITE);
    assert_eq!(buf.stack().depth(), 0);
}

#[test]
fn palette_scenes_draw_indices() {
    let scene = Scene {
        width: 4,
        height: 4,
        format: PixelFormat::Pal2,
        palette: vec![SceneColor(color::BLACK), SceneColor(color::WHITE)],
        fonts: BTreeMap::new(),
        ops: vec![Op::Rect {
            rect: Rectf::new(0.0, 0.0, 2.0, 4.0),
            color: SceneColor(1),
        }],
    };
    let buf = scene.render(&mut RenderContext::sync(), &no_fonts()).unwrap();
    assert_eq!(buf.get_pixel_raw(1, 1), 1);
    assert_eq!(buf.get_pixel_raw(2, 1), 0);
    assert_eq!(buf.get_pixel(0, 0), color::WHITE);
}

#[test]
fn invalid_scenes_are_rejected() {
    let mut ctx = RenderContext::sync();
    let mut scene = Scene {
        width: 0,
        height: 4,
        format: PixelFormat::Argb8888,
        palette: Vec::new(),
        fonts: BTreeMap::new(),
        ops: Vec::new(),
    };
    assert_eq!(scene.render(&mut ctx, &no_fonts()).unwrap_err().code(), ErrorCode::Param);

    scene.width = 4;
    scene.format = PixelFormat::Pal4;
    assert_eq!(scene.validate().unwrap_err().code(), ErrorCode::Param);

    scene.format = PixelFormat::Argb8888;
    scene.ops.push(Op::Text {
        font: "missing".into(),
        text: "hi".into(),
        x: 0.0,
        y: 0.0,
        layout: TextLayout::new(8.0),
        color: SceneColor(RED),
    });
    assert_eq!(scene.validate().unwrap_err().code(), ErrorCode::Param);
}

#[test]
fn unbalanced_pop_reports_underflow() {
    let scene = Scene {
        width: 2,
        height: 2,
        format: PixelFormat::Rgb565,
        palette: Vec::new(),
        fonts: BTreeMap::new(),
        ops: vec![Op::Push, Op::Pop, Op::Pop],
    };
    let err = scene.render(&mut RenderContext::sync(), &no_fonts()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Underflow);
    assert_eq!(last_error(), ErrorCode::Underflow);
}

#[test]
fn text_ops_use_loaded_fonts() {
    let mut font = Font::new("block", 2, false);
    font.push_mono(0x41, 0x41, (2, 2), 1, &[0b11, 0b11]).unwrap();
    let fonts = BTreeMap::from([("block".to_string(), font)]);
    let scene = Scene {
        width: 4,
        height: 4,
        format: PixelFormat::Argb8888,
        palette: Vec::new(),
        fonts: BTreeMap::from([("block".to_string(), PathBuf::from("block.bin"))]),
        ops: vec![
            Op::Background {
                color: SceneColor(color::WHITE),
            },
            Op::Text {
                font: "block".into(),
                text: "A".into(),
                x: 1.0,
                y: 1.0,
                layout: TextLayout::new(2.0),
                color: SceneColor(RED),
            },
        ],
    };
    let buf = scene.render(&mut RenderContext::sync(), &fonts).unwrap();
    assert_eq!(buf.get_pixel(1, 1), RED);
    assert_eq!(buf.get_pixel(2, 2), RED);
    assert_eq!(buf.get_pixel(3, 3), color::WHITE);
}
