mod common;

use common::png;
use egui::{Rect, pos2, vec2};
use inpaint_studio::input::PointerEvent;
use inpaint_studio::mask::MaskCanvas;
use inpaint_studio::renderer::{HIGHLIGHT, MASK_THRESHOLD, Renderer, Surface, colorize_mask};
use inpaint_studio::state::EditorContext;
use inpaint_studio::stroke::{StrokeMode, StrokeSegment};

#[test]
fn test_dot_stroke_exports_expected_png() {
    let base = png(100, 100, [0, 128, 255]);
    let mut surface = Surface::for_image(&base).unwrap();
    assert_eq!(surface.mask.dimensions(), (100, 100));
    assert!(surface.mask.is_blank());

    surface
        .mask
        .apply_stroke(&StrokeSegment::new(pos2(10.0, 10.0), pos2(10.0, 10.0), 20.0, StrokeMode::Paint));
    surface.redraw();

    let exported = surface.mask.export_as_image().unwrap();
    assert_eq!(exported.mime(), "image/png");
    let decoded = image::load_from_memory_with_format(exported.data(), image::ImageFormat::Png)
        .unwrap()
        .to_rgba8();
    assert_eq!(decoded.dimensions(), (100, 100));
    assert_eq!(decoded.get_pixel(10, 10).0, [255, 255, 255, 255]);
    assert_eq!(decoded.get_pixel(90, 90).0, [0, 0, 0, 255]);
}

#[test]
fn test_disk_radius_is_respected() {
    let mut mask = MaskCanvas::new(64, 64).unwrap();
    mask.apply_stroke(&StrokeSegment::dot(pos2(0.0, 0.0), 12.0, StrokeMode::Paint));

    for y in 0..64u32 {
        for x in 0..64u32 {
            let d = ((x as f32 + 0.5).powi(2) + (y as f32 + 0.5).powi(2)).sqrt();
            if d <= 11.5 {
                assert!(mask.is_selected(x, y), "({x},{y}) should be inside");
            } else if d > 12.5 {
                assert!(!mask.is_selected(x, y), "({x},{y}) should be outside");
            }
        }
    }
}

#[test]
fn test_reset_clears_every_pixel() {
    let mut mask = MaskCanvas::new(20, 20).unwrap();
    mask.apply_stroke(&StrokeSegment::new(pos2(0.0, 0.0), pos2(20.0, 20.0), 5.0, StrokeMode::Paint));
    assert!(!mask.is_blank());

    mask.reset(30, 10);
    assert_eq!(mask.dimensions(), (30, 10));
    assert!(mask.is_blank());

    mask.reset(0, 10);
    assert_eq!(mask.dimensions(), (30, 10));
}

#[test]
fn test_threshold_decides_highlight() {
    let mut gray = image::GrayImage::new(3, 1);
    gray.put_pixel(0, 0, image::Luma([MASK_THRESHOLD]));
    gray.put_pixel(1, 0, image::Luma([MASK_THRESHOLD + 1]));
    gray.put_pixel(2, 0, image::Luma([255]));

    let overlay = colorize_mask(&gray);
    assert_eq!(overlay.get_pixel(0, 0).0[3], 0);
    assert_eq!(*overlay.get_pixel(1, 0), HIGHLIGHT);
    assert_eq!(*overlay.get_pixel(2, 0), HIGHLIGHT);
}

#[test]
fn test_composite_blends_highlight_over_base() {
    let base = image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 255, 255]));
    let mut renderer = Renderer::new(1, base);
    let mut mask = MaskCanvas::new(4, 4).unwrap();
    mask.apply_stroke(&StrokeSegment::dot(pos2(0.5, 0.5), 0.5, StrokeMode::Paint));

    let before = renderer.frame_version();
    renderer.render(&mask);
    assert!(renderer.frame_version() > before);

    let frame = renderer.frame();
    let highlighted = frame.get_pixel(0, 0).0;
    // ~100/255 red over blue
    assert!((95..=105).contains(&highlighted[0]), "red {}", highlighted[0]);
    assert!((150..=160).contains(&highlighted[2]), "blue {}", highlighted[2]);
    assert_eq!(highlighted[3], 255);
    assert_eq!(frame.get_pixel(3, 3).0, [0, 0, 255, 255]);
}

#[test]
fn test_context_stroke_then_load_resets_mask() {
    let mut ctx = EditorContext::new(20.0);
    ctx.load_image(png(100, 100, [200, 200, 200])).unwrap();
    let display = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));

    assert!(ctx.pointer_down(&PointerEvent::mouse(pos2(10.0, 10.0)), display));
    assert!(ctx.pointer_up().unwrap());
    let mask = ctx.mask().unwrap().decode().unwrap();
    assert_eq!(mask.get_pixel(10, 10).0, [255, 255, 255, 255]);
    assert_eq!(mask.get_pixel(90, 90).0, [0, 0, 0, 255]);

    ctx.load_image(png(50, 40, [0, 0, 0])).unwrap();
    assert!(ctx.mask().is_none());
    let surface = ctx.surface().unwrap();
    assert_eq!(surface.mask.dimensions(), (50, 40));
    assert!(surface.mask.is_blank());
}

#[test]
fn test_frame_versions_advance_across_undo() {
    let mut ctx = EditorContext::new(4.0);
    let a = png(20, 20, [0, 0, 0]);
    ctx.load_image(a.clone()).unwrap();
    let display = Rect::from_min_size(pos2(0.0, 0.0), vec2(20.0, 20.0));

    assert!(ctx.pointer_down(&PointerEvent::mouse(pos2(5.0, 5.0)), display));
    assert!(ctx.pointer_move(&PointerEvent::mouse(pos2(15.0, 5.0)), display));
    ctx.pointer_up().unwrap();
    let painted = ctx.surface().unwrap().renderer.frame_version();

    let request = ctx.inpaint_request().unwrap();
    let ticket = ctx.begin_edit(&request).unwrap();
    ctx.finish_edit(ticket, Ok(png(20, 20, [9, 9, 9]))).unwrap();
    assert!(ctx.undo().unwrap());

    // Back on A with a fresh mask: each new frame must get an unseen version
    let surface = ctx.surface().unwrap();
    assert_eq!(surface.image_id(), a.id());
    assert!(surface.mask.is_blank());
    let fresh = surface.renderer.frame_version();
    assert!(fresh > painted);

    assert!(ctx.pointer_down(&PointerEvent::mouse(pos2(5.0, 15.0)), display));
    assert!(ctx.surface().unwrap().renderer.frame_version() > fresh);
}
