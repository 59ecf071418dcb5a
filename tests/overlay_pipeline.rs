//! Redraw pipeline behaviour against a recording surface.
//!
//! Covers the registration contract: contain-fit mapping, device pixel ratio
//! handling, label placement, idempotent redraws and layout changes.

use detection_overlay::{
    Color, CssSize, Detection, DevicePixelRatio, DisplayedImage, DrawOp, GeometryError,
    NativeRect, OverlayRenderer, OverlayStyle, RecordingSurface, RedrawOutcome, ScreenRect,
    Surface,
};

const EPS: f64 = 1e-9;

fn cat() -> Detection {
    Detection::new("cat", 0.873, NativeRect::new(100.0, 50.0, 200.0, 150.0))
}

fn renderer_with(detections: Vec<Detection>) -> OverlayRenderer {
    let mut renderer = OverlayRenderer::new(OverlayStyle::default());
    renderer.set_detections(detections);
    renderer
}

fn one() -> DevicePixelRatio {
    DevicePixelRatio::new(1.0)
}

#[test]
fn maps_detection_into_letterboxed_box() {
    let image = DisplayedImage::with_natural_size(800, 600, CssSize::new(400.0, 400.0));
    let renderer = renderer_with(vec![cat()]);
    let mut surface = RecordingSurface::new();

    let report = renderer.redraw(&image, one(), &mut surface).unwrap();
    assert!((report.geometry.scale - 0.5).abs() < EPS);
    assert!(report.geometry.offset_x.abs() < EPS);
    assert!((report.geometry.offset_y - 50.0).abs() < EPS);
    assert_eq!(report.painted, 1);

    assert_eq!(
        surface.stroked_rects(),
        vec![ScreenRect::new(50.0, 75.0, 100.0, 75.0)]
    );
    assert_eq!(surface.texts(), vec!["cat 87%"]);
}

#[test]
fn label_background_sits_above_box_and_fits_text() {
    let image = DisplayedImage::with_natural_size(800, 600, CssSize::new(400.0, 400.0));
    let renderer = renderer_with(vec![cat()]);
    let mut surface = RecordingSurface::new();
    renderer.redraw(&image, one(), &mut surface).unwrap();

    let text_width = surface.measure_text("cat 87%", &renderer.style().font);
    let fills = surface.filled_rects();
    assert_eq!(fills.len(), 1);
    let label = fills[0];
    assert_eq!(label.x, 50.0);
    assert_eq!(label.y, 57.0);
    assert_eq!(label.height, 18.0);
    assert!((label.width - (text_width + 8.0)).abs() < EPS);

    let text = surface
        .ops()
        .iter()
        .find_map(|op| match op {
            DrawOp::Text {
                x, baseline, color, ..
            } => Some((*x, *baseline, *color)),
            _ => None,
        })
        .unwrap();
    assert_eq!(text, (54.0, 71.0, Color::WHITE));
}

#[test]
fn device_pixel_ratio_scales_backing_and_primitives() {
    let image = DisplayedImage::with_natural_size(300, 200, CssSize::new(300.0, 200.0));
    let renderer = renderer_with(vec![Detection::new(
        "box",
        0.5,
        NativeRect::new(10.0, 10.0, 50.0, 50.0),
    )]);
    let mut surface = RecordingSurface::new();

    let report = renderer
        .redraw(&image, DevicePixelRatio::new(2.0), &mut surface)
        .unwrap();
    assert_eq!(report.size.css, CssSize::new(300.0, 200.0));
    assert_eq!((report.size.backing.width, report.size.backing.height), (600, 400));

    match &surface.ops()[0] {
        DrawOp::StrokeRect {
            rect, line_width, ..
        } => {
            assert_eq!(*rect, ScreenRect::new(20.0, 20.0, 100.0, 100.0));
            assert_eq!(*line_width, 4.0);
        }
        other => panic!("expected stroke first, got {other:?}"),
    }
}

#[test]
fn fractional_layout_rounds_backing_only() {
    let image = DisplayedImage::with_natural_size(640, 480, CssSize::new(333.3, 250.2));
    let renderer = renderer_with(vec![]);
    let mut surface = RecordingSurface::new();

    let report = renderer
        .redraw(&image, DevicePixelRatio::new(1.5), &mut surface)
        .unwrap();
    assert_eq!(report.size.css, CssSize::new(333.3, 250.2));
    assert_eq!((report.size.backing.width, report.size.backing.height), (500, 375));
}

#[test]
fn label_near_top_is_clamped_to_surface_edge() {
    let image = DisplayedImage::with_natural_size(300, 200, CssSize::new(300.0, 200.0));
    let renderer = renderer_with(vec![Detection::new(
        "bird",
        0.61,
        NativeRect::new(40.0, 2.0, 30.0, 30.0),
    )]);
    let mut surface = RecordingSurface::new();
    renderer.redraw(&image, one(), &mut surface).unwrap();

    let label = surface.filled_rects()[0];
    assert_eq!(label.y, 0.0);
    assert_eq!(label.x, 40.0);
    let baseline = surface
        .ops()
        .iter()
        .find_map(|op| match op {
            DrawOp::Text { baseline, .. } => Some(*baseline),
            _ => None,
        })
        .unwrap();
    assert_eq!(baseline, 14.0);
}

#[test]
fn redraw_is_idempotent() {
    let image = DisplayedImage::with_natural_size(800, 600, CssSize::new(400.0, 400.0));
    let renderer = renderer_with(vec![
        cat(),
        Detection::new("dog", 0.55, NativeRect::new(500.0, 300.0, 120.0, 200.0)),
    ]);
    let mut surface = RecordingSurface::new();

    renderer
        .redraw(&image, DevicePixelRatio::new(2.0), &mut surface)
        .unwrap();
    let first = surface.ops().to_vec();
    renderer
        .redraw(&image, DevicePixelRatio::new(2.0), &mut surface)
        .unwrap();
    assert_eq!(surface.ops(), first.as_slice());
    assert_eq!(surface.primitives().count(), 6);
}

#[test]
fn layout_change_keeps_boxes_registered() {
    let mut image = DisplayedImage::with_natural_size(800, 600, CssSize::new(400.0, 400.0));
    let det = cat();
    let renderer = renderer_with(vec![det.clone()]);
    let mut surface = RecordingSurface::new();

    for layout in [
        CssSize::new(400.0, 400.0),
        CssSize::new(1000.0, 500.0),
        CssSize::new(123.0, 777.0),
    ] {
        image.set_layout(layout);
        let outcome = renderer
            .on_layout_changed(&image, one(), &mut surface)
            .unwrap();
        let RedrawOutcome::Drawn(report) = outcome else {
            panic!("expected a drawn outcome");
        };
        let g = report.geometry;
        assert_eq!(report.size.css, layout);

        let rect = surface.stroked_rects()[0];
        let rel_x = (rect.x - g.offset_x) / g.rendered_width();
        let rel_y = (rect.y - g.offset_y) / g.rendered_height();
        let rel_w = rect.width / g.rendered_width();
        assert!((rel_x - det.bbox.x / 800.0).abs() < 1e-9);
        assert!((rel_y - det.bbox.y / 600.0).abs() < 1e-9);
        assert!((rel_w - det.bbox.width / 800.0).abs() < 1e-9);
    }
}

#[test]
fn empty_detections_leave_surface_cleared() {
    let image = DisplayedImage::with_natural_size(800, 600, CssSize::new(400.0, 400.0));
    let mut renderer = renderer_with(vec![cat()]);
    let mut surface = RecordingSurface::new();
    renderer.redraw(&image, one(), &mut surface).unwrap();
    assert!(surface.primitives().count() > 0);

    renderer.set_detections(Vec::new());
    let report = renderer.redraw(&image, one(), &mut surface).unwrap();
    assert_eq!(report.painted, 0);
    assert_eq!(surface.primitives().count(), 0);

    renderer.set_detections(vec![cat()]);
    renderer.clear_detections();
    renderer.redraw(&image, one(), &mut surface).unwrap();
    assert!(surface.ops().is_empty());
}

#[test]
fn undecoded_image_propagates_invalid_dimensions() {
    let image = DisplayedImage::pending(CssSize::new(400.0, 300.0));
    let renderer = renderer_with(vec![cat()]);
    let mut surface = RecordingSurface::new();

    let err = renderer.redraw(&image, one(), &mut surface).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GeometryError>(),
        Some(GeometryError::InvalidDimensions { .. })
    ));
    assert_eq!(surface.size().css, CssSize::new(400.0, 300.0));
    assert!(surface.ops().is_empty());
}

#[test]
fn undecoded_image_is_skipped_by_layout_trigger() {
    let mut displayed = DisplayedImage::pending(CssSize::new(400.0, 300.0));
    let renderer = renderer_with(vec![cat()]);
    let mut surface = RecordingSurface::new();

    let outcome = renderer
        .on_layout_changed(&displayed, one(), &mut surface)
        .unwrap();
    assert_eq!(outcome, RedrawOutcome::Skipped);

    // Decode completes later; the next trigger recovers without extra state.
    displayed.set_pixels(image::RgbaImage::new(800, 600));
    let outcome = renderer
        .on_layout_changed(&displayed, one(), &mut surface)
        .unwrap();
    assert!(matches!(outcome, RedrawOutcome::Drawn(ref r) if r.painted == 1));
}

#[test]
fn zero_sized_layout_draws_nothing() {
    let image = DisplayedImage::with_natural_size(800, 600, CssSize::new(0.0, 300.0));
    let renderer = renderer_with(vec![cat()]);
    let mut surface = RecordingSurface::new();

    let report = renderer.redraw(&image, one(), &mut surface).unwrap();
    assert!(report.geometry.is_degenerate());
    assert_eq!(report.painted, 0);
    assert_eq!(report.size.backing.width, 0);
    assert_eq!(surface.primitives().count(), 0);
}

#[test]
fn malformed_detections_are_rejected_not_fatal() {
    let image = DisplayedImage::with_natural_size(800, 600, CssSize::new(400.0, 400.0));
    let renderer = renderer_with(vec![
        Detection::new("ghost", 0.9, NativeRect::new(f64::NAN, 0.0, 10.0, 10.0)),
        Detection::new("flipped", 0.9, NativeRect::new(0.0, 0.0, -10.0, 10.0)),
        Detection::new("overconfident", 1.4, NativeRect::new(-20.0, 700.0, 10.0, 10.0)),
    ]);
    let mut surface = RecordingSurface::new();

    let report = renderer.redraw(&image, one(), &mut surface).unwrap();
    assert_eq!(report.painted, 1);
    assert_eq!(report.rejected, 2);
    assert_eq!(surface.texts(), vec!["overconfident 100%"]);
    // Out-of-image boxes pass through unclamped.
    assert_eq!(
        surface.stroked_rects(),
        vec![ScreenRect::new(-10.0, 400.0, 5.0, 5.0)]
    );
    assert_eq!(renderer.detections()[2].score, 1.4);
}

#[test]
fn detection_trigger_replaces_previous_run() {
    let image = DisplayedImage::with_natural_size(800, 600, CssSize::new(400.0, 400.0));
    let mut renderer = renderer_with(vec![cat()]);
    let mut surface = RecordingSurface::new();

    let report = renderer
        .on_detections_ready(
            vec![Detection::new(
                "cup",
                0.7,
                NativeRect::new(0.0, 0.0, 800.0, 600.0),
            )],
            &image,
            one(),
            &mut surface,
        )
        .unwrap();
    assert_eq!(report.painted, 1);
    assert_eq!(surface.texts(), vec!["cup 70%"]);
    assert_eq!(
        surface.stroked_rects(),
        vec![ScreenRect::new(0.0, 50.0, 400.0, 300.0)]
    );
}
