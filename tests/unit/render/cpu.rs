use super::*;

fn ctx(r: &mut CpuRenderer, w: u32, h: u32) -> SurfaceId {
    let s = r.create_surface(w, h).unwrap();
    r.begin_context(s).unwrap();
    s
}

fn rect(r: &mut CpuRenderer, x: f64, y: f64, w: f64, h: f64) {
    r.move_to(x, y).unwrap();
    r.line_to(x + w, y).unwrap();
    r.line_to(x + w, y + h).unwrap();
    r.line_to(x, y + h).unwrap();
    r.close_path().unwrap();
}

const RED: [u8; 4] = [255, 0, 0, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

#[test]
fn paint_covers_the_surface() {
    let mut r = CpuRenderer::new();
    let s = ctx(&mut r, 4, 3);
    r.set_source_rgba(1.0, 0.0, 0.0, 1.0).unwrap();
    r.paint().unwrap();
    assert_eq!(r.pixel(s, 0, 0).unwrap(), RED);
    assert_eq!(r.pixel(s, 3, 2).unwrap(), RED);
    assert!(r.pixel(s, 4, 0).is_err());
}

#[test]
fn fill_follows_the_transform() {
    let mut r = CpuRenderer::new();
    let s = ctx(&mut r, 10, 10);
    r.set_source_rgba(1.0, 0.0, 0.0, 1.0).unwrap();
    r.translate(5.0, 5.0).unwrap();
    rect(&mut r, 0.0, 0.0, 5.0, 5.0);
    r.fill_preserve().unwrap();

    assert_eq!(r.pixel(s, 7, 7).unwrap(), RED);
    assert_eq!(r.pixel(s, 2, 2).unwrap(), CLEAR);
    // The path is kept in device space; the current point reads back in user space.
    assert_eq!(r.current_point().unwrap(), Some((0.0, 0.0)));
}

#[test]
fn save_and_restore_bracket_the_state() {
    let mut r = CpuRenderer::new();
    let s = ctx(&mut r, 2, 1);
    r.set_source_rgba(1.0, 0.0, 0.0, 1.0).unwrap();
    r.save().unwrap();
    r.set_source_rgba(0.0, 0.0, 1.0, 1.0).unwrap();
    r.restore().unwrap();
    r.paint().unwrap();
    assert_eq!(r.pixel(s, 1, 0).unwrap(), RED);

    assert!(r.restore().is_err());
}

#[test]
fn group_becomes_the_source() {
    let mut r = CpuRenderer::new();
    let s = ctx(&mut r, 4, 4);
    r.push_group().unwrap();
    r.set_source_rgba(1.0, 0.0, 0.0, 1.0).unwrap();
    rect(&mut r, 0.0, 0.0, 2.0, 4.0);
    r.fill_preserve().unwrap();
    assert_eq!(r.pixel(s, 0, 0).unwrap(), CLEAR);
    r.pop_group_to_source().unwrap();
    r.paint().unwrap();

    assert_eq!(r.pixel(s, 1, 1).unwrap(), RED);
    assert_eq!(r.pixel(s, 3, 1).unwrap(), CLEAR);
    assert!(r.pop_group_to_source().is_err());
}

#[test]
fn clip_limits_painting_until_reset() {
    let mut r = CpuRenderer::new();
    let s = ctx(&mut r, 4, 4);
    rect(&mut r, 0.0, 0.0, 2.0, 2.0);
    r.clip_preserve().unwrap();
    r.set_source_rgba(1.0, 0.0, 0.0, 1.0).unwrap();
    r.paint().unwrap();
    assert_eq!(r.pixel(s, 1, 1).unwrap(), RED);
    assert_eq!(r.pixel(s, 3, 3).unwrap(), CLEAR);

    r.reset_clip().unwrap();
    r.paint().unwrap();
    assert_eq!(r.pixel(s, 3, 3).unwrap(), RED);
}

#[test]
fn mask_surface_uses_alpha_at_an_offset() {
    let mut r = CpuRenderer::new();
    let mask = ctx(&mut r, 2, 2);
    r.set_source_rgba(0.0, 0.0, 0.0, 1.0).unwrap();
    r.paint().unwrap();
    r.end_context().unwrap();

    let s = ctx(&mut r, 4, 4);
    r.set_source_rgba(1.0, 0.0, 0.0, 1.0).unwrap();
    r.mask_surface(mask, 2.0, 2.0).unwrap();
    assert_eq!(r.pixel(s, 3, 3).unwrap(), RED);
    assert_eq!(r.pixel(s, 0, 0).unwrap(), CLEAR);
}

#[test]
fn surface_pattern_repeats() {
    let mut r = CpuRenderer::new();
    let tile = ctx(&mut r, 2, 2);
    r.set_source_rgba(1.0, 0.0, 0.0, 1.0).unwrap();
    rect(&mut r, 0.0, 0.0, 1.0, 2.0);
    r.fill_preserve().unwrap();
    r.end_context().unwrap();

    let s = ctx(&mut r, 6, 2);
    r.set_source_surface(tile, Some("repeat")).unwrap();
    r.paint().unwrap();
    assert_eq!(r.pixel(s, 4, 0).unwrap(), RED);
    assert_eq!(r.pixel(s, 5, 0).unwrap(), CLEAR);

    assert!(r.set_source_surface(tile, Some("tile")).is_err());
}

#[test]
fn surface_without_extend_does_not_repeat() {
    let mut r = CpuRenderer::new();
    let tile = ctx(&mut r, 2, 2);
    r.set_source_rgba(1.0, 0.0, 0.0, 1.0).unwrap();
    r.paint().unwrap();
    r.end_context().unwrap();

    let s = ctx(&mut r, 6, 2);
    r.set_source_surface(tile, None).unwrap();
    r.paint().unwrap();
    assert_eq!(r.pixel(s, 1, 1).unwrap(), RED);
    assert_eq!(r.pixel(s, 4, 1).unwrap(), CLEAR);
}

#[test]
fn linear_gradient_runs_between_its_stops() {
    let mut r = CpuRenderer::new();
    let s = ctx(&mut r, 100, 1);
    let g = r
        .create_gradient(GradientShape::Linear {
            x0: 0.0,
            y0: 0.0,
            x1: 100.0,
            y1: 0.0,
        })
        .unwrap();
    for (offset, red, blue) in [(0.0, 1.0, 0.0), (1.0, 0.0, 1.0)] {
        let stop = GradientStop {
            offset,
            r: red,
            g: 0.0,
            b: blue,
            a: 1.0,
        };
        r.add_color_stop(g, &stop).unwrap();
    }
    r.set_source_gradient(g).unwrap();
    r.paint().unwrap();

    let left = r.pixel(s, 0, 0).unwrap();
    let right = r.pixel(s, 99, 0).unwrap();
    assert!(left[0] > 240 && left[2] < 15, "{left:?}");
    assert!(right[2] > 240 && right[0] < 15, "{right:?}");
}

#[test]
fn stroke_width_scales_with_the_transform() {
    let mut r = CpuRenderer::new();
    let s = ctx(&mut r, 20, 20);
    r.set_source_rgba(1.0, 0.0, 0.0, 1.0).unwrap();
    r.set_line_width(1.0).unwrap();
    r.scale(4.0, 4.0).unwrap();
    r.move_to(0.0, 2.5).unwrap();
    r.line_to(5.0, 2.5).unwrap();
    r.stroke_preserve().unwrap();

    // 4px tall band centred on y = 10.
    assert_eq!(r.pixel(s, 10, 9).unwrap(), RED);
    assert_eq!(r.pixel(s, 10, 11).unwrap(), RED);
    assert_eq!(r.pixel(s, 10, 14).unwrap(), CLEAR);
}

#[test]
fn slow_blur_spreads_the_group() {
    let mut r = CpuRenderer::new();
    let s = ctx(&mut r, 9, 9);
    r.slow_blur(2.0, &mut |inner: &mut dyn Renderer| {
        inner.set_source_rgba(0.0, 0.0, 0.0, 1.0)?;
        inner.move_to(4.0, 4.0)?;
        inner.line_to(5.0, 4.0)?;
        inner.line_to(5.0, 5.0)?;
        inner.line_to(4.0, 5.0)?;
        inner.close_path()?;
        inner.fill_preserve()
    })
    .unwrap();

    let centre = r.pixel(s, 4, 4).unwrap()[3];
    let near = r.pixel(s, 5, 4).unwrap()[3];
    assert!(centre > 0 && centre < 255, "{centre}");
    assert!(near > 0 && near <= centre, "{near}");
    assert_eq!(r.pixel(s, 0, 0).unwrap()[3], 0);
}

#[test]
fn slow_blur_with_a_huge_radius_still_draws() {
    for radius in [1e10, f64::INFINITY, f64::from(u32::MAX)] {
        let mut r = CpuRenderer::new();
        let s = ctx(&mut r, 4, 4);
        r.slow_blur(radius, &mut |inner: &mut dyn Renderer| {
            inner.set_source_rgba(0.0, 0.0, 0.0, 1.0)?;
            inner.paint()
        })
        .unwrap();
        let a = r.pixel(s, 1, 1).unwrap()[3];
        assert!(a > 0 && a < 255, "{radius}: {a}");
    }
}

#[test]
fn tokens_are_resolved_or_rejected() {
    let mut r = CpuRenderer::new();
    ctx(&mut r, 1, 1);
    r.set_fill_rule("Even-Odd").unwrap();
    r.set_line_cap("round").unwrap();
    r.set_line_join("bevel").unwrap();
    r.set_antialias("none").unwrap();
    assert!(r.set_line_join("pointy").is_err());
    assert!(r.set_antialias("extra").is_err());
    assert!(r.set_dash(&[-1.0, 2.0]).is_err());
}

#[test]
fn png_round_trips_through_a_file() {
    let mut r = CpuRenderer::new();
    let s = ctx(&mut r, 3, 2);
    r.set_source_rgba(1.0, 0.0, 0.0, 1.0).unwrap();
    r.paint().unwrap();
    r.end_context().unwrap();
    let png = r.encode_png(s).unwrap();

    let path = std::env::temp_dir().join(format!("easel-cpu-{}.png", std::process::id()));
    std::fs::write(&path, &png).unwrap();
    let loaded = r.load_surface(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(r.surface_size(loaded).unwrap(), (3, 2));
    assert_eq!(r.pixel(loaded, 2, 1).unwrap(), RED);
    assert!(r.load_surface(Path::new("/nonexistent/easel.png")).is_err());
}

#[test]
fn released_surface_slot_is_reused() {
    let mut r = CpuRenderer::new();
    let s = ctx(&mut r, 2, 2);
    let other = r.create_surface(5, 5).unwrap();
    assert!(r.release_surface(s).is_err());

    r.end_context().unwrap();
    r.release_surface(s).unwrap();
    assert!(r.surface_size(s).is_err());
    assert!(r.release_surface(s).is_err());

    assert_eq!(r.create_surface(3, 1).unwrap(), s);
    assert_eq!(r.surface_size(s).unwrap(), (3, 1));
    assert_eq!(r.surface_size(other).unwrap(), (5, 5));
}

#[test]
fn no_context_means_no_drawing() {
    let mut r = CpuRenderer::new();
    assert!(r.paint().is_err());
    assert!(r.end_context().is_err());
}

#[test]
fn stored_source_follows_the_transform_it_is_used_under() {
    let mut r = CpuRenderer::new();
    let s = ctx(&mut r, 6, 6);
    r.push_group().unwrap();
    rect(&mut r, 0.0, 0.0, 2.0, 2.0);
    r.fill_preserve().unwrap();
    r.new_path().unwrap();
    r.pop_group_to_source().unwrap();
    let group = r.source().unwrap();

    r.set_source_rgba(1.0, 0.0, 0.0, 1.0).unwrap();
    r.translate(3.0, 3.0).unwrap();
    r.mask_source(group).unwrap();

    assert_eq!(r.pixel(s, 4, 4).unwrap(), RED);
    assert_eq!(r.pixel(s, 1, 1).unwrap(), CLEAR);
}
