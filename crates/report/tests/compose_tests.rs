//! Composition tests against a recording canvas

mod common;

use common::*;
use pdf_core::{FontWeight, Rect};
use pretty_assertions::assert_eq;
use report::composer::emphasis_color;
use report::templates::birthday_template;
use report::{
    compute_positions, FamilyBlockRenderer, RegisterRenderer, ReportConfig, ReportError,
    ReportOptions,
};
use std::sync::atomic::Ordering;

fn may() -> ReportOptions {
    ReportOptions::date_range("2025-05-01", "2025-05-31")
}

#[test]
fn test_single_family_birthday_report() {
    let (mut composer, _) = composer();
    let renderer = FamilyBlockRenderer::birthday(composer.config());
    let mut group = family(
        "12",
        "D. Samuel",
        vec![member("m1", "D. Samuel"), member("m2", "Ruth")],
    );
    group.celebrants = vec!["m2".into()];

    let mut canvas = RecordingCanvas::new();
    let summary = composer
        .compose(&mut canvas, &renderer, &[group], &church(), &may())
        .unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(canvas.pages, 1);
    assert_eq!(summary.records_drawn, 1);

    let (page, title, _) = canvas.find_text("Birthday List").unwrap();
    assert_eq!(page, 1);
    assert!(title.contains("From 01-05 to 31-05"));
    assert!(canvas.find_text("Tirunelveli Diocese").is_some());
    assert!(canvas
        .find_text("CSI St. Paul's Church, Palayamkottai Pastorate")
        .is_some());

    let (_, celebrant, paint) = canvas.find_text("Ruth").unwrap();
    assert_eq!(celebrant, "* Ruth");
    assert_eq!(paint.font.weight, FontWeight::Bold);
    assert_eq!(paint.color, emphasis_color());

    let plain = canvas
        .texts()
        .into_iter()
        .find(|(_, text, paint)| *text == "D. Samuel" && paint.size == 9.0)
        .unwrap();
    assert_eq!(plain.2.font.weight, FontWeight::Regular);
    assert_ne!(plain.2.color, emphasis_color());
}

#[test]
fn test_three_families_take_two_pages() {
    let (mut composer, _) = composer();
    let renderer = FamilyBlockRenderer::birthday(composer.config());
    let families: Vec<_> = (1..=3)
        .map(|i| family(&i.to_string(), &format!("Head {i}"), vec![member("m", "A")]))
        .collect();

    let mut canvas = RecordingCanvas::new();
    let summary = composer
        .compose(&mut canvas, &renderer, &families, &church(), &may())
        .unwrap();

    assert_eq!(summary.pages, 2);
    assert_eq!(canvas.pages, 2);

    // header on page one only
    assert!(canvas.texts_on(1).iter().any(|t| t.contains("Birthday List")));
    assert!(!canvas.texts_on(2).iter().any(|t| t.contains("Birthday List")));

    // the third family sits in the first slot of page two
    let template = birthday_template();
    let first_slot = compute_positions(&template, 0);
    let (page, _, _) = canvas.find_text("Head 3").unwrap();
    assert_eq!(page, 2);
    let head3 = canvas
        .ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Text { text, at, .. } if text == "Head 3" => Some(*at),
            _ => None,
        })
        .unwrap();
    assert_eq!(head3.y, first_slot.base_y - 16.0);

    // borders on every page, drawn after everything else
    let border = template.border_rect();
    let tail: Vec<&DrawOp> = canvas.ops.iter().rev().take(2).collect();
    assert_eq!(
        tail,
        vec![
            &DrawOp::Rect {
                page: 2,
                rect: border,
                border_only: true
            },
            &DrawOp::Rect {
                page: 1,
                rect: border,
                border_only: true
            },
        ]
    );
}

#[test]
fn test_empty_address_is_not_drawn() {
    let (mut composer, _) = composer();
    let renderer = FamilyBlockRenderer::birthday(composer.config());
    let mut group = family("1", "D. Samuel", vec![member("m1", "D. Samuel")]);
    group.family.address = "   ".into();

    let mut canvas = RecordingCanvas::new();
    composer
        .compose(&mut canvas, &renderer, &[group], &church(), &may())
        .unwrap();

    let frame = compute_positions(&birthday_template(), 0).frames[0].frame;
    assert!(canvas.find_text("Address").is_none());
    assert!(!canvas.ops.iter().any(|op| match op {
        DrawOp::Text { at, .. } => inside(frame, at.x, at.y),
        DrawOp::Image { rect, .. } => inside(frame, rect.x, rect.top()),
        _ => false,
    }));
}

fn inside(frame: Rect, x: f64, y: f64) -> bool {
    x >= frame.x && x < frame.right() && y >= frame.y && y <= frame.top()
}

#[test]
fn test_address_wraps_inside_frame() {
    let (mut composer, _) = composer();
    let renderer = FamilyBlockRenderer::birthday(composer.config());
    let mut group = family("1", "D. Samuel", vec![]);
    group.family.address =
        "Door 12, North Car Street, near the Cathedral, Palayamkottai, Tirunelveli District, Tamil Nadu 627002"
            .into();

    let mut canvas = RecordingCanvas::new();
    composer
        .compose(&mut canvas, &renderer, &[group], &church(), &may())
        .unwrap();

    let slot = &compute_positions(&birthday_template(), 0).frames[0];
    let lines: Vec<_> = canvas
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { at, text, .. } if inside(slot.frame, at.x, at.y) => {
                Some((at.y, text.clone()))
            }
            _ => None,
        })
        .collect();
    // 36pt frame with 12pt lines holds three
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].1, "Door 12, North Car Street, near the");
}

#[test]
fn test_tamil_runs_are_rasterized_and_cached() {
    let (mut composer, paints) = composer();
    let renderer = FamilyBlockRenderer::birthday(composer.config());
    let families: Vec<_> = (1..=2)
        .map(|i| {
            let mut group = family(&i.to_string(), "D. Samuel", vec![]);
            group.family.address = "வடக்கு தெரு".into();
            group
        })
        .collect();

    let mut canvas = RecordingCanvas::new();
    composer
        .compose(&mut canvas, &renderer, &families, &church(), &may())
        .unwrap();

    assert_eq!(canvas.images().len(), 2);
    assert!(canvas.find_text("வடக்கு").is_none());
    // one line painted once; the second family hits the cache
    assert_eq!(paints.load(Ordering::SeqCst), 1);
    let stats = composer.rasterizer().cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_raster_sits_on_the_native_baseline() {
    let (mut composer, _) = composer();
    let renderer = FamilyBlockRenderer::birthday(composer.config());
    let mut group = family("1", "D. Samuel", vec![]);
    group.family.address = "வடக்கு தெரு".into();

    let mut canvas = RecordingCanvas::new();
    composer
        .compose(&mut canvas, &renderer, &[group], &church(), &may())
        .unwrap();

    let slot = &compute_positions(&birthday_template(), 0).frames[0];
    let rect = canvas
        .ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Image { rect, .. } => Some(*rect),
            _ => None,
        })
        .unwrap();
    let nominal = slot.frame.top() - 10.0;
    let expected = nominal - rect.height + 10.0 * 0.8;
    assert!((rect.y - expected).abs() < 1e-6);
    assert_eq!(rect.x, slot.frame.x);
}

#[test]
fn test_tamil_falls_back_to_native_without_a_font() {
    let mut composer =
        report::ReportComposer::new(ReportConfig::default(), &report::AssetLoader::new());
    let renderer = FamilyBlockRenderer::birthday(composer.config());
    let mut group = family("1", "D. Samuel", vec![]);
    group.family.address = "வடக்கு தெரு".into();

    let mut canvas = RecordingCanvas::new();
    composer
        .compose(&mut canvas, &renderer, &[group], &church(), &may())
        .unwrap();

    assert!(canvas.images().is_empty());
    assert!(canvas.find_text("வடக்கு").is_some());
}

#[test]
fn test_failed_draw_retries_in_plain_font() {
    let (mut composer, _) = composer();
    let renderer = FamilyBlockRenderer::birthday(composer.config());
    let group = family("1", "D. Samuel", vec![member("m1", "D. Samuel")]);

    let mut canvas = RecordingCanvas::new();
    // latin family is registered first; fail its bold variant
    canvas.failing_font = Some(pdf_core::FontFamilyId::new(0).bold());
    let summary = composer
        .compose(&mut canvas, &renderer, &[group], &church(), &may())
        .unwrap();

    let (_, _, paint) = canvas.find_text("Birthday List").unwrap();
    assert_eq!(paint.font.weight, FontWeight::Regular);
    assert_eq!(summary.failed_draws, 0);
}

#[test]
fn test_members_capped_at_ten() {
    let (mut composer, _) = composer();
    let renderer = FamilyBlockRenderer::birthday(composer.config());
    let members = (1..=12)
        .map(|i| member(&i.to_string(), &format!("Member {i:02}")))
        .collect();
    let group = family("1", "Head", members);

    let mut canvas = RecordingCanvas::new();
    composer
        .compose(&mut canvas, &renderer, &[group], &church(), &may())
        .unwrap();

    assert!(canvas.find_text("Member 10").is_some());
    assert!(canvas.find_text("Member 11").is_none());
    assert!(canvas.find_text("Member 12").is_none());
}

#[test]
fn test_fatal_input_errors() {
    let (mut composer, _) = composer();
    let renderer = FamilyBlockRenderer::birthday(composer.config());
    let groups = vec![family("1", "Head", vec![])];
    let mut canvas = RecordingCanvas::new();

    let empty = composer.compose(&mut canvas, &renderer, &[], &church(), &may());
    assert!(matches!(empty, Err(ReportError::EmptyInput)));

    let nameless = report::ChurchInfo::default();
    let result = composer.compose(&mut canvas, &renderer, &groups, &nameless, &may());
    assert!(matches!(result, Err(ReportError::MissingField("churchName"))));

    let result = composer.compose(
        &mut canvas,
        &renderer,
        &groups,
        &church(),
        &ReportOptions::default(),
    );
    assert!(matches!(result, Err(ReportError::MissingField("fromDate"))));

    // nothing reached the canvas
    assert_eq!(canvas.pages, 0);
    assert!(canvas.ops.is_empty());
}

#[test]
fn test_malformed_records_are_skipped() {
    let (mut composer, _) = composer();
    let renderer = FamilyBlockRenderer::birthday(composer.config());
    let groups = vec![
        family("1", "Head 1", vec![]),
        family("2", "  ", vec![member("x", "")]),
        family("3", "Head 3", vec![member("y", ""), member("z", "Grace")]),
    ];

    let mut canvas = RecordingCanvas::new();
    let summary = composer
        .compose(&mut canvas, &renderer, &groups, &church(), &may())
        .unwrap();

    assert_eq!(summary.records_drawn, 2);
    assert_eq!(summary.records_skipped, 1);
    assert_eq!(summary.pages, 1);
    // Grace moves up to the first row
    assert!(canvas.find_text("Grace").is_some());
    assert!(canvas.texts().iter().any(|(_, t, _)| *t == "1"));
}

#[test]
fn test_family_without_head_name_is_skipped() {
    let (mut composer, _) = composer();
    let renderer = FamilyBlockRenderer::birthday(composer.config());
    let groups = vec![
        family("1", "Head 1", vec![member("a", "Anna")]),
        family("2", "", vec![member("b", "Orphan Member")]),
    ];

    let mut canvas = RecordingCanvas::new();
    let summary = composer
        .compose(&mut canvas, &renderer, &groups, &church(), &may())
        .unwrap();

    assert_eq!(summary.records_drawn, 1);
    assert_eq!(summary.records_skipped, 1);
    assert!(canvas.find_text("Anna").is_some());
    assert!(canvas.find_text("Orphan Member").is_none());
}

#[test]
fn test_area_filter() {
    let (mut composer, _) = composer();
    let renderer = FamilyBlockRenderer::birthday(composer.config());
    let mut other = family("2", "Other Head", vec![]);
    other.family.area_id = "9".into();
    other.family.area_code = "MKR".into();
    let groups = vec![family("1", "Head 1", vec![]), other];

    let mut canvas = RecordingCanvas::new();
    let summary = composer
        .compose(&mut canvas, &renderer, &groups, &church(), &may().area("PLK"))
        .unwrap();
    assert_eq!(summary.records_drawn, 1);
    assert!(canvas.find_text("Other Head").is_none());
    assert!(canvas
        .find_text("Birthday List From 01-05 to 31-05 - Palayamkottai")
        .is_some());

    let mut canvas = RecordingCanvas::new();
    let result = composer.compose(&mut canvas, &renderer, &groups, &church(), &may().area("42"));
    assert!(matches!(result, Err(ReportError::EmptyInput)));
}

#[test]
fn test_configured_diocese_wins() {
    let (mut composer, _) = composer();
    let renderer = FamilyBlockRenderer::wedding(composer.config());
    let mut church = church();
    church.diocese = Some("Madurai-Ramnad Diocese".into());

    let mut canvas = RecordingCanvas::new();
    composer
        .compose(&mut canvas, &renderer, &[family("1", "Head", vec![])], &church, &may())
        .unwrap();

    assert!(canvas.find_text("Madurai-Ramnad Diocese").is_some());
    assert!(canvas.find_text("Tirunelveli Diocese").is_none());
    assert!(canvas.find_text("Wedding Day List From 01-05 to 31-05").is_some());
}

#[test]
fn test_register_paginates_rows() {
    let (mut composer, _) = composer();
    let renderer = RegisterRenderer::new();
    let rows = register_rows(6, 10);

    let mut canvas = RecordingCanvas::new();
    let summary = composer
        .compose(
            &mut canvas,
            &renderer,
            &rows,
            &church(),
            &ReportOptions::for_year(2025),
        )
        .unwrap();

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.records_drawn, 60);
    assert!(canvas.texts_on(1).contains(&"Congregation Register 2025"));
    assert!(!canvas.texts_on(2).contains(&"Congregation Register 2025"));

    // table header repeats on every page
    for page in 1..=2 {
        assert!(canvas.texts_on(page).contains(&"S.No"), "page {page}");
    }

    // the family split by the page break gets its heading again
    let contd: Vec<_> = canvas
        .texts()
        .into_iter()
        .filter(|(_, t, _)| t.ends_with("(contd.)"))
        .collect();
    assert_eq!(contd.len(), 1);
    assert_eq!(contd[0].0, 2);
    assert!(contd[0].1.starts_with("PLK-4"));

    // no row text below the bottom limit
    for op in &canvas.ops {
        if let DrawOp::Text { at, .. } = op {
            assert!(at.y > 30.0, "{op:?}");
        }
    }
}

#[test]
fn test_register_rotated_headers() {
    let (mut composer, _) = composer();
    let renderer = RegisterRenderer::new();

    let mut canvas = RecordingCanvas::new();
    composer
        .compose(
            &mut canvas,
            &renderer,
            &register_rows(1, 1),
            &church(),
            &ReportOptions::for_year(2025),
        )
        .unwrap();

    let (_, _, paint) = canvas.find_text("Bapt.").unwrap();
    assert_eq!(paint.angle, 90.0);
    let (_, _, paint) = canvas.find_text("S.No").unwrap();
    assert_eq!(paint.angle, 0.0);
}
