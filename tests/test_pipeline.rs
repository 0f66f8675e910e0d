mod common;

use common::*;
use remember::{
    NoProgress, Pipeline, extract_card_boundaries, extract_card_boxes, extract_card_images,
    extract_flashcards,
};

#[test]
fn test_scenario_a_card_boxes() {
    let sheet = RasterImage::from_rgba_image(&scenario_a_sheet());
    let config = unit_config(100);
    let mut debug = DebugInfo::default();

    let boxes = extract_card_boxes(&config, &sheet, &mut debug).unwrap();

    assert_eq!(debug.horizontal_separator_box, Some(Rectangle::new(0, 10, 0, 200)));
    assert_eq!(debug.horizontal_separators, vec![10, 190]);
    assert_eq!(debug.vertical_separator_boxes, vec![Rectangle::new(0, 100, 10, 20)]);
    assert_eq!(debug.vertical_separator_candidates, vec![vec![50]]);
    assert_eq!(debug.vertical_separators, vec![50]);

    assert_eq!(boxes.len(), 1);
    let (left, right) = boxes[0];
    assert_eq!(left, Rectangle::new(10, 48, 12, 188));
    assert_eq!(right, Rectangle::new(52, 100, 12, 188));
}

#[test]
fn test_scenario_a_full_pipeline() {
    let sheet = scenario_a_with_content();
    let config = unit_config(100);

    let (cards, debug) = extract_flashcards(&config, &sheet, &mut NoProgress).unwrap();

    assert_eq!(debug.card_boxes.len(), 1);
    assert_eq!(
        debug.card_boundaries,
        vec![(Rectangle::new(19, 31, 49, 81), Rectangle::new(59, 81, 99, 151))]
    );
    assert_eq!(debug.card_images.len(), 1);

    assert_eq!(cards.len(), 1);
    let card = &cards[0];
    assert_eq!((card.front.width(), card.front.height()), (12, 32));
    assert_eq!((card.back.width(), card.back.height()), (22, 52));
    assert_eq!(raw_bytes(&card.front), raw_bytes(&debug.card_images[0].0));
    assert_eq!(raw_bytes(&card.back), raw_bytes(&debug.card_images[0].1));
}

#[test]
fn test_scenario_b_missing_vertical_separator() {
    let mut img = blank_sheet(100, 200);
    fill_rect(&mut img, 0, 100, 10, 11);
    fill_rect(&mut img, 0, 100, 190, 191);
    // The divider only reaches into the last few rows of the search area
    fill_rect(&mut img, 50, 51, 17, 191);
    let sheet = RasterImage::from_rgba_image(&img);

    let err = extract_flashcards(&unit_config(100), &sheet, &mut NoProgress).unwrap_err();

    assert_eq!(err.stage, Stage::CardBoxes);
    assert_eq!(err.source, SegmentationError::MissingSeparator { band: 0 });
    assert_eq!(err.debug_info.horizontal_separators, vec![10, 190]);
    assert_eq!(err.debug_info.vertical_separator_boxes.len(), 1);
    assert_eq!(err.debug_info.vertical_separator_candidates, vec![Vec::<i64>::new()]);
    assert!(err.debug_info.vertical_separators.is_empty());
    assert!(err.debug_info.card_boxes.is_empty());
}

fn three_band_sheet() -> RasterImage {
    let mut img = blank_sheet(100, 300);
    for y in [10, 100, 200, 290] {
        fill_rect(&mut img, 0, 100, y, y + 1);
    }
    fill_rect(&mut img, 50, 51, 0, 300);
    RasterImage::from_rgba_image(&img)
}

#[test]
fn test_band_count_follows_separator_count() {
    let sheet = three_band_sheet();
    let mut config = unit_config(100);

    let mut debug = DebugInfo::default();
    let boxes = extract_card_boxes(&config, &sheet, &mut debug).unwrap();
    assert_eq!(debug.horizontal_separators, vec![10, 100, 200, 290]);
    assert_eq!(boxes.len(), 3);
    assert_eq!(debug.vertical_separators, vec![50, 50, 50]);

    config.require_top_horizontal_separator = false;
    config.require_bottom_horizontal_separator = false;
    config.margin_top = 3.0;
    config.margin_bottom = 4.0;

    let mut debug = DebugInfo::default();
    let boxes = extract_card_boxes(&config, &sheet, &mut debug).unwrap();
    assert_eq!(debug.horizontal_separators, vec![3, 10, 100, 200, 290, 296]);
    assert_eq!(boxes.len(), debug.horizontal_separators.len() - 1);
    assert!(debug.horizontal_separators.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_margins_shape_rough_boxes() {
    let sheet = three_band_sheet();
    let mut config = unit_config(100);
    config.margin_left = 2.0;
    config.margin_right = 5.0;

    let mut debug = DebugInfo::default();
    let boxes = extract_card_boxes(&config, &sheet, &mut debug).unwrap();

    assert_eq!(debug.horizontal_separator_box, Some(Rectangle::new(2, 12, 0, 300)));
    assert_eq!(boxes[1].0, Rectangle::new(12, 48, 102, 198));
    assert_eq!(boxes[1].1, Rectangle::new(52, 95, 102, 198));
}

#[test]
fn test_first_candidate_wins() {
    let mut img = scenario_a_sheet();
    fill_rect(&mut img, 75, 76, 10, 191);
    let sheet = RasterImage::from_rgba_image(&img);

    let mut debug = DebugInfo::default();
    let boxes = extract_card_boxes(&unit_config(100), &sheet, &mut debug).unwrap();

    assert_eq!(debug.vertical_separator_candidates, vec![vec![50, 75]]);
    assert_eq!(debug.vertical_separators, vec![50]);
    assert_eq!(boxes[0].1.x1, 52);
}

#[test]
fn test_stages_compose_like_full_run() {
    let sheet = scenario_a_with_content();
    let config = unit_config(100);

    let mut debug = DebugInfo::default();
    let boxes = extract_card_boxes(&config, &sheet, &mut debug).unwrap();
    let boundaries = extract_card_boundaries(&config, &sheet, &boxes).unwrap();
    let images = extract_card_images(&sheet, &boundaries).unwrap();

    for ((left_box, right_box), (left, right)) in boxes.iter().zip(&boundaries) {
        assert!(left_box.contains(left));
        assert!(right_box.contains(right));
    }
    assert_eq!(images.len(), boundaries.len());
    assert_eq!(images[0].0.width() as i64, boundaries[0].0.width());
}

#[test]
fn test_pipeline_is_deterministic() {
    let sheet = scenario_a_with_content();
    let config = unit_config(100);

    let (first, _) = extract_flashcards(&config, &sheet, &mut NoProgress).unwrap();
    let (second, _) = extract_flashcards(&config, &sheet, &mut NoProgress).unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(raw_bytes(&a.front), raw_bytes(&b.front));
        assert_eq!(raw_bytes(&a.back), raw_bytes(&b.back));
    }
}

#[test]
fn test_scenario_d_switch_front_back() {
    let sheet = scenario_a_with_content();
    let mut config = unit_config(100);

    let (plain, _) = extract_flashcards(&config, &sheet, &mut NoProgress).unwrap();
    config.switch_front_back = true;
    let (switched, _) = extract_flashcards(&config, &sheet, &mut NoProgress).unwrap();

    assert_eq!(raw_bytes(&switched[0].front), raw_bytes(&plain[0].back));
    assert_eq!(raw_bytes(&switched[0].back), raw_bytes(&plain[0].front));
    assert_ne!(raw_bytes(&switched[0].front), raw_bytes(&plain[0].front));
}

#[test]
fn test_empty_card_fails_in_boundary_stage() {
    let mut img = scenario_a_sheet();
    fill_rect(&mut img, 20, 31, 50, 81);
    let sheet = RasterImage::from_rgba_image(&img);

    let err = extract_flashcards(&unit_config(100), &sheet, &mut NoProgress).unwrap_err();

    assert_eq!(err.stage, Stage::CardBoundaries);
    assert!(matches!(err.source, SegmentationError::NoContent { .. }));
    assert_eq!(err.debug_info.card_boxes.len(), 1);
    assert!(err.debug_info.card_boundaries.is_empty());
    assert!(err.debug_info.card_images.is_empty());
}

#[test]
fn test_invalid_config_fails_before_segmentation() {
    let sheet = scenario_a_with_content();
    let mut config = unit_config(100);
    config.page_width = 0.0;

    let err = extract_flashcards(&config, &sheet, &mut NoProgress).unwrap_err();
    assert_eq!(err.stage, Stage::Init);
    assert!(matches!(err.source, SegmentationError::InvalidParameter(_)));
    assert!(err.debug_info.horizontal_separator_box.is_none());
}

#[test]
fn test_infinite_margin_fails_before_segmentation() {
    let sheet = scenario_a_with_content();
    let mut config = unit_config(100);
    config.margin_left = f64::INFINITY;

    let err = extract_flashcards(&config, &sheet, &mut NoProgress).unwrap_err();
    assert_eq!(err.stage, Stage::Init);
    assert!(matches!(err.source, SegmentationError::InvalidParameter(_)));
    assert!(err.debug_info.horizontal_separator_box.is_none());
}

#[test]
fn test_huge_separator_height_is_clamped_to_sheet() {
    let sheet = scenario_a_with_content();
    let mut config = unit_config(100);
    config.vertical_separator_height = 1e300;
    config.validate().unwrap();

    let (cards, debug) = extract_flashcards(&config, &sheet, &mut NoProgress).unwrap();
    assert_eq!(debug.vertical_separator_boxes, vec![Rectangle::new(0, 100, 10, 200)]);
    assert_eq!(debug.vertical_separators, vec![50]);
    assert_eq!(cards.len(), 1);
    assert_eq!((cards[0].front.width(), cards[0].front.height()), (12, 32));
}

#[test]
fn test_huge_measurements_fail_as_bad_geometry() {
    let sheet = scenario_a_with_content();
    let cases: Vec<(Box<dyn Fn(&mut Config)>, Stage)> = vec![
        (Box::new(|c: &mut Config| c.margin_left = 1e300), Stage::CardBoxes),
        (Box::new(|c: &mut Config| c.separator_clearance = 1e300), Stage::CardBoundaries),
    ];

    for (mutate, stage) in cases {
        let mut config = unit_config(100);
        mutate(&mut config);
        config.validate().unwrap();

        let err = extract_flashcards(&config, &sheet, &mut NoProgress).unwrap_err();
        assert_eq!(err.stage, stage);
        assert!(matches!(err.source, SegmentationError::InvalidParameter(_)), "{err}");
    }
}

#[test]
fn test_progress_reports_every_stage() {
    let sheet = scenario_a_with_content();
    let mut seen = Vec::new();

    let mut record = |stage: Stage| seen.push(stage);
    extract_flashcards(&unit_config(100), &sheet, &mut record).unwrap();

    assert_eq!(seen, Stage::ALL.to_vec());
    assert_eq!(Stage::Init.progress(), 0.0);
    assert_eq!(Stage::Flashcards.progress(), 1.0);
}

#[test]
fn test_progress_stops_at_failing_stage() {
    let mut img = scenario_a_sheet();
    fill_rect(&mut img, 20, 31, 50, 81);
    let sheet = RasterImage::from_rgba_image(&img);

    let mut seen = Vec::new();
    let mut pipeline = Pipeline::new(unit_config(100)).with_progress(|stage: Stage| seen.push(stage));
    let err = pipeline.run(&sheet).unwrap_err();
    drop(pipeline);

    assert_eq!(err.stage, Stage::CardBoundaries);
    assert_eq!(seen, vec![Stage::Init, Stage::CardBoxes, Stage::CardBoundaries]);
}

#[test]
fn test_sheet_without_separators_has_no_cards() {
    let sheet = RasterImage::from_rgba_image(&blank_sheet(100, 200));
    let (cards, debug) = extract_flashcards(&unit_config(100), &sheet, &mut NoProgress).unwrap();

    assert!(cards.is_empty());
    assert!(debug.horizontal_separators.is_empty());
    assert!(debug.vertical_separator_boxes.is_empty());
}

#[test]
fn test_pipeline_error_message_names_stage() {
    let mut img = scenario_a_sheet();
    fill_rect(&mut img, 20, 31, 50, 81);
    let sheet = RasterImage::from_rgba_image(&img);

    let err = extract_flashcards(&unit_config(100), &sheet, &mut NoProgress).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("extract-card-boundaries"), "{message}");
    assert!(message.contains("no content found"), "{message}");
}
