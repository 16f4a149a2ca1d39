use jogdial::{JogDial, JogDialConfig, MaskTexture, Masks};

fn dial(ticks: usize, initial: usize) -> JogDial {
    let config = JogDialConfig::builder()
        .tick_count(ticks)
        .initial_index(initial)
        .width(120)
        .height(80)
        .build();
    JogDial::with_procedural_masks(config).unwrap()
}

#[test]
fn construction_forces_initial_layout() {
    let dial = dial(10, 3);
    assert_eq!(dial.current_index(), 3);
    let expected = 3.0 / 10.0 * 0.26 * std::f32::consts::PI;
    assert!((dial.rotation() - expected).abs() < 1e-6);

    let popped = &dial.ticks()[3];
    assert!((popped.current.scale.x - (popped.initial.scale.x + 1.2)).abs() < 1e-5);
    assert!(!dial.is_animating());
}

#[test]
fn out_of_range_initial_index_is_clamped() {
    let dial = dial(4, 99);
    assert_eq!(dial.current_index(), 3);
}

#[test]
fn selection_never_leaves_the_dial() {
    let mut dial = dial(6, 0);
    for direction in [-3, 1, 1, 1, 1, 1, 1, 1, 9, -2, 0] {
        dial.advance(direction, 0.25, direction == 0);
        dial.update(0.05);
        assert!(dial.current_index() < dial.tick_count());
    }
}

#[test]
fn noop_at_boundary_starts_nothing() {
    let mut dial = dial(6, 5);
    assert!(!dial.advance(0, 0.5, false));
    assert!(!dial.advance(1, 0.5, false));
    assert!(!dial.is_animating());
    assert_eq!(dial.current_index(), 5);
}

#[test]
fn step_then_back_round_trips() {
    let mut dial = dial(10, 4);
    assert!(dial.advance(1, 0.5, false));
    assert!(dial.is_animating());
    assert!(dial.advance(-1, 0.5, false));
    assert_eq!(dial.current_index(), 4);

    for _ in 0..60 {
        dial.update(1.0 / 60.0);
    }
    assert!(!dial.is_animating());
    let expected = 4.0 / 10.0 * 0.26 * std::f32::consts::PI;
    assert!((dial.rotation() - expected).abs() < 1e-5);
    let rested = &dial.ticks()[5];
    assert_eq!(rested.current, rested.initial);
}

#[test]
fn render_frame_is_headless() {
    let mut dial = dial(10, 0);
    let mut frame = vec![0u8; 120 * 80 * 4];
    dial.render_frame(&mut frame);
    assert!(frame.chunks_exact(4).any(|px| px[0] > 0));

    // Masks of zero multiply the whole face to black.
    let config = JogDialConfig::builder().tick_count(10).width(120).height(80).build();
    let masks = Masks {
        shadow: MaskTexture::solid(glam::Vec4::ZERO),
        color: MaskTexture::solid(glam::Vec4::ONE),
    };
    let mut dark = JogDial::new(config, masks).unwrap();
    let mut frame = vec![7u8; 120 * 80 * 4];
    dark.render_frame(&mut frame);
    assert!(frame.iter().all(|&b| b == 0));
}

#[test]
fn missing_mask_reports_path() {
    let err = Masks::open("does/not/exist.png", "nor/this.jpg").unwrap_err();
    assert!(err.to_string().contains("does/not/exist.png"));
}
