use std::time::Duration;

use fathom_engine::Session;

/// Drive a session to settlement at display rate, bounding the number of
/// ticks so a scheduling bug cannot hang the test.
fn tick_until_settled(session: &mut Session) {
    let mut ticks = 0;
    while session.tick() {
        ticks += 1;
        assert!(ticks < 100_000, "session failed to settle");
    }
}

#[test]
fn end_to_end_drain() {
    // 160×120 at the default zoom spans past the cardioid cusp on the
    // right edge, so the drained field holds both interior and escaped
    // cells.
    let mut session = Session::new(160, 120).unwrap();
    assert!(!session.is_settled());

    tick_until_settled(&mut session);

    assert!(session.is_settled());
    let frame = session.frame();
    assert_eq!((frame.width, frame.height), (160, 120));
    assert_eq!(frame.colors.len(), 160 * 120);
    for index in 0..160 * 120 {
        assert!(session.field().is_computed(index));
    }
    assert!(frame.colors.iter().any(|&c| c == 0));
    assert!(frame.colors.iter().any(|&c| c != 0));
}

#[test]
fn stepping_resumes_across_frames() {
    let mut session = Session::new(64, 48).unwrap();

    // Starve the first frames, then let the rest run: the total must still
    // converge without any reseeding in between.
    for _ in 0..3 {
        session.step(Duration::from_nanos(100));
    }
    tick_until_settled(&mut session);
    assert!(session.is_settled());
}

#[test]
fn drains_are_deterministic() {
    let mut a = Session::new(48, 32).unwrap();
    let mut b = Session::new(48, 32).unwrap();
    a.settle();
    // Different budget slicing must not change the result.
    tick_until_settled(&mut b);

    assert_eq!(a.frame().colors, b.frame().colors);
}

#[test]
fn viewport_mutations_survive_in_sequence() {
    let mut session = Session::new(40, 30).unwrap();
    session.settle();

    session.resize(30, 40).unwrap();
    session.settle();
    assert_eq!(session.frame().colors.len(), 30 * 40);

    session.set_resolution(50).unwrap();
    session.settle();
    assert_eq!(session.frame().colors.len(), 15 * 20);

    session.pan(4, -2);
    session.pan_click(7.0, 11.0).unwrap();
    session.settle();

    assert!(session.is_settled());
    assert_eq!(*session.viewport().zoom(), 400);
    let frame = session.frame();
    for index in 0..frame.colors.len() as u32 {
        assert!(session.field().is_computed(index));
    }
}

#[test]
fn repeated_zoom_deepens_without_loss() {
    let mut session = Session::new(24, 18).unwrap();
    for _ in 0..12 {
        session.pan_click(12.0, 9.0).unwrap();
    }
    // 200 × 2^12.
    assert_eq!(*session.viewport().zoom(), 819_200);
    session.settle();
    assert!(session.is_settled());
}

#[test]
fn drained_frame_is_a_settled_snapshot() {
    let mut session = Session::new(32, 24).unwrap();
    session.pan_click(16.0, 12.0).unwrap();

    let frame = session.drained_frame();
    assert_eq!(frame.colors.len(), 32 * 24);
    assert!(session.is_settled());
}

#[test]
fn export_round_trips_through_png() {
    let dir = std::env::temp_dir().join("fathom_test_lifecycle");
    let _ = std::fs::create_dir_all(&dir);
    let path = dir.join("roundtrip.png");

    let mut session = Session::new(24, 16).unwrap();
    fathom_engine::export_png(&mut session, &path).unwrap();
    let expected = session.frame().colors.to_vec();

    let decoder = png::Decoder::new(std::fs::File::open(&path).unwrap());
    let mut reader = decoder.read_info().unwrap();
    let mut pixels = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut pixels).unwrap();
    pixels.truncate(info.buffer_size());

    assert_eq!(pixels, expected);

    let _ = std::fs::remove_dir_all(&dir);
}
