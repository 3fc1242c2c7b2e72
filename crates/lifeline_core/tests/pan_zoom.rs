use lifeline_core::geometry::{screen_to_world, world_to_screen, Point, Transform, Viewport};
use lifeline_core::interaction::{PanZoomController, PointerInput, PointerKind};
use lifeline_core::TimelineConfig;

const LINE_X: f64 = 2000.0;

fn axis_screen_x(transform: &Transform) -> f64 {
    world_to_screen(Point::new(LINE_X, 0.0), transform).x
}

#[test]
fn wheel_never_moves_the_main_axis() {
    let controller = PanZoomController::new(TimelineConfig::default());
    let viewport = Viewport::new(1200.0, 900.0);
    let mut transform = Transform::new(-1400.0, -7600.0, 1.0);
    for delta in [-100.0, -300.0, 50.0, 2000.0, -5000.0, 12.5] {
        let before = axis_screen_x(&transform);
        transform = controller.wheel(delta, viewport, &transform);
        assert!((axis_screen_x(&transform) - before).abs() < 1e-9);
        assert!((0.2..=3.0).contains(&transform.k));
    }
}

#[test]
fn screen_and_world_conversions_invert() {
    let transform = Transform::new(37.0, -120.0, 1.75);
    let screen = Point::new(640.0, 480.0);
    let back = world_to_screen(screen_to_world(screen, &transform), &transform);
    assert!((back.x - screen.x).abs() < 1e-9);
    assert!((back.y - screen.y).abs() < 1e-9);
}

#[test]
fn two_touches_pinch_and_lifting_one_resumes_panning() {
    let mut controller = PanZoomController::new(TimelineConfig::default());
    let mut transform = Transform::new(0.0, 0.0, 1.0);
    controller.pointer_down(PointerInput::new(1, PointerKind::Touch, 100.0, 100.0));
    controller.pointer_down(PointerInput::new(2, PointerKind::Touch, 200.0, 100.0));
    assert!(controller.is_pinching());

    let spread = PointerInput::new(2, PointerKind::Touch, 300.0, 100.0);
    transform = controller.pointer_move(spread, &transform).unwrap();
    assert!((transform.k - 2.0).abs() < 1e-9);

    controller.pointer_up(2);
    assert!(controller.is_panning());
    let moved = controller
        .pointer_move(PointerInput::new(1, PointerKind::Touch, 110.0, 90.0), &transform)
        .unwrap();
    assert_eq!((moved.x - transform.x, moved.y - transform.y), (10.0, -10.0));

    controller.pointer_up(1);
    assert!(!controller.is_panning());
}
