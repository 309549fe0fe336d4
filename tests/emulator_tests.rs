//! Integration tests for the emulator facade and its scheduler

use ki_input_emulator::input::{
    Device, Emulator, EmulatorError, InputError, InputEvent, Key, KeyboardLock, MouseButton,
    Operation, Parameters, Point, Rectangle, VirtualInterface,
};
use std::time::{Duration, Instant};

mod mock {
    use ki_input_emulator::input::{
        DeviationStrategy, Emulator, Point, Rectangle, SystemInterface,
    };
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    /// One expected strategy call and the value it returns.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        KeyDownTime(Duration),
        KeyUpTime(Duration),
        ButtonDownTime(Duration),
        ButtonUpTime(Duration),
        TargetIn(Rectangle, Point),
        Speed(u32),
        HorizontalSpeedFactor(f64),
        WheelSteps { remaining: i16, steps: i16 },
        WheelSpeed(u16),
        WheelResetTime(Duration),
    }

    /// Strategy replaying a fixed sequence of calls.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedStrategy {
        calls: Arc<Mutex<VecDeque<Call>>>,
    }

    impl ScriptedStrategy {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn expect(&self, call: Call) -> &Self {
            self.calls.lock().push_back(call);
            self
        }

        pub fn assert_done(&self) {
            let calls = self.calls.lock();
            assert!(calls.is_empty(), "expected calls not made: {:?}", *calls);
        }

        fn next(&self, name: &str) -> Call {
            self.calls
                .lock()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected call: {}", name))
        }
    }

    impl DeviationStrategy for ScriptedStrategy {
        fn calculate_key_down_time(&mut self) -> Duration {
            match self.next("key down time") {
                Call::KeyDownTime(value) => value,
                other => panic!("expected {:?}, got key down time", other),
            }
        }

        fn calculate_key_up_time(&mut self) -> Duration {
            match self.next("key up time") {
                Call::KeyUpTime(value) => value,
                other => panic!("expected {:?}, got key up time", other),
            }
        }

        fn calculate_button_down_time(&mut self) -> Duration {
            match self.next("button down time") {
                Call::ButtonDownTime(value) => value,
                other => panic!("expected {:?}, got button down time", other),
            }
        }

        fn calculate_button_up_time(&mut self) -> Duration {
            match self.next("button up time") {
                Call::ButtonUpTime(value) => value,
                other => panic!("expected {:?}, got button up time", other),
            }
        }

        fn calculate_target_in(&mut self, area: &Rectangle) -> Point {
            match self.next("target in") {
                Call::TargetIn(expected, value) => {
                    assert_eq!(expected, *area);
                    value
                }
                other => panic!("expected {:?}, got target in", other),
            }
        }

        fn calculate_speed(&mut self) -> u32 {
            match self.next("speed") {
                Call::Speed(value) => value,
                other => panic!("expected {:?}, got speed", other),
            }
        }

        fn calculate_horizontal_speed_factor(&mut self) -> f64 {
            match self.next("horizontal speed factor") {
                Call::HorizontalSpeedFactor(value) => value,
                other => panic!("expected {:?}, got horizontal speed factor", other),
            }
        }

        fn calculate_wheel_steps(&mut self, remaining_steps: i16) -> i16 {
            match self.next("wheel steps") {
                Call::WheelSteps { remaining, steps } => {
                    assert_eq!(remaining, remaining_steps);
                    steps
                }
                other => panic!("expected {:?}, got wheel steps", other),
            }
        }

        fn calculate_wheel_speed(&mut self) -> u16 {
            match self.next("wheel speed") {
                Call::WheelSpeed(value) => value,
                other => panic!("expected {:?}, got wheel speed", other),
            }
        }

        fn calculate_wheel_reset_time(&mut self) -> Duration {
            match self.next("wheel reset time") {
                Call::WheelResetTime(value) => value,
                other => panic!("expected {:?}, got wheel reset time", other),
            }
        }
    }

    /// Blocks until both queues are empty.
    pub fn drain<S: SystemInterface>(emulator: &Emulator<S>, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while !emulator.is_idle() {
            assert!(Instant::now() < deadline, "queues did not drain in {:?}", timeout);
            thread::sleep(Duration::from_millis(1));
        }
    }
}

use mock::{drain, Call, ScriptedStrategy};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn emulator(strategy: &ScriptedStrategy, interface: VirtualInterface) -> Emulator<VirtualInterface> {
    Emulator::with_strategy(strategy.clone(), interface).unwrap()
}

fn cursor_moves(interface: &VirtualInterface) -> Vec<Point> {
    interface
        .events()
        .into_iter()
        .filter(|e| e.succeeded)
        .filter_map(|e| match e.event {
            InputEvent::CursorMoved(p) => Some(p),
            _ => None,
        })
        .collect()
}

fn assert_approaches(start: Point, target: Point, path: &[Point]) {
    let mut last = start.distance_to(&target);
    for p in path {
        let d = p.distance_to(&target);
        assert!(d < last, "{} is not closer to {} than {}", p, target, last);
        last = d;
    }
    assert_eq!(path.last(), Some(&target));
}

#[test]
fn test_construction() {
    let sut = Emulator::new(Parameters::human(), VirtualInterface::default()).unwrap();
    assert_eq!(sut.error_counter(), 0);
    assert_eq!(sut.action_count_mouse(), 0);
    assert_eq!(sut.action_count_keyboard(), 0);
    assert!(sut.is_idle());
}

#[test]
fn test_invalid_parameters_rejected() {
    let mut parameters = Parameters::human();
    parameters.key_up_time.stddev = -1.0;
    let result = Emulator::new(parameters, VirtualInterface::default());
    assert!(matches!(result, Err(EmulatorError::Parameters(_))));
}

#[test]
fn test_queries_relay_to_interface() {
    let interface = VirtualInterface::default()
        .with_cursor(Point::new(22, 40))
        .with_lock(KeyboardLock::Num);
    interface.fail_next(Operation::GetCursorPosition, 1);
    let sut = Emulator::new(Parameters::fast(), interface).unwrap();

    assert_eq!(sut.cursor_position(), Err(InputError::CursorUnavailable));
    assert_eq!(sut.cursor_position(), Ok(Point::new(22, 40)));
    assert!(!sut.is_lock_active(KeyboardLock::Caps));
    assert!(sut.is_lock_active(KeyboardLock::Num));
    assert!(!sut.is_button_down(MouseButton::Middle));
    assert!(!sut.is_key_down(Key::Backspace));
    assert_eq!(sut.error_counter(), 0);
}

#[test]
fn test_operations_do_not_block_caller() {
    let mut parameters = Parameters::fast();
    parameters.key_down_time.mean = 1000.0;
    parameters.key_up_time.mean = 1000.0;
    parameters.button_down_time.mean = 1000.0;
    parameters.button_up_time.mean = 1000.0;
    let sut = Emulator::new(parameters, VirtualInterface::default()).unwrap();

    let start = Instant::now();
    sut.click(MouseButton::Left);
    sut.press(Key::Return);
    sut.press(Key::A);
    sut.move_to(&Rectangle::new(500, 500, 10, 10));
    sut.turn_mouse_wheel(-50);
    sut.wait(Device::Keyboard, ms(5000));
    sut.sync();
    assert!(start.elapsed() < ms(50));

    sut.clear();
    assert_eq!(sut.error_counter(), 0);
}

#[test]
fn test_failed_key_down_not_retried() {
    let strategy = ScriptedStrategy::new();
    strategy.expect(Call::KeyDownTime(ms(2)));
    let interface = VirtualInterface::default();
    interface.fail_next(Operation::KeyDown, 1);
    let sut = emulator(&strategy, interface);

    sut.key_down(Key::Return);
    drain(&sut, ms(1000));

    assert_eq!(sut.error_counter(), 1);
    assert_eq!(sut.interface().event_count(), 1);
    assert!(!sut.is_key_down(Key::Return));
    strategy.assert_done();
}

#[test]
fn test_failed_key_up_counted() {
    let strategy = ScriptedStrategy::new();
    strategy.expect(Call::KeyUpTime(ms(2)));
    let interface = VirtualInterface::default();
    interface.fail_next(Operation::KeyUp, 1);
    let sut = emulator(&strategy, interface);

    sut.key_up(Key::Return);
    drain(&sut, ms(1000));

    assert_eq!(sut.error_counter(), 1);
    assert_eq!(sut.interface().event_count(), 1);
}

#[test]
fn test_button_down_up_with_failure() {
    let strategy = ScriptedStrategy::new();
    strategy
        .expect(Call::ButtonDownTime(ms(2)))
        .expect(Call::ButtonUpTime(ms(2)));
    let interface = VirtualInterface::default();
    interface.fail_next(Operation::ButtonDown, 1);
    let sut = emulator(&strategy, interface);

    sut.button_down(MouseButton::Left);
    sut.button_up(MouseButton::Left);
    drain(&sut, ms(1000));

    let events = sut.interface().events();
    assert_eq!(sut.error_counter(), 1);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event, InputEvent::ButtonDown(MouseButton::Left));
    assert!(!events[0].succeeded);
    assert_eq!(events[1].event, InputEvent::ButtonUp(MouseButton::Left));
    assert!(events[1].succeeded);
}

#[test]
fn test_press_and_click() {
    let strategy = ScriptedStrategy::new();
    strategy
        .expect(Call::KeyDownTime(ms(2)))
        .expect(Call::KeyUpTime(ms(2)))
        .expect(Call::ButtonDownTime(ms(2)))
        .expect(Call::ButtonUpTime(ms(2)));
    let sut = emulator(&strategy, VirtualInterface::default());

    sut.press(Key::Return);
    sut.click(MouseButton::Right);
    drain(&sut, ms(1000));

    let events: Vec<InputEvent> = sut.interface().events().into_iter().map(|e| e.event).collect();
    let position = |event: InputEvent| events.iter().position(|e| *e == event).unwrap();
    assert_eq!(events.len(), 4);
    assert!(position(InputEvent::KeyDown(Key::Return)) < position(InputEvent::KeyUp(Key::Return)));
    assert!(
        position(InputEvent::ButtonDown(MouseButton::Right))
            < position(InputEvent::ButtonUp(MouseButton::Right))
    );
    assert_eq!(sut.error_counter(), 0);
    strategy.assert_done();
}

#[test]
fn test_turn_mouse_wheel_in_pushes() {
    let strategy = ScriptedStrategy::new();
    strategy
        .expect(Call::WheelSpeed(100))
        .expect(Call::WheelResetTime(ms(50)))
        .expect(Call::WheelSteps { remaining: 20, steps: 15 })
        .expect(Call::WheelSpeed(20))
        .expect(Call::WheelResetTime(ms(40)))
        .expect(Call::WheelSteps { remaining: 5, steps: 5 })
        .expect(Call::WheelSpeed(100))
        .expect(Call::WheelResetTime(ms(50)))
        .expect(Call::WheelSteps { remaining: -26, steps: -15 })
        .expect(Call::WheelSpeed(20))
        .expect(Call::WheelResetTime(ms(60)))
        .expect(Call::WheelSteps { remaining: -11, steps: -11 });
    let interface = VirtualInterface::default();
    interface.fail_next(Operation::TurnMouseWheel, 1);
    let sut = emulator(&strategy, interface);

    sut.turn_mouse_wheel(20);
    sut.turn_mouse_wheel(-26);
    strategy.assert_done();
    drain(&sut, ms(4000));

    let turns: Vec<(i16, bool)> = sut
        .interface()
        .events()
        .into_iter()
        .filter_map(|e| match e.event {
            InputEvent::WheelTurned(steps) => Some((steps, e.succeeded)),
            _ => None,
        })
        .collect();

    let mut expected = vec![(2, false)];
    expected.extend(std::iter::repeat((2, true)).take(7));
    expected.extend(std::iter::repeat((1, true)).take(6));
    expected.extend(std::iter::repeat((-2, true)).take(7));
    expected.extend(std::iter::repeat((-1, true)).take(12));
    assert_eq!(turns, expected);
    assert_eq!(sut.interface().wheel_position(), -6);
    assert_eq!(sut.error_counter(), 1);
}

#[test]
fn test_turn_zero_steps_is_noop() {
    let strategy = ScriptedStrategy::new();
    let sut = emulator(&strategy, VirtualInterface::default());
    sut.turn_mouse_wheel(0);
    assert_eq!(sut.action_count_mouse(), 0);
}

#[test]
fn test_move_to_center() {
    let area = Rectangle::new(50, 100, 100, 150);
    let target = area.center();
    let strategy = ScriptedStrategy::new();
    strategy
        .expect(Call::TargetIn(area, target))
        .expect(Call::Speed(300))
        .expect(Call::HorizontalSpeedFactor(1.0));
    let interface = VirtualInterface::default();
    interface.fail_next(Operation::GetCursorPosition, 1);
    let sut = emulator(&strategy, interface);

    sut.move_to(&area);
    drain(&sut, ms(3000));

    assert_approaches(Point::new(0, 0), target, &cursor_moves(sut.interface()));
    assert_eq!(sut.interface().cursor(), Point::new(100, 175));
    assert_eq!(sut.error_counter(), 1);
}

#[test]
fn test_move_to_from_below_right() {
    let area = Rectangle::new(50, 100, 100, 150);
    let target = area.center();
    let start = Point::new(target.x * 2, target.y * 2);
    let strategy = ScriptedStrategy::new();
    strategy
        .expect(Call::TargetIn(area, target))
        .expect(Call::Speed(300))
        .expect(Call::HorizontalSpeedFactor(1.0));
    let sut = emulator(&strategy, VirtualInterface::default().with_cursor(start));

    sut.move_to(&area);
    drain(&sut, ms(3000));

    assert_approaches(start, target, &cursor_moves(sut.interface()));
    assert_eq!(sut.error_counter(), 0);
}

#[test]
fn test_move_to_at_least_one_pixel_per_step() {
    let area = Rectangle::new(5, 10, 8, 8);
    let target = area.center();
    let strategy = ScriptedStrategy::new();
    strategy
        .expect(Call::TargetIn(area, target))
        .expect(Call::Speed(1))
        .expect(Call::HorizontalSpeedFactor(1.0));
    let sut = emulator(&strategy, VirtualInterface::default());

    sut.move_to(&area);
    drain(&sut, ms(3000));

    let path = cursor_moves(sut.interface());
    assert!(path.len() <= target.y as usize);
    assert_approaches(Point::new(0, 0), target, &path);
}

#[test]
fn test_move_off_screen_does_not_block_queue() {
    let sut = Emulator::new(Parameters::fast(), VirtualInterface::new(200, 200)).unwrap();

    sut.move_to(&Rectangle::new(400, 50, 10, 10));
    sut.click(MouseButton::Left);
    drain(&sut, ms(3000));

    assert_eq!(sut.error_counter(), 1);
    assert_eq!(sut.interface().cursor().x, 199);
    let clicked = sut
        .interface()
        .events()
        .into_iter()
        .filter(|e| matches!(e.event, InputEvent::ButtonDown(_) | InputEvent::ButtonUp(_)))
        .count();
    assert_eq!(clicked, 2);
    assert!(sut.interface().event_total() < 40);
}

#[test]
fn test_click_at_and_drag_and_drop() {
    let sut = Emulator::new(Parameters::fast(), VirtualInterface::default()).unwrap();
    let start = Rectangle::new(100, 100, 20, 20);
    let stop = Rectangle::new(600, 300, 40, 40);

    sut.click_at(MouseButton::Left, &start);
    sut.drag_and_drop(MouseButton::Left, &start, &stop);
    drain(&sut, ms(3000));

    let events: Vec<InputEvent> = sut.interface().events().into_iter().map(|e| e.event).collect();
    let presses: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, InputEvent::ButtonDown(_) | InputEvent::ButtonUp(_)))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(presses.len(), 4);

    // the drag moves the cursor between its press and release
    let dragged = events[presses[2]..presses[3]]
        .iter()
        .any(|e| matches!(e, InputEvent::CursorMoved(_)));
    assert!(dragged);
    assert_eq!(sut.interface().cursor(), stop.center());
    assert!(!sut.is_button_down(MouseButton::Left));
    assert_eq!(sut.error_counter(), 0);
}

#[test]
fn test_mouse_keyboard_interleaving() {
    let strategy = ScriptedStrategy::new();
    strategy
        .expect(Call::ButtonDownTime(ms(50)))
        .expect(Call::ButtonUpTime(ms(15)))
        .expect(Call::KeyDownTime(ms(20)))
        .expect(Call::KeyUpTime(ms(10)));
    let sut = emulator(&strategy, VirtualInterface::default());

    let start = Instant::now();
    sut.click(MouseButton::Left);
    sut.wait(Device::Keyboard, ms(5));
    sut.press(Key::Return);
    drain(&sut, ms(1000));

    let events = sut.interface().events();
    let order: Vec<InputEvent> = events.iter().map(|e| e.event).collect();
    assert_eq!(
        order,
        vec![
            InputEvent::ButtonDown(MouseButton::Left),
            InputEvent::KeyDown(Key::Return),
            InputEvent::KeyUp(Key::Return),
            InputEvent::ButtonUp(MouseButton::Left),
        ]
    );

    let offsets: Vec<Duration> = events.iter().map(|e| e.at.duration_since(start)).collect();
    assert!(offsets[1] >= ms(5));
    assert!(offsets[2] >= ms(25));
    assert!(offsets[3] >= ms(50));
    assert!(offsets[3] < ms(500));
    assert_eq!(sut.error_counter(), 0);
}

#[test]
fn test_sync_orders_across_devices() {
    let strategy = ScriptedStrategy::new();
    strategy
        .expect(Call::ButtonDownTime(ms(40)))
        .expect(Call::ButtonUpTime(ms(40)))
        .expect(Call::KeyDownTime(ms(1)))
        .expect(Call::KeyUpTime(ms(1)))
        .expect(Call::KeyDownTime(ms(1)))
        .expect(Call::KeyUpTime(ms(1)))
        .expect(Call::ButtonDownTime(ms(1)))
        .expect(Call::ButtonUpTime(ms(1)));
    let sut = emulator(&strategy, VirtualInterface::default());

    sut.click(MouseButton::Left);
    sut.press(Key::A);
    sut.sync();
    sut.press(Key::B);
    sut.click(MouseButton::Right);
    drain(&sut, ms(1000));

    let events: Vec<InputEvent> = sut.interface().events().into_iter().map(|e| e.event).collect();
    assert_eq!(events.len(), 8);
    let before = [
        InputEvent::ButtonDown(MouseButton::Left),
        InputEvent::ButtonUp(MouseButton::Left),
        InputEvent::KeyDown(Key::A),
        InputEvent::KeyUp(Key::A),
    ];
    for event in &events[..4] {
        assert!(before.contains(event), "{:?} ran before the sync point", event);
    }
}

#[test]
fn test_action_counts_and_clear() {
    let area = Rectangle::new(5, 5, 10, 10);
    let strategy = ScriptedStrategy::new();
    strategy
        .expect(Call::ButtonDownTime(ms(2)))
        .expect(Call::ButtonUpTime(ms(2)))
        .expect(Call::TargetIn(area, area.center()))
        .expect(Call::Speed(1000))
        .expect(Call::HorizontalSpeedFactor(1.0))
        .expect(Call::WheelSpeed(100))
        .expect(Call::WheelResetTime(ms(50)))
        .expect(Call::WheelSteps { remaining: 50, steps: 25 })
        .expect(Call::WheelSpeed(50))
        .expect(Call::WheelResetTime(ms(80)))
        .expect(Call::WheelSteps { remaining: 25, steps: 25 })
        .expect(Call::KeyDownTime(ms(2)))
        .expect(Call::KeyUpTime(ms(2)))
        .expect(Call::KeyDownTime(ms(2)))
        .expect(Call::KeyUpTime(ms(2)));
    let sut = emulator(&strategy, VirtualInterface::default());

    // park both queues behind a long cooldown
    sut.wait(Device::Mouse, ms(1000));
    sut.wait(Device::Keyboard, ms(1000));
    std::thread::sleep(ms(20));
    assert_eq!(sut.action_count_mouse(), 0);
    assert_eq!(sut.action_count_keyboard(), 0);

    sut.click(MouseButton::Left);
    assert_eq!(sut.action_count_mouse(), 2);
    sut.move_to(&area);
    assert_eq!(sut.action_count_mouse(), 3);
    sut.turn_mouse_wheel(50);
    assert_eq!(sut.action_count_mouse(), 5);

    sut.press(Key::A);
    assert_eq!(sut.action_count_keyboard(), 2);
    sut.key_down(Key::A);
    assert_eq!(sut.action_count_keyboard(), 3);
    sut.key_up(Key::A);
    assert_eq!(sut.action_count_keyboard(), 4);
    sut.sync();
    assert_eq!(sut.action_count(Device::Mouse), 6);
    assert_eq!(sut.action_count(Device::Keyboard), 5);

    sut.clear();
    assert_eq!(sut.action_count_mouse(), 0);
    assert_eq!(sut.action_count_keyboard(), 0);
    strategy.assert_done();
    assert_eq!(sut.interface().event_count(), 0);
}

#[test]
fn test_reset_releases_everything() {
    let interface = VirtualInterface::default()
        .with_lock(KeyboardLock::Caps)
        .with_lock(KeyboardLock::Scroll);
    let sut = Emulator::new(Parameters::fast(), interface).unwrap();

    sut.button_down(MouseButton::Left);
    sut.button_down(MouseButton::XButton1);
    sut.key_down(Key::ShiftKey);
    drain(&sut, ms(1000));
    assert!(sut.is_button_down(MouseButton::Left));
    assert!(sut.is_key_down(Key::ShiftKey));

    sut.reset();
    drain(&sut, ms(2000));

    for lock in KeyboardLock::ALL {
        assert!(!sut.is_lock_active(lock), "{} still active", lock);
    }
    for button in MouseButton::ALL {
        assert!(!sut.is_button_down(button));
    }
    assert!(!sut.is_key_down(Key::ShiftKey));

    let keys: Vec<InputEvent> = sut
        .interface()
        .events()
        .into_iter()
        .map(|e| e.event)
        .filter(|e| matches!(e, InputEvent::KeyDown(_) | InputEvent::KeyUp(_)))
        .collect();
    assert_eq!(
        keys,
        vec![
            InputEvent::KeyDown(Key::ShiftKey),
            InputEvent::KeyDown(Key::ScrollLock),
            InputEvent::KeyUp(Key::ScrollLock),
            InputEvent::KeyDown(Key::CapsLock),
            InputEvent::KeyUp(Key::CapsLock),
            InputEvent::KeyUp(Key::ShiftKey),
        ]
    );
    assert_eq!(sut.error_counter(), 0);
}

#[test]
fn test_reset_without_pressed_input_is_noop() {
    let sut = Emulator::new(Parameters::fast(), VirtualInterface::default()).unwrap();
    sut.reset();
    assert!(sut.is_idle());
}
