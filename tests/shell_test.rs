use arduino_driver::app::ShellCommand;
use arduino_driver::{
    ArduinoController, MemoryPort, MemoryPorts, PortConfig, RecordedDelay, SerialCommunicator,
};

fn connected_controller() -> (ArduinoController<SerialCommunicator>, MemoryPort) {
    let mut ports = MemoryPorts::new();
    let port = ports.add("/dev/ttyUSB0", "USB2.0-Serial");

    let mut communicator = SerialCommunicator::with_delay(
        PortConfig::default(),
        Box::new(RecordedDelay::new()),
    );
    communicator.initialize(&ports).unwrap();

    (ArduinoController::new(communicator), port)
}

fn run(controller: &mut ArduinoController<SerialCommunicator>, line: &str) -> String {
    line.parse::<ShellCommand>().unwrap().execute(controller)
}

#[test]
fn test_success_messages() {
    let (mut controller, port) = connected_controller();
    for reply in ["ready", "ok", "ok", "ok", "ok", "ok", "ok"] {
        port.reply(reply);
    }

    assert_eq!(run(&mut controller, "arduino-status"), "Arduino is ready");
    assert_eq!(run(&mut controller, "led-control red true"), "LED red turned on");
    assert_eq!(
        run(&mut controller, "servo-position head 90"),
        "Servo head positioned at 90 degrees"
    );
    assert_eq!(
        run(&mut controller, "servo-sweep arm 0 180 5"),
        "Servo arm sweeping from 0 to 180"
    );
    assert_eq!(
        run(&mut controller, "servo-half-sweep claw 10 90 3"),
        "Servo claw half-sweeping from 10 to 90"
    );
    assert_eq!(
        run(&mut controller, "servo-reverse-half-sweep base 45 120 7"),
        "Servo base reverse-half-sweeping from 45 to 120"
    );
    assert_eq!(
        run(&mut controller, "servo-reverse-sweep wrist 30 150 2"),
        "Servo wrist reverse-sweeping from 30 to 150"
    );

    assert_eq!(
        port.written_lines(),
        vec![
            "status(arduino, ok)",
            "led(red, on)",
            "servo(head, angle 90)",
            "servo(arm, sweep 0 180 5)",
            "servo(claw, half-sweep 10 90 3)",
            "servo(base, reverse-half-sweep 45 120 7)",
            "servo(wrist, reverse-sweep 30 150 2)",
        ]
    );
}

#[test]
fn test_failure_messages() {
    let (mut controller, _port) = connected_controller();

    assert_eq!(run(&mut controller, "arduino-status"), "Arduino is not ready");
    assert_eq!(
        run(&mut controller, "led-control red false"),
        "Failed to control LED red"
    );
    assert_eq!(
        run(&mut controller, "servo-position head 90"),
        "Failed to position servo head"
    );
    assert_eq!(
        run(&mut controller, "servo-half-sweep claw 10 90 3"),
        "Failed to half-sweep servo claw"
    );
    assert_eq!(
        run(&mut controller, "servo-reverse-sweep wrist 30 150 2"),
        "Failed to reverse-sweep servo wrist"
    );
}

#[test]
fn test_shutdown_from_shell() {
    let (mut controller, port) = connected_controller();
    port.reply("ok");

    let command: ShellCommand = "arduino-shutdown".parse().unwrap();
    assert!(command.ends_session());
    assert_eq!(command.execute(&mut controller), "Arduino controller shut down");

    assert_eq!(port.written_lines(), vec!["shutdown()"]);
    assert!(!port.is_open());
    assert_eq!(run(&mut controller, "arduino-status"), "Arduino is not ready");
}

#[test]
fn test_help_and_exit_do_not_touch_the_port() {
    let (mut controller, port) = connected_controller();

    assert!(run(&mut controller, "help").contains("servo-reverse-half-sweep"));
    assert_eq!(run(&mut controller, "exit"), "Goodbye!");
    assert!(port.written().is_empty());
}
