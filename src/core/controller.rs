use crate::domain::model::{Command, ServoMovement};
use crate::domain::ports::{ActuatorController, Communicator};

/// Translates actuator operations into protocol lines for an Arduino running
/// the LED/servo firmware.
pub struct ArduinoController<C: Communicator> {
    communicator: C,
}

impl<C: Communicator> ArduinoController<C> {
    pub fn new(communicator: C) -> Self {
        tracing::info!("Arduino controller initialized with serial communicator");
        Self { communicator }
    }

    pub fn communicator(&self) -> &C {
        &self.communicator
    }

    pub fn into_inner(self) -> C {
        self.communicator
    }

    fn execute(&mut self, command: Command) -> bool {
        let expected = command.expected_response();
        self.communicator
            .send(&command.to_string(), expected.as_str())
    }

    fn move_servo(
        &mut self,
        name: &str,
        movement: ServoMovement,
        start_angle: i32,
        end_angle: i32,
        speed: i32,
    ) -> bool {
        self.execute(Command::ServoMovement {
            name: name.to_string(),
            movement,
            start_angle,
            end_angle,
            speed,
        })
    }
}

impl<C: Communicator> ActuatorController for ArduinoController<C> {
    fn set_led(&mut self, name: &str, on: bool) -> bool {
        self.execute(Command::Led {
            name: name.to_string(),
            on,
        })
    }

    fn position_servo(&mut self, name: &str, angle: i32) -> bool {
        self.execute(Command::ServoAngle {
            name: name.to_string(),
            angle,
        })
    }

    fn sweep(&mut self, name: &str, start_angle: i32, end_angle: i32, speed: i32) -> bool {
        self.move_servo(name, ServoMovement::Sweep, start_angle, end_angle, speed)
    }

    fn half_sweep(&mut self, name: &str, start_angle: i32, end_angle: i32, speed: i32) -> bool {
        self.move_servo(name, ServoMovement::HalfSweep, start_angle, end_angle, speed)
    }

    fn reverse_half_sweep(
        &mut self,
        name: &str,
        start_angle: i32,
        end_angle: i32,
        speed: i32,
    ) -> bool {
        self.move_servo(
            name,
            ServoMovement::ReverseHalfSweep,
            start_angle,
            end_angle,
            speed,
        )
    }

    fn reverse_sweep(&mut self, name: &str, start_angle: i32, end_angle: i32, speed: i32) -> bool {
        self.move_servo(name, ServoMovement::ReverseSweep, start_angle, end_angle, speed)
    }

    fn is_ready(&mut self) -> bool {
        if !self.communicator.is_open() {
            return false;
        }
        self.execute(Command::Status)
    }

    fn shutdown(&mut self) {
        tracing::info!("Shutting down Arduino controller");
        if !self.execute(Command::Shutdown) {
            tracing::warn!("Board did not acknowledge shutdown");
        }
        self.communicator.close();
        tracing::info!("Arduino controller shut down");
    }
}
