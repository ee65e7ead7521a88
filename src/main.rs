use anyhow::Context;
use arduino_driver::app::ShellCommand;
use arduino_driver::utils::logger;
use arduino_driver::{
    ActuatorController, ArduinoController, CliConfig, DriverError, PortEnumerator,
    SerialCommunicator, SystemPorts,
};
use clap::Parser;
use std::io::{self, BufRead, Write};

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    if config.list_ports {
        list_ports(&SystemPorts);
        return Ok(());
    }

    // 解析並驗證配置
    let port_config = match config.resolve() {
        Ok(port_config) => port_config,
        Err(e) => exit_with(&e),
    };
    tracing::debug!("Port config: {:?}", port_config);

    println!(
        "Connecting to {} at {} baud...",
        port_config.port_identifier, port_config.baud_rate
    );

    let communicator = match SerialCommunicator::open(port_config, &SystemPorts) {
        Ok(communicator) => communicator,
        Err(e) => exit_with(&e),
    };
    println!(
        "✅ Connected to {}",
        communicator.port_name().unwrap_or_default()
    );

    let mut controller = ArduinoController::new(communicator);
    run_shell(&mut controller).context("shell input failed")?;

    Ok(())
}

fn list_ports(enumerator: &dyn PortEnumerator) {
    println!("Available serial ports:");
    let ports = enumerator.list_ports();
    if ports.is_empty() {
        println!("  (none)");
    }
    for port in ports {
        println!("  {} - {}", port.system_name, port.descriptive_name);
    }
}

fn run_shell<A: ActuatorController>(controller: &mut A) -> io::Result<()> {
    println!("\nArduino command shell");
    println!("Type 'help' for commands, 'exit' to quit\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.parse::<ShellCommand>() {
            Ok(command) => {
                println!("{}", command.execute(controller));
                if command.ends_session() {
                    break;
                }
            }
            Err(e) => eprintln!("❌ {}", e.user_friendly_message()),
        }
    }
    Ok(())
}

fn exit_with(e: &DriverError) -> ! {
    tracing::error!("❌ {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(if e.is_fatal() { 3 } else { 1 });
}
