use oscv1_lib::transport::{SerialPortType, list_ports, port_matches};
use std::error::Error;

/// List serial ports and mark the one auto-detection would pick.
fn main() -> Result<(), Box<dyn Error>> {
    let ports = list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found.");
        return Ok(());
    }

    let pick = ports.iter().position(port_matches);
    for (i, info) in ports.iter().enumerate() {
        let marker = if Some(i) == pick { "*" } else { " " };
        match &info.port_type {
            SerialPortType::UsbPort(usb) => println!(
                "{marker} {:<24} USB {:04x}:{:04x}  {} / {}",
                info.port_name,
                usb.vid,
                usb.pid,
                usb.manufacturer.as_deref().unwrap_or("-"),
                usb.product.as_deref().unwrap_or("-"),
            ),
            other => println!("{marker} {:<24} {other:?}", info.port_name),
        }
    }

    match pick {
        Some(i) => println!("\n* auto-detection would use {}", ports[i].port_name),
        None => println!("\nNo port looks like the digitizer."),
    }
    Ok(())
}
