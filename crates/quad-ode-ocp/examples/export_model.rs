//! Export the attitude model and evaluate it at a few operating points
//!
//! Usage:
//!     RUST_LOG=debug cargo run -p quad-ode-ocp --example export_model [config.json]

use nalgebra::Vector3;

use quad_ode_core::dynamics::{AttitudeState, RotorSpeeds};
use quad_ode_core::math::{quaternion_from_euler, EulerAngles};
use quad_ode_ocp::cost::OutputReference;
use quad_ode_ocp::{OcpConfig, OcpDefinition};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => OcpConfig::from_json_file(path)?,
        None => OcpConfig::default(),
    };
    let ocp = OcpDefinition::new(config)?;

    println!("=== Model {} ===", ocp.model.name);
    println!("x    = {:?}", ocp.model.x);
    println!("u    = {:?}", ocp.model.u);
    println!("p    = {:?}", ocp.model.p);
    println!(
        "nx={} nu={} np={} ny={} ny_e={} nh={} N={}",
        ocp.nx(),
        ocp.nu(),
        ocp.np(),
        ocp.ny(),
        ocp.ny_e(),
        ocp.nh(),
        ocp.n()
    );

    let reference = OutputReference::hover(0.0, 300.0);

    let points = [
        ("hover", AttitudeState::default(), RotorSpeeds::uniform(300.0)),
        (
            "rolled, spinning",
            AttitudeState::new(
                quaternion_from_euler(&EulerAngles::new(0.2, -0.1, 0.5)),
                Vector3::new(0.5, -0.2, 0.1),
            ),
            RotorSpeeds::new(320.0, 300.0, 280.0, 300.0),
        ),
    ];

    for (label, state, rotors) in points {
        let x = state.to_vector();
        let node = ocp.evaluate_node(&x, &rotors.to_vector(), &reference.stage);

        println!("\n--- {} ---", label);
        println!("xdot = {:.4}", node.xdot.transpose());
        println!("Eul  = {:.4}", node.y.fixed_rows::<3>(0).transpose());
        println!("h    = {:.6}", node.h);
        println!("cost = {:.4}", node.cost);
        if !node.constraints.all_satisfied {
            println!("violated: {:?}", node.constraints.violated().collect::<Vec<_>>());
        }
    }

    let terminal = ocp.evaluate_terminal(&AttitudeState::default().to_vector(), &reference.terminal);
    println!("\nterminal cost at hover = {:.4}", terminal.cost);

    Ok(())
}
