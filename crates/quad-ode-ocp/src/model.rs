//! Model description handed to the OCP solver framework
//!
//! [`ModelDescription`] mirrors the fields an acados-style `AcadosModel`
//! carries: symbol declarations for x, xdot, u and p, the explicit and
//! implicit dynamics, the stage and terminal least-squares output maps and
//! the nonlinear path constraint. Instead of symbolic expressions the
//! `*_expr` fields hold plain functions of the numeric vectors.

use quad_ode_core::dynamics::{f_expl, f_impl};
use quad_ode_core::{
    ControlVector, ModelError, OutputVector, ParamVector, StateVector, TerminalOutputVector, NP, NU, NX, NY,
    NY_E,
};

use crate::constraints::quaternion_norm_squared;
use crate::cost::{stage_outputs, terminal_outputs};

/// Default model name, used by the solver framework for generated-code naming
pub const MODEL_NAME: &str = "quad_ode";

/// xdot = f(x, u, p)
pub type ExplicitDynamicsFn = fn(&StateVector, &ControlVector, &ParamVector) -> StateVector;

/// xdot − f(x, u, p), arguments `(x, xdot, u, p)`
pub type ImplicitDynamicsFn = fn(&StateVector, &StateVector, &ControlVector, &ParamVector) -> StateVector;

/// y = [Eul; x; u]
pub type StageOutputFn = fn(&StateVector, &ControlVector) -> OutputVector;

/// y_e = [Eul; x]
pub type TerminalOutputFn = fn(&StateVector) -> TerminalOutputVector;

/// h(x)
pub type PathConstraintFn = fn(&StateVector) -> f64;

/// State symbols
pub const STATE_SYMBOLS: [&str; NX] = ["q0", "q1", "q2", "q3", "omegax", "omegay", "omegaz"];

/// State derivative symbols
pub const STATE_DERIVATIVE_SYMBOLS: [&str; NX] = [
    "q0_dot", "q1_dot", "q2_dot", "q3_dot", "omegax_dot", "omegay_dot", "omegaz_dot",
];

/// Control symbols (rotor speeds)
pub const CONTROL_SYMBOLS: [&str; NU] = ["w1", "w2", "w3", "w4"];

/// Parameter symbols
pub const PARAMETER_SYMBOLS: [&str; NP] = ["rho", "A", "Cl", "Cd", "m", "g", "J1", "J2", "J3"];

/// Model record for an external OCP generator
#[derive(Debug, Clone)]
pub struct ModelDescription {
    pub name: String,
    pub x: Vec<&'static str>,
    pub xdot: Vec<&'static str>,
    pub u: Vec<&'static str>,
    pub p: Vec<&'static str>,
    pub f_expl_expr: ExplicitDynamicsFn,
    pub f_impl_expr: ImplicitDynamicsFn,
    pub cost_y_expr: StageOutputFn,
    pub cost_y_expr_e: TerminalOutputFn,
    pub con_h_expr: PathConstraintFn,
}

impl ModelDescription {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn nu(&self) -> usize {
        self.u.len()
    }

    pub fn np(&self) -> usize {
        self.p.len()
    }

    /// Check that the declared symbols match the vector shapes of the maps
    pub fn check_dimensions(&self) -> Result<(), ModelError> {
        let checks = [
            (NX, self.x.len()),
            (NX, self.xdot.len()),
            (NU, self.u.len()),
            (NP, self.p.len()),
        ];
        for (expected, got) in checks {
            if expected != got {
                return Err(ModelError::DimensionMismatch { expected, got });
            }
        }
        Ok(())
    }

    /// Evaluate `cost_y_expr` on a stacked `[x; u]` slice
    pub fn evaluate_outputs(&self, xu: &[f64]) -> Result<OutputVector, ModelError> {
        let (x, u) = split_state_control(xu)?;
        Ok((self.cost_y_expr)(&x, &u))
    }

    /// Evaluate `f_expl_expr` on a stacked `[x; u]` slice and a parameter slice
    pub fn evaluate_dynamics(&self, xu: &[f64], p: &[f64]) -> Result<StateVector, ModelError> {
        let (x, u) = split_state_control(xu)?;
        if p.len() != NP {
            return Err(ModelError::DimensionMismatch {
                expected: NP,
                got: p.len(),
            });
        }
        Ok((self.f_expl_expr)(&x, &u, &ParamVector::from_column_slice(p)))
    }
}

fn split_state_control(xu: &[f64]) -> Result<(StateVector, ControlVector), ModelError> {
    if xu.len() != NX + NU {
        return Err(ModelError::DimensionMismatch {
            expected: NX + NU,
            got: xu.len(),
        });
    }
    Ok((
        StateVector::from_column_slice(&xu[..NX]),
        ControlVector::from_column_slice(&xu[NX..]),
    ))
}

/// Build the quadrotor attitude model description
pub fn export_quad_ode_model() -> ModelDescription {
    let model = ModelDescription {
        name: MODEL_NAME.to_string(),
        x: STATE_SYMBOLS.to_vec(),
        xdot: STATE_DERIVATIVE_SYMBOLS.to_vec(),
        u: CONTROL_SYMBOLS.to_vec(),
        p: PARAMETER_SYMBOLS.to_vec(),
        f_expl_expr: f_expl,
        f_impl_expr: f_impl,
        cost_y_expr: stage_outputs,
        cost_y_expr_e: terminal_outputs,
        con_h_expr: quaternion_norm_squared,
    };

    log::debug!(
        "model {}: nx={} nu={} np={} ny={} ny_e={}",
        model.name,
        model.nx(),
        model.nu(),
        model.np(),
        NY,
        NY_E
    );

    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exported_dimensions() {
        let model = export_quad_ode_model();

        assert_eq!(model.name, "quad_ode");
        assert_eq!(model.nx(), 7);
        assert_eq!(model.nu(), 4);
        assert_eq!(model.np(), 9);
        assert!(model.check_dimensions().is_ok());
    }

    #[test]
    fn test_symbol_order() {
        let model = export_quad_ode_model();

        assert_eq!(model.x[0], "q0");
        assert_eq!(model.x[6], "omegaz");
        assert_eq!(model.xdot[4], "omegax_dot");
        assert_eq!(model.u, vec!["w1", "w2", "w3", "w4"]);
        assert_eq!(model.p[6..], ["J1", "J2", "J3"]);
    }

    #[test]
    fn test_dimension_check_detects_missing_symbol() {
        let mut model = export_quad_ode_model();
        model.p.pop();

        assert_eq!(
            model.check_dimensions(),
            Err(ModelError::DimensionMismatch { expected: 9, got: 8 })
        );
    }

    #[test]
    fn test_record_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ModelDescription>();
    }

    #[test]
    fn test_with_name() {
        let model = export_quad_ode_model().with_name("quad_attitude");
        assert_eq!(model.name, "quad_attitude");
    }

    #[test]
    fn test_reference_check_outputs() {
        let model = export_quad_ode_model();
        let xu = [0.566, 0.571, 0.168, 0.571, 0.1, 0.2, 0.3, 1.0, 2.0, 3.0, 4.0];

        let y = model.evaluate_outputs(&xu).unwrap();

        assert_eq!(y.len(), 14);
        for i in 0..11 {
            assert_relative_eq!(y[3 + i], xu[i]);
        }
        // 2(q0q2 − q3q1) < 0 for this attitude
        assert!(y[1] < 0.0);
    }

    #[test]
    fn test_reference_check_dynamics() {
        let model = export_quad_ode_model();
        let xu = [0.566, 0.571, 0.168, 0.571, 0.1, 0.2, 0.3, 1.0, 2.0, 3.0, 4.0];
        let p = [1.0; 9];

        let xdot = model.evaluate_dynamics(&xu, &p).unwrap();

        // With unit parameters: Tx = 0.5(4 − 16), J = I so ω × Jω = 0
        assert_relative_eq!(xdot[4], -6.0, epsilon = 1e-12);
        assert_relative_eq!(xdot[5], 0.5 * (1.0 - 9.0), epsilon = 1e-12);
        assert_relative_eq!(xdot[6], 0.5 * (1.0 - 4.0 + 9.0 - 16.0), epsilon = 1e-12);
    }

    #[test]
    fn test_reference_check_rejects_wrong_length() {
        let model = export_quad_ode_model();

        assert_eq!(
            model.evaluate_outputs(&[0.0; 10]),
            Err(ModelError::DimensionMismatch { expected: 11, got: 10 })
        );
        assert_eq!(
            model.evaluate_dynamics(&[0.0; 11], &[1.0; 3]),
            Err(ModelError::DimensionMismatch { expected: 9, got: 3 })
        );
    }

    #[test]
    fn test_record_fields_match_core_functions() {
        let model = export_quad_ode_model();
        let x = StateVector::from_column_slice(&[1.0, 0.0, 0.0, 0.0, 0.2, -0.1, 0.4]);
        let u = ControlVector::new(100.0, 90.0, 110.0, 95.0);
        let p = quad_ode_core::dynamics::QuadrotorParams::default().to_vector();

        let xdot = (model.f_expl_expr)(&x, &u, &p);
        assert_relative_eq!(xdot, f_expl(&x, &u, &p));
        assert_relative_eq!((model.f_impl_expr)(&x, &xdot, &u, &p), StateVector::zeros());
        assert_relative_eq!((model.con_h_expr)(&x), 1.0);
    }
}
