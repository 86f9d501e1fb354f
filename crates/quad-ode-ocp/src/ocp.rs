//! Optimal Control Problem (OCP) Definition
//!
//! ```text
//! minimize    Σₖ ½‖y(xₖ, uₖ) − y_ref‖²_W + ½‖y_e(x_N) − y_ref_e‖²_{W_e}
//! subject to  x₀ = x_init
//!             ẋ = f(x, u, p)             (attitude dynamics)
//!             lh ≤ h(xₖ) ≤ uh           (unit quaternion)
//!             w_min ≤ uₖ ≤ w_max        (rotor speeds)
//! ```
//!
//! The solve loop itself belongs to the external framework; this module
//! bundles the model record with its configuration and evaluates single nodes.

use quad_ode_core::{
    ControlVector, OutputVector, ParamVector, StateVector, TerminalOutputVector, NH, NY, NY_E,
};

use crate::config::{ConfigError, OcpConfig};
use crate::constraints::{ConstraintEvaluation, ConstraintEvaluator};
use crate::cost::NonlinearLeastSquares;
use crate::model::{export_quad_ode_model, ModelDescription};

/// Stage node evaluation
#[derive(Debug, Clone)]
pub struct NodeEvaluation {
    /// Explicit dynamics f(x, u, p)
    pub xdot: StateVector,
    /// Stage outputs y(x, u)
    pub y: OutputVector,
    /// Least-squares stage cost
    pub cost: f64,
    /// Path constraint h(x)
    pub h: f64,
    /// Bound checks on h and u
    pub constraints: ConstraintEvaluation,
}

/// Terminal node evaluation
#[derive(Debug, Clone)]
pub struct TerminalEvaluation {
    /// Terminal outputs y_e(x)
    pub y_e: TerminalOutputVector,
    /// Least-squares terminal cost
    pub cost: f64,
    /// Path constraint h(x)
    pub h: f64,
    /// Bound checks on h
    pub constraints: ConstraintEvaluation,
}

/// OCP problem definition
#[derive(Debug, Clone)]
pub struct OcpDefinition {
    /// Model record
    pub model: ModelDescription,
    /// Configuration
    pub config: OcpConfig,
    cost: NonlinearLeastSquares,
    constraints: ConstraintEvaluator,
    params: ParamVector,
}

impl OcpDefinition {
    /// Create an OCP definition from a validated configuration
    pub fn new(config: OcpConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let model = export_quad_ode_model().with_name(config.model_name.clone());
        model.check_dimensions()?;

        log::debug!(
            "OCP {}: N={} T={}s, parameters {:?}",
            model.name,
            config.horizon.num_nodes,
            config.horizon.horizon_time,
            config.params
        );

        Ok(Self {
            cost: NonlinearLeastSquares::new(&config.weights),
            constraints: ConstraintEvaluator::new(config.constraints.clone()),
            params: config.params.to_vector(),
            model,
            config,
        })
    }

    /// State dimension
    pub fn nx(&self) -> usize {
        self.model.nx()
    }

    /// Control dimension
    pub fn nu(&self) -> usize {
        self.model.nu()
    }

    /// Parameter dimension
    pub fn np(&self) -> usize {
        self.model.np()
    }

    /// Stage output dimension
    pub fn ny(&self) -> usize {
        NY
    }

    /// Terminal output dimension
    pub fn ny_e(&self) -> usize {
        NY_E
    }

    /// Nonlinear constraint dimension
    pub fn nh(&self) -> usize {
        NH
    }

    /// Number of shooting intervals
    pub fn n(&self) -> usize {
        self.config.horizon.num_nodes
    }

    /// Parameter vector shared by all nodes
    pub fn parameter_vector(&self) -> &ParamVector {
        &self.params
    }

    pub fn cost(&self) -> &NonlinearLeastSquares {
        &self.cost
    }

    /// Evaluate dynamics, outputs, cost and constraints at a stage node
    pub fn evaluate_node(&self, x: &StateVector, u: &ControlVector, y_ref: &OutputVector) -> NodeEvaluation {
        let y = (self.model.cost_y_expr)(x, u);
        let r = y - y_ref;

        NodeEvaluation {
            xdot: (self.model.f_expl_expr)(x, u, &self.params),
            y,
            cost: 0.5 * r.component_mul(&r).dot(&self.cost.stage_weights),
            h: (self.model.con_h_expr)(x),
            constraints: self.constraints.evaluate(x, u),
        }
    }

    /// Evaluate outputs, cost and constraints at the terminal node
    pub fn evaluate_terminal(&self, x: &StateVector, y_ref_e: &TerminalOutputVector) -> TerminalEvaluation {
        let y_e = (self.model.cost_y_expr_e)(x);
        let r = y_e - y_ref_e;

        TerminalEvaluation {
            y_e,
            cost: 0.5 * r.component_mul(&r).dot(&self.cost.terminal_weights),
            h: (self.model.con_h_expr)(x),
            constraints: self.constraints.evaluate_state(x),
        }
    }

    /// Implicit residual at a node, for implicit integrators
    pub fn implicit_residual(&self, x: &StateVector, xdot: &StateVector, u: &ControlVector) -> StateVector {
        (self.model.f_impl_expr)(x, xdot, u, &self.params)
    }
}
