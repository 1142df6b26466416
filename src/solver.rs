// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! A pluggable abstraction over an integer-arithmetic decision backend, and a concrete adapter
//! over `good_lp`/CBC.
//!
//! The [`IntegerSolver`] trait is the only thing the constraint generator (`crate::constraints`)
//! depends on. A different decision procedure could be dropped in behind the same trait without
//! touching the generator.

use std::collections::HashMap;

use good_lp::{constraint, variable, Expression, ProblemVariables, ResolutionError, Solution,
              SolverModel, Variable};
use log::debug;

use crate::error::{EncodingError, ExtractionError};

/// A linear atom of the form `lhs_var (op) k`, or `lhs_a - lhs_b (op) k` when `rhs_var` is set.
#[derive(Debug, Clone, Copy)]
pub struct Atom {
    /// Left-hand variable.
    pub lhs: Variable,
    /// Optional variable subtracted from `lhs` (for atoms of the form `x - y (op) k`).
    pub rhs: Option<Variable>,
    /// Comparison operator.
    pub op: Cmp,
    /// Right-hand constant.
    pub k: i64,
}

/// Comparison operator of a linear atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    /// `<=`
    Le,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `=`
    Eq,
}

impl Atom {
    /// `x <= k`
    pub fn le(x: Variable, k: i64) -> Self {
        Atom { lhs: x, rhs: None, op: Cmp::Le, k }
    }
    /// `x < k`
    pub fn lt(x: Variable, k: i64) -> Self {
        Atom { lhs: x, rhs: None, op: Cmp::Lt, k }
    }
    /// `x >= k`
    pub fn ge(x: Variable, k: i64) -> Self {
        Atom { lhs: x, rhs: None, op: Cmp::Ge, k }
    }
    /// `x > k`
    pub fn gt(x: Variable, k: i64) -> Self {
        Atom { lhs: x, rhs: None, op: Cmp::Gt, k }
    }
    /// `x = k`
    pub fn eq(x: Variable, k: i64) -> Self {
        Atom { lhs: x, rhs: None, op: Cmp::Eq, k }
    }
    /// `x - y <= k`
    pub fn diff_le(x: Variable, y: Variable, k: i64) -> Self {
        Atom { lhs: x, rhs: Some(y), op: Cmp::Le, k }
    }
    /// `x - y >= k`
    pub fn diff_ge(x: Variable, y: Variable, k: i64) -> Self {
        Atom { lhs: x, rhs: Some(y), op: Cmp::Ge, k }
    }
    /// `x - y = k`
    pub fn diff_eq(x: Variable, y: Variable, k: i64) -> Self {
        Atom { lhs: x, rhs: Some(y), op: Cmp::Eq, k }
    }

    fn expression(&self) -> Expression {
        match self.rhs {
            Some(y) => Expression::from(self.lhs) - Expression::from(y),
            None => Expression::from(self.lhs),
        }
    }
}

/// The capability set a decision backend must provide for the constraint generator.
pub trait IntegerSolver {
    /// Declare a new, unbounded integer variable with an informational name.
    fn declare(&mut self, name: String) -> Variable;
    /// Assert a single linear atom.
    fn assert_atom(&mut self, atom: Atom) -> Result<(), EncodingError>;
    /// Assert the disjunction of two linear atoms (`a OR b`).
    fn assert_disjunction(&mut self, a: Atom, b: Atom) -> Result<(), EncodingError>;
    /// Check satisfiability of every assertion made so far, consuming the solver.
    fn check(self) -> Result<Box<dyn Model>, ResolutionError>;
}

/// A satisfying model returned by a successful [`IntegerSolver::check`].
pub trait Model {
    /// Read the integer value assigned to `var`.
    fn value(&self, var: Variable) -> Result<i64, ExtractionError>;
}

/// A `good_lp`/CBC-backed [`IntegerSolver`].
///
/// Disjunctions are encoded with the big-M technique: each atom is relaxed by `M * indicator`,
/// with exactly one indicator forced to zero by a `sum == 1` constraint over a pair of binaries.
/// This mirrors the `c_any`/`inequality` helpers the decomposition scheduler uses for its own
/// disjunctive and indicator constraints.
pub struct CbcSolver {
    vars: ProblemVariables,
    names: HashMap<Variable, String>,
    constraints: Vec<good_lp::Constraint>,
    big_m: f64,
    cbc_seconds: Option<u32>,
    hide_output: bool,
}

impl std::fmt::Debug for CbcSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CbcSolver")
            .field("variables", &self.names.len())
            .field("constraints", &self.constraints.len())
            .field("big_m", &self.big_m)
            .field("cbc_seconds", &self.cbc_seconds)
            .finish()
    }
}

impl CbcSolver {
    /// Create a new solver. `big_m` must be at least as large as the greatest value any offset
    /// variable can take (the hyperperiod is always a safe, tight choice).
    pub fn new(big_m: i64, cbc_seconds: Option<u32>) -> Self {
        CbcSolver {
            vars: ProblemVariables::new(),
            names: HashMap::new(),
            constraints: Vec::new(),
            big_m: big_m as f64,
            cbc_seconds,
            hide_output: cfg!(feature = "hide-cbc-output"),
        }
    }

    fn binary(&mut self) -> Variable {
        self.vars.add(variable().binary())
    }

    fn push(&mut self, c: good_lp::Constraint) {
        self.constraints.push(c);
    }

    fn atom_expr(atom: &Atom, relax: Option<Expression>) -> (Expression, f64, Cmp) {
        let mut lhs = atom.expression();
        if let Some(r) = relax {
            lhs = lhs - r;
        }
        (lhs, atom.k as f64, atom.op)
    }

    fn assert_relaxed(&mut self, atom: Atom, relax: Expression) {
        let (lhs, k, op) = Self::atom_expr(&atom, Some(relax));
        let c = match op {
            Cmp::Le => constraint!(lhs <= k),
            Cmp::Lt => constraint!(lhs <= k - 1.0),
            Cmp::Ge => constraint!(lhs >= k),
            Cmp::Gt => constraint!(lhs >= k + 1.0),
            Cmp::Eq => constraint!(lhs == k),
        };
        self.push(c);
    }
}

impl IntegerSolver for CbcSolver {
    fn declare(&mut self, name: String) -> Variable {
        let v = self.vars.add(variable().integer().min(0));
        self.names.insert(v, name);
        v
    }

    fn assert_atom(&mut self, atom: Atom) -> Result<(), EncodingError> {
        self.assert_relaxed(atom, Expression::from(0.0));
        Ok(())
    }

    fn assert_disjunction(&mut self, a: Atom, b: Atom) -> Result<(), EncodingError> {
        let y = self.binary();
        let m = self.big_m;
        // a relaxed by M*(1-y), b relaxed by M*y; forcing y=0 satisfies b tightly, y=1 satisfies a.
        self.assert_relaxed(a, m * (1 - y));
        self.assert_relaxed(b, m * y);
        Ok(())
    }

    fn check(self) -> Result<Box<dyn Model>, ResolutionError> {
        debug!(
            "solving {} variables, {} constraints",
            self.names.len(),
            self.constraints.len()
        );
        let mut problem =
            good_lp::solvers::coin_cbc::coin_cbc(self.vars.minimise(Expression::from(0.0)));
        problem.set_parameter("threads", &num_cpus::get().to_string());
        if self.hide_output {
            problem.set_parameter("logLevel", "0");
        }
        if let Some(secs) = self.cbc_seconds {
            problem.set_parameter("seconds", &secs.to_string());
        }
        for c in self.constraints {
            problem.add_constraint(c);
        }
        let solution = problem.solve()?;
        Ok(Box::new(CbcModel { solution, names: self.names }))
    }
}

struct CbcModel {
    solution: good_lp::solvers::coin_cbc::CoinCbcSolution,
    names: HashMap<Variable, String>,
}

impl Model for CbcModel {
    fn value(&self, var: Variable) -> Result<i64, ExtractionError> {
        let name = self
            .names
            .get(&var)
            .cloned()
            .unwrap_or_else(|| "<unnamed>".to_string());
        let v = self.solution.value(var);
        if v.is_nan() {
            return Err(ExtractionError::MissingValue(name));
        }
        Ok(v.round() as i64)
    }
}
