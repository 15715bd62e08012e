//! The parameter table that shapes read their inputs from.
//!
//! Shapes never own parameter values. They hold [`ParamId`] handles into a [`Workspace`],
//! and whoever drives the evaluation (a scan, a fitter, a test) mutates the workspace between
//! calls.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};

pub mod spline;

pub use spline::Spline1D;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
/// Handle to a node of the [`Workspace`] that issued it.
pub struct ParamId(usize);

#[derive(Clone, PartialEq, Debug, Serialize)]
/// A real-valued variable confined to `[min, max]`.
pub struct RealVar {
    pub name: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    /// Constant variables refuse assignment.
    pub constant: bool,
}

impl RealVar {
    /// # Errors
    /// Fails unless `min <= value <= max` with all three finite.
    pub fn new(name: impl Into<String>, value: f64, min: f64, max: f64) -> Result<Self> {
        let name = name.into();
        let ordered = min <= value && value <= max;
        if !(ordered && min.is_finite() && max.is_finite()) {
            return Err(Error::InvalidRange {
                name,
                value,
                min,
                max,
            });
        }
        Ok(Self {
            name,
            value,
            min,
            max,
            constant: false,
        })
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Node {
    Variable(RealVar),
    Constant { name: String, value: f64 },
    /// A spline of another node, typically the hypothesis mass.
    Spline {
        name: String,
        input: ParamId,
        spline: Spline1D,
    },
}

impl Node {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Node::Variable(var) => &var.name,
            Node::Constant { name, .. } | Node::Spline { name, .. } => name,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Workspace {
    nodes: Vec<Node>,
    by_name: BTreeMap<String, ParamId>,
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Register a new node.
    ///
    /// # Errors
    /// Fails if the name is taken, or if a spline's input was issued by another workspace.
    pub fn import(&mut self, node: Node) -> Result<ParamId> {
        if self.by_name.contains_key(node.name()) {
            return Err(Error::DuplicateParameter(node.name().to_owned()));
        }
        if let Node::Spline { input, name, .. } = &node {
            if input.0 >= self.nodes.len() {
                return Err(Error::UnknownParameter(format!("input of `{name}`")));
            }
        }
        let id = ParamId(self.nodes.len());
        tracing::debug!(name = node.name(), ?id, "registering parameter");
        self.by_name.insert(node.name().to_owned(), id);
        self.nodes.push(node);
        Ok(id)
    }

    /// Register a node, or hand back the existing node of the same name untouched.
    ///
    /// # Errors
    /// See [`Workspace::import`].
    pub fn import_or_recycle(&mut self, node: Node) -> Result<ParamId> {
        match self.by_name.get(node.name()) {
            Some(&id) => {
                tracing::debug!(name = node.name(), "recycling existing parameter");
                Ok(id)
            }
            None => self.import(node),
        }
    }

    /// # Errors
    /// See [`RealVar::new`] and [`Workspace::import`].
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<ParamId> {
        self.import(Node::Variable(RealVar::new(name, value, min, max)?))
    }

    /// # Errors
    /// See [`Workspace::import`].
    pub fn add_constant(&mut self, name: impl Into<String>, value: f64) -> Result<ParamId> {
        self.import(Node::Constant {
            name: name.into(),
            value,
        })
    }

    /// # Errors
    /// See [`Workspace::import`].
    pub fn add_spline(
        &mut self,
        name: impl Into<String>,
        input: ParamId,
        spline: Spline1D,
    ) -> Result<ParamId> {
        self.import(Node::Spline {
            name: name.into(),
            input,
            spline,
        })
    }

    /// # Errors
    /// [`Error::UnknownParameter`] if nothing of that name is registered.
    pub fn id(&self, name: &str) -> Result<ParamId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownParameter(name.to_owned()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// # Panics
    /// If `id` was issued by another workspace.
    #[must_use]
    pub fn node(&self, id: ParamId) -> &Node {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn name(&self, id: ParamId) -> &str {
        self.node(id).name()
    }

    #[must_use]
    pub fn variable(&self, id: ParamId) -> Option<&RealVar> {
        match self.node(id) {
            Node::Variable(var) => Some(var),
            _ => None,
        }
    }

    /// Current value of a node, resolving splines through their inputs.
    ///
    /// # Panics
    /// If `id` was issued by another workspace.
    #[must_use]
    pub fn value(&self, id: ParamId) -> f64 {
        match self.node(id) {
            Node::Variable(var) => var.value,
            Node::Constant { value, .. } => *value,
            // Inputs always precede the spline, so this recursion bottoms out.
            Node::Spline { input, spline, .. } => spline.evaluate(self.value(*input)),
        }
    }

    /// # Errors
    /// [`Error::UnknownParameter`] if nothing of that name is registered.
    pub fn value_of(&self, name: &str) -> Result<f64> {
        Ok(self.value(self.id(name)?))
    }

    /// Assign a variable, clamping into its range. Returns the value actually stored.
    ///
    /// # Errors
    /// The node must be a non-constant variable and `value` must not be NaN.
    pub fn set_value(&mut self, id: ParamId, value: f64) -> Result<f64> {
        let var = match &mut self.nodes[id.0] {
            Node::Variable(var) => var,
            other => return Err(Error::NotAVariable(other.name().to_owned())),
        };
        if var.constant {
            return Err(Error::ConstantParameter(var.name.clone()));
        }
        if value.is_nan() {
            return Err(Error::InvalidRange {
                name: var.name.clone(),
                value,
                min: var.min,
                max: var.max,
            });
        }
        let clamped = value.clamp(var.min, var.max);
        if clamped != value {
            tracing::debug!(
                name = %var.name,
                requested = value,
                stored = clamped,
                "value outside of range, clamping"
            );
        }
        var.value = clamped;
        Ok(clamped)
    }

    /// # Errors
    /// See [`Workspace::id`] and [`Workspace::set_value`].
    pub fn set_value_of(&mut self, name: &str, value: f64) -> Result<f64> {
        let id = self.id(name)?;
        self.set_value(id, value)
    }

    /// # Errors
    /// [`Error::NotAVariable`] unless the node is a variable.
    pub fn set_constant(&mut self, id: ParamId, constant: bool) -> Result<()> {
        match &mut self.nodes[id.0] {
            Node::Variable(var) => {
                var.constant = constant;
                Ok(())
            }
            other => Err(Error::NotAVariable(other.name().to_owned())),
        }
    }

    /// Variables a fitter would be free to move.
    pub fn floating(&self) -> impl Iterator<Item = &RealVar> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Variable(var) if !var.constant => Some(var),
            _ => None,
        })
    }

    #[must_use]
    /// Current value of every node, keyed by name.
    pub fn snapshot(&self) -> BTreeMap<String, f64> {
        self.by_name
            .iter()
            .map(|(name, &id)| (name.clone(), self.value(id)))
            .collect()
    }
}
