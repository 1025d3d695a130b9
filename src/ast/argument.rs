use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

/// A single `name = value` binding handed to the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub value: f64,
}

impl Argument {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

impl From<(&str, f64)> for Argument {
    fn from((name, value): (&str, f64)) -> Self {
        Argument::new(name, value)
    }
}

/// The evaluation environment: anything that can look a variable up by name.
pub trait Bindings {
    fn value_of(&self, name: &str) -> Option<f64>;
}

impl<S: BuildHasher> Bindings for HashMap<String, f64, S> {
    fn value_of(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl Bindings for BTreeMap<String, f64> {
    fn value_of(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

/// Argument lists may repeat a name; the last binding wins.
impl Bindings for [Argument] {
    fn value_of(&self, name: &str) -> Option<f64> {
        self.iter()
            .rev()
            .find(|argument| argument.name == name)
            .map(|argument| argument.value)
    }
}

impl Bindings for Vec<Argument> {
    fn value_of(&self, name: &str) -> Option<f64> {
        self.as_slice().value_of(name)
    }
}

impl<B: Bindings + ?Sized> Bindings for &B {
    fn value_of(&self, name: &str) -> Option<f64> {
        (**self).value_of(name)
    }
}

/// One variable layered over another set of bindings, as used by sweeps.
#[derive(Debug, Clone, Copy)]
pub struct Overlay<'a, B: ?Sized> {
    pub name: &'a str,
    pub value: f64,
    pub base: &'a B,
}

impl<B: Bindings + ?Sized> Bindings for Overlay<'_, B> {
    fn value_of(&self, name: &str) -> Option<f64> {
        if name == self.name {
            Some(self.value)
        } else {
            self.base.value_of(name)
        }
    }
}
