//! # Shared test helpers
//!
//! Examples and hooks are `'static` closures, so observations are made through
//! shared, cloneable recorders rather than borrowed locals.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Ordered log of markers pushed by hooks and bodies.
#[derive(Clone, Default)]
pub struct Trace(Rc<RefCell<Vec<String>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, marker: &str) {
        self.0.borrow_mut().push(marker.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count(&self, marker: &str) -> usize {
        self.0.borrow().iter().filter(|m| *m == marker).count()
    }
}

/// A boolean set from inside a closure and checked afterwards.
#[derive(Clone, Default)]
pub struct Flag(Rc<Cell<bool>>);

impl Flag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.set(true);
    }

    pub fn record(&self, value: bool) {
        self.0.set(value);
    }

    pub fn get(&self) -> bool {
        self.0.get()
    }
}
