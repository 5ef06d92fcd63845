//! Last trigger wins.
//!
//! Every trigger starts a new [`Sequence`]. After each suspension point a
//! sequence has to check whether it is still the current one before it
//! touches the document again.

use std::{cell::Cell, rc::Rc};

use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct SequenceCounter(Rc<Cell<u64>>);

impl SequenceCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new sequence and supersedes all previous ones.
    #[must_use]
    pub fn begin(&self) -> Sequence {
        self.invalidate();
        Sequence {
            id: self.0.get(),
            counter: self.clone(),
        }
    }

    /// Supersedes all sequences without starting a new one.
    pub fn invalidate(&self) {
        self.0.set(self.0.get() + 1);
    }

    fn current(&self) -> u64 {
        self.0.get()
    }
}

#[derive(Debug, Clone)]
pub struct Sequence {
    id: u64,
    counter: SequenceCounter,
}

impl Sequence {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn is_current(&self) -> bool {
        self.counter.current() == self.id
    }

    pub fn ensure_current(&self) -> Result<()> {
        if self.is_current() {
            Ok(())
        } else {
            log::debug!("Sequence {} has been superseded", self.id);
            Err(Error::Superseded)
        }
    }
}
