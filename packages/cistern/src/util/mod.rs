//! Low-level utilities.

mod atomic_take;
mod exit_on_drop;

pub(crate) use self::{
    atomic_take::AtomicTake,
    exit_on_drop::ExitOnDrop,
};
