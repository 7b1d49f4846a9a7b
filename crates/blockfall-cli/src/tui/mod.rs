//! Minimal terminal application runtime: a fixed-rate tick, on-demand
//! rendering, and terminal events, dispatched to an [`App`].

pub use self::{app::App, runtime::Runtime};

mod app;
mod event;
mod event_loop;
mod runtime;
