//! Glob-import everything needed to build and run effects.

pub use crate::effect::{
    fail, from_async, from_fn, from_result, pure, Effect, EffectExt, RunStandalone,
};
