// SPDX-License-Identifier: GPL-3.0-only

//! Application model
//!
//! The screen is an Elm-style state machine: [`Message`]s go into
//! [`AppModel::update`], which mutates state and may hand back an [`Effect`]
//! for the terminal runtime to execute. Effect outcomes return as messages.

mod state;
mod update;
pub mod view;

pub use state::{Activity, AppModel, Effect, Focus, Message};
