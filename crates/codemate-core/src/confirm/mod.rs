//! Request-correlated user confirmations
//!
//! A workflow step calls [`ConfirmationBroker::ask`], which emits a
//! `confirmAction` event and suspends until the matching `confirmResult`
//! reply is passed to [`ConfirmationBroker::resolve`]. There is no timeout.

mod broker;

pub use broker::{CANCEL, ConfirmationBroker, PROCEED};
