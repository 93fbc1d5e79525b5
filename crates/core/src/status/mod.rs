//! Status module - payment status taxonomy and the polling task.

mod status_model;
mod status_poller;


pub use status_model::{PaymentStatus, PaymentStatusView, StatusAction};
pub use status_poller::{PaymentStatusPoller, StatusWatch};
