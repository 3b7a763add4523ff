//! External delivery channels for threshold alerts.

pub mod email;
