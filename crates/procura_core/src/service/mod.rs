//! Services layered over the entity store.

pub mod history_service;
