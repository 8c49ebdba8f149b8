// src/integrations/mod.rs — Chat platform and document format integrations

pub mod msoffice;
pub mod telegram;
pub mod types;

pub use types::{InboundEvent, MessagingAdapter};
