//! Command Handlers

mod generation_handlers;

pub use generation_handlers::{
    CloseGenerationHandler, RecoverGenerationHandler, StartGenerationHandler,
};
