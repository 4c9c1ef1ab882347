/// State management module
/// 
/// This module handles all application state, including:
/// - The upload/processing state machine (session.rs)
/// - Shared image structures (data.rs)
/// - Credential persistence and the settings edit buffer (settings.rs)

pub mod data;
pub mod session;
pub mod settings;
