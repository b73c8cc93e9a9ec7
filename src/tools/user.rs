/// Tool for registering journal writers
///
/// This module implements the user_register MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{User, UserSummary};
use crate::storage::JournalStorage;
use crate::tools::JournalError;

/// Parameters for registering a user
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RegisterUserParams {
    /// 3-30 characters: letters, digits, '_' or '-'
    pub username: String,
}

/// Response from registering a user
#[derive(Debug, Serialize)]
pub struct RegisterUserResponse {
    pub success: bool,
    pub message: String,
    pub user_id: String,
    pub username: String,
    pub summary: UserSummary,
}

/// Register a new user with an empty summary
pub fn register_user<S: JournalStorage>(
    storage: &S,
    params: RegisterUserParams,
) -> Result<RegisterUserResponse, JournalError> {
    let user = User::new(params.username)?;
    storage.create_user(&user)?;

    tracing::info!("Registered user {} ({})", user.username, user.id);

    Ok(RegisterUserResponse {
        success: true,
        message: format!("👋 Welcome, {}! Write your first entry to start a streak.", user.username),
        user_id: user.id.to_string(),
        username: user.username,
        summary: user.summary,
    })
}
