//! Sheet-backed authentication against the read-only `LOGIN` tab.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::schema::login;
use crate::sheets::{RowReader, StoreClient};

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Authenticated user: role plus the pages the user may open.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    pub username: String,
    pub role: String,
    pub pages: Vec<String>,
}

pub struct AuthService {
    client: StoreClient,
}

impl AuthService {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Checks credentials against the user list. The username comparison is
    /// case-insensitive, the password exact. Failure is a single opaque
    /// error either way.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> Result<User, ServiceError> {
        let username = request.username.trim();
        if username.is_empty() || request.password.is_empty() {
            return Err(ServiceError::Validation(
                "username and password are required".into(),
            ));
        }

        let grid = self.client.fetch_grid(login::TAB).await?;
        for cells in grid.iter().skip(login::DATA_START_ROW) {
            let row = RowReader::new(cells);
            if !row.text(login::USERNAME).eq_ignore_ascii_case(username) {
                continue;
            }
            if row.text(login::PASSWORD) != request.password {
                warn!("password mismatch");
                break;
            }
            let role = {
                let role = row.text(login::ROLE).to_lowercase();
                if role.is_empty() {
                    "user".to_string()
                } else {
                    role
                }
            };
            let pages: Vec<String> = row
                .text(login::PAGES)
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            info!(role, "login succeeded");
            return Ok(User {
                username: row.text(login::USERNAME),
                role,
                pages,
            });
        }
        Err(ServiceError::Auth("invalid username or password".into()))
    }
}
