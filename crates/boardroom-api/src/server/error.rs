#[derive(Debug)]
pub enum ServerError {
    Io(std::io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "server io error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    error: ApiError,
}

impl HttpApiError {
    fn game_not_found(requested_game_id: &str, active_game_id: Option<&str>) -> Self {
        let details = active_game_id.map(|active| {
            format!("requested_game_id={requested_game_id} active_game_id={active}")
        });
        Self {
            status: StatusCode::NOT_FOUND,
            error: ApiError::new(
                ErrorCode::GameNotFound,
                "game_id does not match an active game",
                details,
            ),
        }
    }

    fn invalid_query(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::new(ErrorCode::InvalidQuery, message, details),
        }
    }

    fn invalid_action(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    fn internal(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new(ErrorCode::InternalError, message, details),
        }
    }

    fn from_persistence(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotAttached => {
                Self::invalid_query("persistence store is not attached", None)
            }
            PersistenceError::GameNotFound(game_id) => Self {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new(
                    ErrorCode::GameNotFound,
                    "game_id is not stored",
                    Some(format!("game_id={game_id}")),
                ),
            },
            PersistenceError::GameAlreadyExists(game_id) => Self {
                status: StatusCode::CONFLICT,
                error: ApiError::new(
                    ErrorCode::ValidationError,
                    "game_id already exists; pass replace_existing=true to replace",
                    Some(format!("game_id={game_id}")),
                ),
            },
            PersistenceError::VersionConflict { game_id, expected } => Self {
                status: StatusCode::CONFLICT,
                error: ApiError::new(
                    ErrorCode::VersionConflict,
                    "game state was modified by another writer",
                    Some(format!("game_id={game_id} expected_version={expected}")),
                ),
            },
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::new(
                    ErrorCode::StorageFailure,
                    "persistence operation failed",
                    Some(other.to_string()),
                ),
            },
        }
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
