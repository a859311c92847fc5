//! 数据库层 - redb 嵌入式存储
//!
//! - [`CatalogStorage`] - 菜单 / 分区 / 菜品存储与位置批量写入
//! - [`StorageError`] - 存储错误，可转换为 [`AppError`]

pub mod storage;

pub use storage::{CatalogStorage, StorageError, StorageResult};

use shared::error::{AppError, ErrorCode};

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MenuNotFound(id) => {
                AppError::with_message(ErrorCode::MenuNotFound, format!("Menu {} not found", id))
                    .with_detail("id", id)
            }
            StorageError::SectionNotFound(id) => AppError::with_message(
                ErrorCode::SectionNotFound,
                format!("Section {} not found", id),
            )
            .with_detail("id", id),
            StorageError::ItemNotFound(id) => AppError::with_message(
                ErrorCode::MenuItemNotFound,
                format!("Menu item {} not found", id),
            )
            .with_detail("id", id),
            StorageError::ScopeMismatch {
                resource,
                id,
                scope_id,
            } => AppError::scope_mismatch(resource, id, scope_id),
            StorageError::DuplicateId(id) => AppError::with_message(
                ErrorCode::DuplicatePositionId,
                format!("Id {} appears more than once in the batch", id),
            )
            .with_detail("id", id),
            StorageError::InvalidPosition { id, position } => AppError::with_message(
                ErrorCode::InvalidPosition,
                format!("Position {} for id {} must not be negative", position, id),
            )
            .with_detail("id", id)
            .with_detail("position", position),
            StorageError::CrossScopeMove { resource, id } => AppError::with_message(
                ErrorCode::CrossScopeMoveNotAllowed,
                format!("{} {} cannot change parent", resource, id),
            )
            .with_detail("id", id),
            StorageError::PositionConflict { resource, scope_id } => AppError::with_message(
                ErrorCode::PositionConflict,
                format!("{} positions under {} changed, reload and retry", resource, scope_id),
            )
            .with_detail("scope_id", scope_id),
            StorageError::Io(e) => AppError::internal(e.to_string()),
            other => AppError::database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_storage_error_mapping() {
        let err: AppError = StorageError::SectionNotFound(7).into();
        assert_eq!(err.code, ErrorCode::SectionNotFound);
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);

        let err: AppError = StorageError::ScopeMismatch {
            resource: "item",
            id: 3,
            scope_id: 9,
        }
        .into();
        assert_eq!(err.code, ErrorCode::ScopeMismatch);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);

        let err: AppError = StorageError::PositionConflict {
            resource: "menu",
            scope_id: 4,
        }
        .into();
        assert_eq!(err.code, ErrorCode::PositionConflict);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);

        let err: AppError = StorageError::DuplicateId(1).into();
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }
}
