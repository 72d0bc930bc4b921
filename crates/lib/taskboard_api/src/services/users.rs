//! User directory and profile edits.

use taskboard_core::models::auth::{User, UserSummary};
use taskboard_core::store::{NICKNAME_TAKEN, Store};
use taskboard_core::validation::Validator;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{MessageResponse, UpdateNicknameRequest};

/// Every user except the caller.
pub async fn list_other_users(store: &dyn Store, user: &User) -> AppResult<Vec<UserSummary>> {
    Ok(store.list_users_except(&[user.id]).await?)
}

/// Change the caller's nickname. Keeping the current nickname is a no-op.
pub async fn update_nickname(
    store: &dyn Store,
    user: &User,
    req: &UpdateNicknameRequest,
) -> AppResult<MessageResponse> {
    let nickname = req.nickname.trim();

    let mut v = Validator::new();
    v.nickname("nickname", nickname);
    v.finish()?;

    if nickname != user.nickname {
        if store.nickname_exists(nickname).await? {
            return Err(AppError::Conflict(NICKNAME_TAKEN.into()));
        }
        store.update_nickname(user.id, nickname).await?;
        info!(user_id = %user.id, "nickname changed");
    }

    Ok(MessageResponse {
        message: "Nickname updated".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::store::IdentityStore;
    use taskboard_core::store::memory::MemoryStore;

    #[tokio::test]
    async fn nickname_change_checks_uniqueness() {
        let store = MemoryStore::new();
        let alice = store.create_user("a@x.co", "alice", "h").await.unwrap();
        store.create_user("b@x.co", "bob", "h").await.unwrap();

        let taken = UpdateNicknameRequest {
            nickname: "bob".into(),
        };
        let err = update_nickname(&store, &alice, &taken).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let same = UpdateNicknameRequest {
            nickname: "alice".into(),
        };
        assert!(update_nickname(&store, &alice, &same).await.is_ok());

        let fresh = UpdateNicknameRequest {
            nickname: "alice_2".into(),
        };
        update_nickname(&store, &alice, &fresh).await.unwrap();
        let found = store.find_user_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(found.nickname, "alice_2");
    }

    #[tokio::test]
    async fn directory_excludes_caller() {
        let store = MemoryStore::new();
        let alice = store.create_user("a@x.co", "alice", "h").await.unwrap();
        store.create_user("b@x.co", "bob", "h").await.unwrap();

        let others = list_other_users(&store, &alice).await.unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].nickname, "bob");
    }
}
