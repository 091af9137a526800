use crate::error::Error;
use crate::{users, Id};
use sea_orm::DatabaseConnection;

pub use entity_api::user::{
    create, delete, find_all, find_by_cooperative, find_by_email, find_by_id, find_by_role,
    update, update_role, verify_password, AuthSession, Backend, Credentials, Role,
};

/// Users matching the optional role and cooperative filters.
pub async fn find_by(
    db: &DatabaseConnection,
    role: Option<Role>,
    cooperative_id: Option<Id>,
) -> Result<Vec<users::Model>, Error> {
    let users = match (role, cooperative_id) {
        (Some(role), cooperative_id) => find_by_role(db, role)
            .await?
            .into_iter()
            .filter(|user| cooperative_id.is_none() || user.cooperative_id == cooperative_id)
            .collect(),
        (None, Some(cooperative_id)) => find_by_cooperative(db, cooperative_id).await?,
        (None, None) => find_all(db).await?,
    };

    Ok(users)
}

/// Registering as an admin is reserved to existing admins.
pub async fn register(db: &DatabaseConnection, user: users::Model) -> Result<users::Model, Error> {
    if user.role == Role::Admin {
        return Err(Error::forbidden("admins cannot self-register"));
    }
    if find_by_email(db, &user.email).await?.is_some() {
        return Err(Error::conflict("email is already registered"));
    }
    Ok(create(db, user).await?)
}

pub fn ensure_self_or_admin(actor: &users::Model, user_id: Id) -> Result<(), Error> {
    if actor.id == user_id || actor.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden("only the user or an admin may do this"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role) -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Id::new_v4(),
            email: "koffi@cashew.market".to_owned(),
            first_name: "Koffi".to_owned(),
            last_name: "Yao".to_owned(),
            display_name: None,
            phone: None,
            password: String::new(),
            role,
            cooperative_id: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn self_or_admin_allows_the_user_and_admins_only() {
        let producer = user(Role::Producer);
        let admin = user(Role::Admin);
        let other = Id::new_v4();

        assert!(ensure_self_or_admin(&producer, producer.id).is_ok());
        assert!(ensure_self_or_admin(&admin, other).is_ok());
        assert!(ensure_self_or_admin(&producer, other).is_err());
    }
}
