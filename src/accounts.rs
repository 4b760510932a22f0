use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::{
    entities::{location_user, user, user_profile},
    error::{AppResult, is_unique_violation},
    forms::{ProfileUpdate, Registration},
    models::upload_path,
};

#[derive(Clone, Debug)]
pub enum RegisterOutcome {
    Registered(user::Model),
    UsernameTaken,
}

#[derive(Clone, Debug)]
pub struct Profile {
    pub profile: user_profile::Model,
    pub location: Option<location_user::Model>,
}

#[derive(Clone)]
pub struct Accounts {
    db: DatabaseConnection,
}

impl Accounts {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[cfg(test)]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn find_user(&self, id: i32) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    /// Creates the user together with an empty profile.
    pub async fn register(&self, registration: Registration) -> AppResult<RegisterOutcome> {
        if self.find_by_username(&registration.username).await?.is_some() {
            return Ok(RegisterOutcome::UsernameTaken);
        }

        let password_hash = hash_password(registration.password).await?;

        let txn = self.db.begin().await?;

        let inserted = user::ActiveModel {
            id: Default::default(),
            username: Set(registration.username),
            password_hash: Set(password_hash),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            email: Set(String::new()),
            date_joined: Set(jiff::Timestamp::now().as_second()),
        }
        .insert(&txn)
        .await;

        let user = match inserted {
            Ok(user) => user,
            Err(err) if is_unique_violation(&err) => return Ok(RegisterOutcome::UsernameTaken),
            Err(err) => return Err(err.into()),
        };

        ensure_profile(&txn, user.id).await?;
        txn.commit().await?;

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(RegisterOutcome::Registered(user))
    }

    /// Returns the user when the password matches.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Option<user::Model>> {
        let Some(user) = self.find_by_username(username.trim()).await? else {
            debug!(username = %username, "login for unknown user");
            return Ok(None);
        };

        if verify_password(password.to_string(), user.password_hash.clone()).await? {
            Ok(Some(user))
        } else {
            debug!(user_id = user.id, "password mismatch");
            Ok(None)
        }
    }

    /// Loads the profile, creating it when the user predates it.
    pub async fn profile(&self, user_id: i32) -> AppResult<Profile> {
        let profile = ensure_profile(&self.db, user_id).await?;
        let location = match profile.location_id {
            Some(id) => location_user::Entity::find_by_id(id).one(&self.db).await?,
            None => None,
        };
        Ok(Profile { profile, location })
    }

    /// Persists identity, contact and location changes in one transaction.
    pub async fn update_profile(&self, user: &user::Model, update: ProfileUpdate) -> AppResult<()> {
        let ProfileUpdate { identity, contact, location } = update;
        let txn = self.db.begin().await?;

        let mut account: user::ActiveModel = user.clone().into();
        account.first_name = Set(identity.first_name);
        account.last_name = Set(identity.last_name);
        account.email = Set(identity.email);
        account.update(&txn).await?;

        let profile = ensure_profile(&txn, user.id).await?;

        let existing = match profile.location_id {
            Some(id) => location_user::Entity::find_by_id(id).one(&txn).await?,
            None => None,
        };
        let location_id = match existing {
            Some(row) => {
                let mut active: location_user::ActiveModel = row.into();
                active.address_1 = Set(location.address_1);
                active.address_2 = Set(location.address_2);
                active.city = Set(location.city);
                active.update(&txn).await?.id
            },
            None => {
                location_user::ActiveModel {
                    id: Default::default(),
                    address_1: Set(location.address_1),
                    address_2: Set(location.address_2),
                    city: Set(location.city),
                }
                .insert(&txn)
                .await?
                .id
            },
        };

        let mut active: user_profile::ActiveModel = profile.into();
        active.phone_number = Set(contact.phone_number);
        if let Some(photo) = contact.photo_profile {
            active.photo_profile = Set(upload_path(Some(user.id), &photo));
        }
        active.location_id = Set(Some(location_id));
        active.update(&txn).await?;

        txn.commit().await?;
        debug!(user_id = user.id, location_id, "profile updated");
        Ok(())
    }
}

async fn ensure_profile<C: ConnectionTrait>(conn: &C, user_id: i32) -> AppResult<user_profile::Model> {
    let existing = user_profile::Entity::find()
        .filter(user_profile::Column::UserId.eq(user_id))
        .one(conn)
        .await?;
    if let Some(profile) = existing {
        return Ok(profile);
    }

    let profile = user_profile::ActiveModel {
        id: Default::default(),
        user_id: Set(user_id),
        phone_number: Set(String::new()),
        photo_profile: Set(String::new()),
        location_id: Set(None),
    }
    .insert(conn)
    .await?;
    Ok(profile)
}

async fn hash_password(password: String) -> AppResult<String> {
    let hash = tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default().hash_password(password.as_bytes(), &salt).map(|h| h.to_string())
    })
    .await
    .map_err(anyhow::Error::new)??;
    Ok(hash)
}

async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    let ok = tokio::task::spawn_blocking(move || {
        PasswordHash::new(&hash)
            .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
            .unwrap_or(false)
    })
    .await
    .map_err(anyhow::Error::new)?;
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use sea_orm::PaginatorTrait;

    use super::*;
    use crate::{
        forms::{Contact, Identity, Location},
        models::City,
        test_support::{insert_user, memory_db},
    };

    fn registration(username: &str) -> Registration {
        Registration { username: username.to_string(), password: "testpassword".to_string() }
    }

    fn profile_update(address: &str) -> ProfileUpdate {
        ProfileUpdate {
            identity: Identity {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "newemail@example.com".into(),
            },
            contact: Contact { phone_number: "1234567890".into(), photo_profile: Some("me.png".into()) },
            location: Location { address_1: address.into(), address_2: String::new(), city: City::Varna },
        }
    }

    #[tokio::test]
    async fn register_creates_user_and_profile() {
        let accounts = Accounts::new(memory_db().await);

        let RegisterOutcome::Registered(user) = accounts.register(registration("newuser")).await.unwrap()
        else {
            panic!("expected registration");
        };
        assert_ne!(user.password_hash, "testpassword");
        assert_eq!(user_profile::Entity::find().count(accounts.db()).await.unwrap(), 1);

        assert!(matches!(
            accounts.register(registration("newuser")).await.unwrap(),
            RegisterOutcome::UsernameTaken
        ));
        assert_eq!(user::Entity::find().count(accounts.db()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let accounts = Accounts::new(memory_db().await);
        accounts.register(registration("testuser")).await.unwrap();

        let user = accounts.authenticate("testuser", "testpassword").await.unwrap();
        assert_eq!(user.map(|u| u.username).as_deref(), Some("testuser"));
        assert!(accounts.authenticate("testuser", "wrong").await.unwrap().is_none());
        assert!(accounts.authenticate("nobody", "testpassword").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_is_created_on_demand() {
        let accounts = Accounts::new(memory_db().await);
        let user = user::ActiveModel {
            id: Default::default(),
            username: Set("legacy".into()),
            password_hash: Set("!".into()),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            email: Set(String::new()),
            date_joined: Set(0),
        }
        .insert(accounts.db())
        .await
        .unwrap();

        let profile = accounts.profile(user.id).await.unwrap();
        assert_eq!(profile.profile.user_id, user.id);
        assert!(profile.location.is_none());
        let again = accounts.profile(user.id).await.unwrap();
        assert_eq!(again.profile.id, profile.profile.id);
    }

    #[tokio::test]
    async fn update_profile_persists_all_three_parts() {
        let accounts = Accounts::new(memory_db().await);
        let user = insert_user(accounts.db(), "testuser").await;

        accounts.update_profile(&user, profile_update("Street 1")).await.unwrap();

        let stored = accounts.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "newemail@example.com");
        assert_eq!(stored.first_name, "Ada");

        let profile = accounts.profile(user.id).await.unwrap();
        assert_eq!(profile.profile.phone_number, "1234567890");
        assert_eq!(profile.profile.photo_profile, format!("uploads/user_{}/me.png", user.id));
        let location = profile.location.unwrap();
        assert_eq!(location.address_1, "Street 1");
        assert_eq!(location.city, City::Varna);

        accounts.update_profile(&stored, profile_update("Street 2")).await.unwrap();
        let profile = accounts.profile(user.id).await.unwrap();
        assert_eq!(profile.location.as_ref().map(|l| l.id), Some(location.id));
        assert_eq!(profile.location.unwrap().address_1, "Street 2");
        assert_eq!(location_user::Entity::find().count(accounts.db()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn password_hash_round_trips() {
        let hash = hash_password("s3cret-pass".into()).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret-pass".into(), hash.clone()).await.unwrap());
        assert!(!verify_password("other".into(), hash).await.unwrap());
        assert!(!verify_password("x".into(), "!".into()).await.unwrap());
    }
}
