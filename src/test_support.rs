use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::{
    entities::{movie, user, user_profile},
    models::Genre,
};

pub async fn memory_db() -> DatabaseConnection {
    crate::db::connect_and_migrate("sqlite::memory:").await.unwrap()
}

/// Inserts a user with an unusable password hash; use `Accounts::register`
/// when a test needs to log in.
pub async fn insert_user(db: &DatabaseConnection, username: &str) -> user::Model {
    let user = user::ActiveModel {
        id: Default::default(),
        username: Set(username.to_string()),
        password_hash: Set("!".to_string()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        email: Set(String::new()),
        date_joined: Set(0),
    }
    .insert(db)
    .await
    .unwrap();

    user_profile::ActiveModel {
        id: Default::default(),
        user_id: Set(user.id),
        phone_number: Set(String::new()),
        photo_profile: Set(String::new()),
        location_id: Set(None),
    }
    .insert(db)
    .await
    .unwrap();

    user
}

pub async fn insert_movie(
    db: &DatabaseConnection,
    title: &str,
    director: &str,
    genre: Genre,
    release_date: &str,
) -> movie::Model {
    movie::ActiveModel {
        id: Default::default(),
        title: Set(title.to_string()),
        description: Set(String::new()),
        release_date: Set(release_date.to_string()),
        director: Set(director.to_string()),
        genre: Set(genre),
        cover_image: Set(String::new()),
        is_favorite: Set(false),
        user_id: Set(None),
    }
    .insert(db)
    .await
    .unwrap()
}
