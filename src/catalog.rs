use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
    sea_query::{Expr, LikeExpr},
};
use tracing::debug;

use crate::{
    entities::{comment, movie, rating, user},
    error::{AppError, AppResult, is_unique_violation},
    forms::{MovieChanges, NewMovie},
    models::{CommentView, Genre, GenreShelf, MovieDetail, RankedMovie, upload_path},
};

/// Size of the most-liked, newest and per-genre shelves.
pub const SHELF_SIZE: u64 = 5;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RateOutcome {
    Created,
    AlreadyRated,
}

#[derive(Clone, Debug)]
pub enum CreateOutcome {
    Created(movie::Model),
    TitleTaken,
}

#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
}

impl Catalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[cfg(test)]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn get(&self, id: i32) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn list(&self, genre: Option<Genre>) -> AppResult<Vec<movie::Model>> {
        let mut query = movie::Entity::find();
        if let Some(genre) = genre {
            query = query.filter(movie::Column::Genre.eq(genre));
        }
        Ok(query.order_by_asc(movie::Column::Title).all(&self.db).await?)
    }

    /// Case-insensitive substring match on title or director.
    pub async fn search(&self, q: &str, genre: Option<Genre>) -> AppResult<Vec<movie::Model>> {
        let q = q.trim();
        let mut query = movie::Entity::find();

        if !q.is_empty() {
            // SQLite LIKE folds ASCII case only; both sides see the same folding.
            let pattern = format!("%{}%", escape_like(q));
            let contains_ci = |col: movie::Column| {
                Expr::col((movie::Entity, col)).like(LikeExpr::new(pattern.clone()).escape('\\'))
            };
            query = query.filter(
                Condition::any()
                    .add(contains_ci(movie::Column::Title))
                    .add(contains_ci(movie::Column::Director)),
            );
        }
        if let Some(genre) = genre {
            query = query.filter(movie::Column::Genre.eq(genre));
        }

        let movies = query.order_by_asc(movie::Column::Title).all(&self.db).await?;
        debug!(query = %q, results = movies.len(), "movie search");
        Ok(movies)
    }

    pub async fn favorites(&self) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find()
            .filter(movie::Column::IsFavorite.eq(true))
            .order_by_asc(movie::Column::Title)
            .all(&self.db)
            .await?)
    }

    /// Flips the favorite flag, returning the new value, or `None` for an
    /// unknown movie.
    pub async fn toggle_favorite(&self, id: i32) -> AppResult<Option<bool>> {
        let Some(movie) = self.get(id).await? else {
            return Ok(None);
        };
        let is_favorite = !movie.is_favorite;
        let mut active: movie::ActiveModel = movie.into();
        active.is_favorite = Set(is_favorite);
        active.update(&self.db).await?;
        debug!(movie_id = id, is_favorite, "toggled favorite");
        Ok(Some(is_favorite))
    }

    /// Movies by descending rating count; ties go to the lower id.
    pub async fn most_liked(&self, limit: u64) -> AppResult<Vec<RankedMovie>> {
        let ranked: Vec<(i32, i64)> = movie::Entity::find()
            .select_only()
            .column(movie::Column::Id)
            .column_as(Expr::col((rating::Entity, rating::Column::Id)).count(), "rating_count")
            .left_join(rating::Entity)
            .group_by(movie::Column::Id)
            .order_by_desc(Expr::col((rating::Entity, rating::Column::Id)).count())
            .order_by_asc(movie::Column::Id)
            .limit(limit)
            .into_tuple()
            .all(&self.db)
            .await?;

        let ids: Vec<i32> = ranked.iter().map(|(id, _)| *id).collect();
        let mut by_id: HashMap<i32, movie::Model> = movie::Entity::find()
            .filter(movie::Column::Id.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        Ok(ranked
            .into_iter()
            .filter_map(|(id, rating_count)| {
                by_id.remove(&id).map(|movie| RankedMovie { movie, rating_count })
            })
            .collect())
    }

    pub async fn newest(&self, limit: u64) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find()
            .order_by_desc(movie::Column::ReleaseDate)
            .order_by_desc(movie::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    /// The most recent movies of every genre that has at least one movie.
    pub async fn by_genre(&self, limit: u64) -> AppResult<Vec<GenreShelf>> {
        let mut present: Vec<Genre> = movie::Entity::find()
            .select_only()
            .column(movie::Column::Genre)
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await?;
        present.sort();

        let shelves = present.into_iter().map(|genre| async move {
            let movies = movie::Entity::find()
                .filter(movie::Column::Genre.eq(genre))
                .order_by_desc(movie::Column::ReleaseDate)
                .order_by_desc(movie::Column::Id)
                .limit(limit)
                .all(&self.db)
                .await?;
            Ok::<_, AppError>(GenreShelf { genre, movies })
        });

        futures::future::try_join_all(shelves).await
    }

    pub async fn detail(&self, id: i32, viewer_id: i32) -> AppResult<Option<MovieDetail>> {
        let Some(movie) = self.get(id).await? else {
            return Ok(None);
        };

        let comments = comment::Entity::find()
            .filter(comment::Column::MovieId.eq(id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .find_also_related(user::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|(comment, author)| CommentView {
                comment,
                username: author.map(|u| u.username).unwrap_or_default(),
            })
            .collect();

        let ratings: Vec<(i32, i32)> = rating::Entity::find()
            .select_only()
            .column(rating::Column::UserId)
            .column(rating::Column::Value)
            .filter(rating::Column::MovieId.eq(id))
            .into_tuple()
            .all(&self.db)
            .await?;

        let values: Vec<i32> = ratings.iter().map(|(_, v)| *v).collect();

        Ok(Some(MovieDetail {
            movie,
            comments,
            average_rating: average(&values),
            rating_count: values.len(),
            rated_by_viewer: ratings.iter().any(|(user_id, _)| *user_id == viewer_id),
        }))
    }

    pub async fn create(&self, owner_id: i32, input: NewMovie) -> AppResult<CreateOutcome> {
        if self.title_taken(&input.title).await? {
            return Ok(CreateOutcome::TitleTaken);
        }

        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(input.title),
            description: Set(input.description),
            release_date: Set(input.release_date.to_string()),
            director: Set(input.director),
            genre: Set(input.genre),
            cover_image: Set(input
                .cover_image
                .map(|name| upload_path(Some(owner_id), &name))
                .unwrap_or_default()),
            is_favorite: Set(false),
            user_id: Set(Some(owner_id)),
        };

        match model.insert(&self.db).await {
            Ok(movie) => {
                debug!(movie_id = movie.id, title = %movie.title, "movie created");
                Ok(CreateOutcome::Created(movie))
            },
            Err(err) if is_unique_violation(&err) => Ok(CreateOutcome::TitleTaken),
            Err(err) => Err(err.into()),
        }
    }

    async fn title_taken(&self, title: &str) -> AppResult<bool> {
        let existing =
            movie::Entity::find().filter(movie::Column::Title.eq(title)).one(&self.db).await?;
        Ok(existing.is_some())
    }

    pub async fn update(&self, id: i32, changes: MovieChanges) -> AppResult<Option<movie::Model>> {
        let Some(movie) = self.get(id).await? else {
            return Ok(None);
        };
        let owner_id = movie.user_id;

        let mut active: movie::ActiveModel = movie.into();
        active.description = Set(changes.description);
        active.release_date = Set(changes.release_date.to_string());
        if let Some(name) = changes.cover_image {
            active.cover_image = Set(upload_path(owner_id, &name));
        }

        Ok(Some(active.update(&self.db).await?))
    }

    /// Ratings and comments go with the movie through the foreign keys.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        debug!(movie_id = id, deleted = res.rows_affected, "movie delete");
        Ok(res.rows_affected > 0)
    }

    /// First rating wins; later attempts by the same user are reported, not
    /// stored.
    pub async fn rate(&self, movie_id: i32, user_id: i32, value: i32) -> AppResult<RateOutcome> {
        let existing = rating::Entity::find()
            .filter(rating::Column::MovieId.eq(movie_id))
            .filter(rating::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Ok(RateOutcome::AlreadyRated);
        }

        let model = rating::ActiveModel {
            id: Default::default(),
            movie_id: Set(movie_id),
            user_id: Set(user_id),
            value: Set(value),
        };

        match model.insert(&self.db).await {
            Ok(_) => Ok(RateOutcome::Created),
            Err(err) if is_unique_violation(&err) => Ok(RateOutcome::AlreadyRated),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn add_comment(
        &self,
        movie_id: i32,
        user_id: i32,
        text: String,
    ) -> AppResult<comment::Model> {
        let model = comment::ActiveModel {
            id: Default::default(),
            movie_id: Set(movie_id),
            user_id: Set(user_id),
            text: Set(text),
            created_at: Set(jiff::Timestamp::now().as_second()),
        };
        Ok(model.insert(&self.db).await?)
    }
}

fn average(values: &[i32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    Some(sum as f64 / values.len() as f64)
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
