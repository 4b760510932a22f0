use sea_orm::{Iterable, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::entities::{comment, movie};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Genre {
    #[sea_orm(string_value = "action")]
    Action,
    #[sea_orm(string_value = "adventure")]
    Adventure,
    #[sea_orm(string_value = "animation")]
    Animation,
    #[sea_orm(string_value = "comedy")]
    Comedy,
    #[sea_orm(string_value = "crime")]
    Crime,
    #[sea_orm(string_value = "documentary")]
    Documentary,
    #[sea_orm(string_value = "drama")]
    Drama,
    #[sea_orm(string_value = "family")]
    Family,
    #[sea_orm(string_value = "fantasy")]
    Fantasy,
    #[sea_orm(string_value = "horror")]
    Horror,
    #[sea_orm(string_value = "musical")]
    Musical,
    #[sea_orm(string_value = "mystery")]
    Mystery,
    #[sea_orm(string_value = "romance")]
    Romance,
    #[sea_orm(string_value = "sci_fi")]
    SciFi,
    #[sea_orm(string_value = "thriller")]
    Thriller,
    #[sea_orm(string_value = "war")]
    War,
    #[sea_orm(string_value = "western")]
    Western,
}

impl Genre {
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::iter().find(|g| g.to_value() == slug)
    }

    pub fn slug(self) -> String {
        self.to_value()
    }

    pub fn label(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Family => "Family",
            Genre::Fantasy => "Fantasy",
            Genre::Horror => "Horror",
            Genre::Musical => "Musical",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "Science Fiction",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(64))")]
pub enum City {
    #[default]
    #[sea_orm(string_value = "Sofia")]
    Sofia,
    #[sea_orm(string_value = "Plovdiv")]
    Plovdiv,
    #[sea_orm(string_value = "Varna")]
    Varna,
    #[sea_orm(string_value = "Burgas")]
    Burgas,
    #[sea_orm(string_value = "Ruse")]
    Ruse,
    #[sea_orm(string_value = "Stara Zagora")]
    StaraZagora,
    #[sea_orm(string_value = "Pleven")]
    Pleven,
    #[sea_orm(string_value = "Sliven")]
    Sliven,
    #[sea_orm(string_value = "Dobrich")]
    Dobrich,
    #[sea_orm(string_value = "Shumen")]
    Shumen,
}

impl City {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::iter().find(|c| c.to_value() == name)
    }

    pub fn name(self) -> String {
        self.to_value()
    }
}

/// Storage path for an uploaded file, grouped per owning user.
pub fn upload_path(user_id: Option<i32>, filename: &str) -> String {
    let name = filename.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(filename);
    match user_id {
        Some(id) => format!("uploads/user_{id}/{name}"),
        None => format!("uploads/user_unknown/{name}"),
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Error, message: message.into() }
    }
}

#[derive(Clone, Debug)]
pub struct CommentView {
    pub comment: comment::Model,
    pub username: String,
}

#[derive(Clone, Debug)]
pub struct MovieDetail {
    pub movie: movie::Model,
    pub comments: Vec<CommentView>,
    pub average_rating: Option<f64>,
    pub rating_count: usize,
    pub rated_by_viewer: bool,
}

#[derive(Clone, Debug)]
pub struct RankedMovie {
    pub movie: movie::Model,
    pub rating_count: i64,
}

#[derive(Clone, Debug)]
pub struct GenreShelf {
    pub genre: Genre,
    pub movies: Vec<movie::Model>,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct FavoriteStatus {
    pub status: &'static str,
    pub is_favorite: bool,
}

impl FavoriteStatus {
    pub fn success(is_favorite: bool) -> Self {
        Self { status: "success", is_favorite }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_slugs_resolve() {
        assert_eq!(Genre::from_slug("sci_fi"), Some(Genre::SciFi));
        assert_eq!(Genre::SciFi.slug(), "sci_fi");
        assert_eq!(Genre::from_slug("Sci-Fi"), None);
    }

    #[test]
    fn city_defaults_to_sofia() {
        assert_eq!(City::default(), City::Sofia);
        assert_eq!(City::from_name("Stara Zagora"), Some(City::StaraZagora));
    }

    #[test]
    fn upload_path_keeps_only_file_name() {
        assert_eq!(upload_path(Some(42), "poster.jpg"), "uploads/user_42/poster.jpg");
        assert_eq!(upload_path(None, "../../etc/poster.jpg"), "uploads/user_unknown/poster.jpg");
        assert_eq!(upload_path(Some(1), "C:\\img\\a.png"), "uploads/user_1/a.png");
    }
}
