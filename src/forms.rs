use jiff::civil::Date;
use serde::Deserialize;

use crate::models::{City, Genre};

/// Per-field validation messages, in field order.
#[derive(Clone, Debug, Default)]
pub struct FieldErrors(Vec<(&'static str, String)>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.iter().find(|(f, _)| *f == field).map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn merge(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

const REQUIRED: &str = "This field is required.";

fn required<'a>(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &'a str,
    max_len: usize,
) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else {
        max_length(errors, field, value, max_len);
    }
    value
}

fn max_length(errors: &mut FieldErrors, field: &'static str, value: &str, max_len: usize) {
    let len = value.chars().count();
    if len > max_len {
        errors.add(
            field,
            format!("Ensure this value has at most {max_len} characters (it has {len})."),
        );
    }
}

fn parse_date(errors: &mut FieldErrors, field: &'static str, value: &str) -> Option<Date> {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    match value.parse::<Date>() {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Enter a valid date (YYYY-MM-DD).");
            None
        },
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MovieForm {
    pub title: String,
    pub description: String,
    pub release_date: String,
    pub director: String,
    pub genre: String,
    pub cover_image: String,
}

#[derive(Clone, Debug)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub release_date: Date,
    pub director: String,
    pub genre: Genre,
    pub cover_image: Option<String>,
}

impl MovieForm {
    pub fn validate(&self) -> Result<NewMovie, FieldErrors> {
        let mut errors = FieldErrors::default();

        let title = required(&mut errors, "title", &self.title, 255).to_string();
        let release_date = parse_date(&mut errors, "release_date", &self.release_date);
        let director = required(&mut errors, "director", &self.director, 255).to_string();
        let genre = match self.genre.trim() {
            "" => {
                errors.add("genre", REQUIRED);
                None
            },
            slug => {
                let genre = Genre::from_slug(slug);
                if genre.is_none() {
                    errors.add(
                        "genre",
                        format!("Select a valid choice. {slug} is not one of the available choices."),
                    );
                }
                genre
            },
        };

        match (release_date, genre) {
            (Some(release_date), Some(genre)) => errors.finish(|| NewMovie {
                title,
                description: self.description.trim().to_string(),
                release_date,
                director,
                genre,
                cover_image: optional(&self.cover_image),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MovieUpdateForm {
    pub description: String,
    pub release_date: String,
    pub cover_image: String,
}

#[derive(Clone, Debug)]
pub struct MovieChanges {
    pub description: String,
    pub release_date: Date,
    pub cover_image: Option<String>,
}

impl MovieUpdateForm {
    pub fn validate(&self) -> Result<MovieChanges, FieldErrors> {
        let mut errors = FieldErrors::default();
        let Some(release_date) = parse_date(&mut errors, "release_date", &self.release_date) else {
            return Err(errors);
        };
        Ok(MovieChanges {
            description: self.description.trim().to_string(),
            release_date,
            cover_image: optional(&self.cover_image),
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RatingForm {
    pub value: String,
}

pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

impl RatingForm {
    pub fn validate(&self) -> Result<i32, FieldErrors> {
        let mut errors = FieldErrors::default();
        match self.value.trim().parse::<i32>() {
            Ok(v) if RATING_RANGE.contains(&v) => return Ok(v),
            Ok(_) => errors.add(
                "value",
                format!(
                    "Rating must be between {} and {}.",
                    RATING_RANGE.start(),
                    RATING_RANGE.end()
                ),
            ),
            Err(_) if self.value.trim().is_empty() => errors.add("value", REQUIRED),
            Err(_) => errors.add("value", "Enter a whole number."),
        }
        Err(errors)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::default();
        let text = required(&mut errors, "text", &self.text, usize::MAX).to_string();
        errors.finish(|| text)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Clone, Debug)]
pub struct Registration {
    pub username: String,
    pub password: String,
}

fn valid_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::default();

        let username = required(&mut errors, "username", &self.username, 150).to_string();
        if !username.is_empty() && !username.chars().all(valid_username_char) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        } else if self.password1.chars().count() < 8 {
            errors.add(
                "password1",
                "This password is too short. It must contain at least 8 characters.",
            );
        } else if self.password1.chars().all(|c| c.is_ascii_digit()) {
            errors.add("password1", "This password is entirely numeric.");
        }

        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        errors.finish(|| Registration { username, password: self.password1.clone() })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

/// The profile page posts identity, contact and location fields together.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub photo_profile: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contact {
    pub phone_number: String,
    pub photo_profile: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub address_1: String,
    pub address_2: String,
    pub city: City,
}

#[derive(Clone, Debug)]
pub struct ProfileUpdate {
    pub identity: Identity,
    pub contact: Contact,
    pub location: Location,
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
}

impl ProfileForm {
    pub fn identity(&self) -> Result<Identity, FieldErrors> {
        let mut errors = FieldErrors::default();
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        let email = self.email.trim().to_string();
        max_length(&mut errors, "first_name", &first_name, 150);
        max_length(&mut errors, "last_name", &last_name, 150);
        if !email.is_empty() && !looks_like_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }
        errors.finish(|| Identity { first_name, last_name, email })
    }

    pub fn contact(&self) -> Result<Contact, FieldErrors> {
        let mut errors = FieldErrors::default();
        let phone_number = self.phone_number.trim().to_string();
        max_length(&mut errors, "phone_number", &phone_number, 10);
        errors.finish(|| Contact { phone_number, photo_profile: optional(&self.photo_profile) })
    }

    pub fn location(&self) -> Result<Location, FieldErrors> {
        let mut errors = FieldErrors::default();
        let address_1 = required(&mut errors, "address_1", &self.address_1, 128).to_string();
        let address_2 = self.address_2.trim().to_string();
        max_length(&mut errors, "address_2", &address_2, 128);
        let city = City::from_name(self.city.trim());
        if city.is_none() {
            errors.add("city", "Select a valid choice.");
        }
        match city {
            Some(city) => errors.finish(|| Location { address_1, address_2, city }),
            None => Err(errors),
        }
    }

    /// All three sub-forms must validate; errors from every failing one are
    /// reported together.
    pub fn validate(&self) -> Result<ProfileUpdate, FieldErrors> {
        match (self.identity(), self.contact(), self.location()) {
            (Ok(identity), Ok(contact), Ok(location)) => {
                Ok(ProfileUpdate { identity, contact, location })
            },
            (identity, contact, location) => {
                let mut errors = FieldErrors::default();
                for e in [identity.err(), contact.err(), location.err()].into_iter().flatten() {
                    errors.merge(e);
                }
                Err(errors)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_form() -> MovieForm {
        MovieForm {
            title: "Heat".into(),
            description: "".into(),
            release_date: "1995-12-15".into(),
            director: "Michael Mann".into(),
            genre: "crime".into(),
            cover_image: "".into(),
        }
    }

    #[test]
    fn movie_form_accepts_valid_input() {
        let movie = movie_form().validate().unwrap();
        assert_eq!(movie.title, "Heat");
        assert_eq!(movie.genre, Genre::Crime);
        assert_eq!(movie.release_date, jiff::civil::date(1995, 12, 15));
        assert_eq!(movie.cover_image, None);
    }

    #[test]
    fn movie_form_reports_each_bad_field() {
        let form = MovieForm {
            title: "  ".into(),
            release_date: "15/12/1995".into(),
            genre: "noir".into(),
            ..movie_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("title"), Some(REQUIRED));
        assert!(errors.get("release_date").is_some());
        assert!(errors.get("genre").unwrap().contains("noir"));
        assert!(errors.get("director").is_none());
    }

    #[test]
    fn rating_must_be_in_range() {
        assert_eq!(RatingForm { value: "10".into() }.validate().unwrap(), 10);
        assert!(RatingForm { value: "0".into() }.validate().is_err());
        assert!(RatingForm { value: "11".into() }.validate().is_err());
        assert!(RatingForm { value: "five".into() }.validate().is_err());
    }

    #[test]
    fn blank_comment_is_rejected() {
        assert!(CommentForm { text: " \n".into() }.validate().is_err());
        assert_eq!(CommentForm { text: " nice ".into() }.validate().unwrap(), "nice");
    }

    #[test]
    fn register_form_checks_passwords() {
        let form = RegisterForm {
            username: "new user".into(),
            password1: "12345678".into(),
            password2: "87654321".into(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.get("username").is_some());
        assert_eq!(errors.get("password1"), Some("This password is entirely numeric."));
        assert!(errors.get("password2").is_some());

        let ok = RegisterForm {
            username: "newuser".into(),
            password1: "newpassword".into(),
            password2: "newpassword".into(),
        };
        assert_eq!(ok.validate().unwrap().username, "newuser");
    }

    #[test]
    fn profile_form_is_all_or_nothing() {
        let mut form = ProfileForm {
            email: "newemail@example.com".into(),
            phone_number: "1234567890".into(),
            address_1: "Street 1".into(),
            city: "Sofia".into(),
            ..Default::default()
        };
        let update = form.validate().unwrap();
        assert_eq!(update.location.city, City::Sofia);
        assert_eq!(update.contact.phone_number, "1234567890");

        form.phone_number = "12345678901".into();
        form.address_1 = "".into();
        let errors = form.validate().unwrap_err();
        assert!(errors.get("phone_number").is_some());
        assert_eq!(errors.get("address_1"), Some(REQUIRED));
        assert!(form.identity().is_ok());
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a b@c.de"));
    }
}
