use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(string_len_uniq(Movie::Title, 255))
                    .col(text(Movie::Description).default(""))
                    .col(string_len(Movie::ReleaseDate, 10))
                    .col(string_len(Movie::Director, 255))
                    .col(string_len(Movie::Genre, 20))
                    .col(string(Movie::CoverImage).default(""))
                    .col(boolean(Movie::IsFavorite).default(false))
                    .col(integer_null(Movie::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_user")
                            .from(Movie::Table, Movie::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_title_director_genre")
                    .table(Movie::Table)
                    .col(Movie::Title)
                    .col(Movie::Director)
                    .col(Movie::Genre)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_release_date")
                    .table(Movie::Table)
                    .col(Movie::ReleaseDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rating::Table)
                    .if_not_exists()
                    .col(pk_auto(Rating::Id))
                    .col(integer(Rating::MovieId))
                    .col(integer(Rating::UserId))
                    .col(integer(Rating::Value))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_movie")
                            .from(Rating::Table, Rating::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_user")
                            .from(Rating::Table, Rating::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(pk_auto(Comment::Id))
                    .col(integer(Comment::MovieId))
                    .col(integer(Comment::UserId))
                    .col(text(Comment::Text))
                    .col(big_integer(Comment::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_movie")
                            .from(Comment::Table, Comment::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_user")
                            .from(Comment::Table, Comment::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_movie")
                    .table(Comment::Table)
                    .col(Comment::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Comment::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Rating::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Title,
    Description,
    ReleaseDate,
    Director,
    Genre,
    CoverImage,
    IsFavorite,
    UserId,
}

#[derive(DeriveIden)]
enum Rating {
    Table,
    Id,
    MovieId,
    UserId,
    Value,
}

#[derive(DeriveIden)]
enum Comment {
    Table,
    Id,
    MovieId,
    UserId,
    Text,
    CreatedAt,
}
