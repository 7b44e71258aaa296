//! Integration tests for the SQLite store.
//!
//! These run against a real database file in a temp directory - no mocks.

use movies_domain::{
    Actor, ActorCriteria, ActorId, ActorRepository, Genre, LinkRepository, Movie, MovieCriteria,
    MovieId, MovieOrder, MovieRepository, OrderDir, Rating, ReleaseYear,
};
use movies_db::{
    MoviesDb, SqliteActorRepository, SqliteLinkRepository, SqliteMovieRepository, StoreConfig,
};
use tempfile::TempDir;

async fn open_store() -> (TempDir, MoviesDb) {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::for_path(dir.path().join("movies.sqlite"));
    let db = MoviesDb::connect(&config).await.unwrap();
    db.migrate().await.unwrap();
    (dir, db)
}

fn movie(title: &str, director: &str, year: i32, rating: Option<f64>, genres: &[&str]) -> Movie {
    let mut m = Movie::new(title, director, ReleaseYear::new(year).unwrap()).unwrap();
    m.set_rating(rating.map(|r| Rating::new(r).unwrap()));
    m.set_genres(genres.iter().map(|g| Genre::new(*g).unwrap()).collect())
        .unwrap();
    m
}

#[tokio::test]
async fn test_insert_assigns_id_and_round_trips() {
    let (_dir, db) = open_store().await;
    let movies = SqliteMovieRepository::new(db.pool().clone());

    let saved = movies
        .save(movie(
            "The Matrix",
            "The Wachowskis",
            1999,
            Some(8.7),
            &["Action", "Sci-Fi"],
        ))
        .await
        .unwrap();
    assert!(!saved.id().is_zero());

    let loaded = movies.find_by_id(saved.id()).await.unwrap();
    assert_eq!(loaded.title(), "The Matrix");
    assert_eq!(loaded.director(), "The Wachowskis");
    assert_eq!(loaded.year().value(), 1999);
    assert_eq!(loaded.rating().unwrap().value(), 8.7);
    let genres: Vec<_> = loaded.genres().iter().map(|g| g.as_str()).collect();
    assert_eq!(genres, vec!["Action", "Sci-Fi"]);
    assert!(loaded.updated_at() >= loaded.created_at());
}

#[tokio::test]
async fn test_update_existing_and_missing() {
    let (_dir, db) = open_store().await;
    let movies = SqliteMovieRepository::new(db.pool().clone());

    let mut saved = movies
        .save(movie("Alien", "Ridley Scott", 1979, Some(8.5), &["Horror"]))
        .await
        .unwrap();
    saved.set_rating(Some(Rating::new(8.6).unwrap()));
    let updated = movies.save(saved).await.unwrap();
    let loaded = movies.find_by_id(updated.id()).await.unwrap();
    assert_eq!(loaded.rating().unwrap().value(), 8.6);

    // Updating a row that was deleted under us reports NotFound.
    movies.delete(updated.id()).await.unwrap();
    let mut ghost = movie("Alien", "Ridley Scott", 1979, None, &[]);
    ghost.assign_id(updated.id()).unwrap();
    assert!(movies.save(ghost).await.is_err());
}

#[tokio::test]
async fn test_delete_missing_is_not_found() {
    let (_dir, db) = open_store().await;
    let movies = SqliteMovieRepository::new(db.pool().clone());
    let err = movies.delete(MovieId::new(999).unwrap()).await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn test_criteria_conjunctive_and_counted() {
    let (_dir, db) = open_store().await;
    let movies = SqliteMovieRepository::new(db.pool().clone());

    for (title, year, rating, genres) in [
        ("Heat", 1995, Some(8.3), vec!["Crime", "Drama"]),
        ("Casino", 1995, Some(8.2), vec!["Crime", "Drama"]),
        ("Toy Story", 1995, Some(8.3), vec!["Animation"]),
        ("Magnolia", 1999, Some(8.0), vec!["Drama"]),
    ] {
        movies
            .save(movie(title, "Someone", year, rating, &genres))
            .await
            .unwrap();
    }

    let criteria = MovieCriteria {
        genre: Some("Drama".to_string()),
        min_year: Some(1995),
        max_year: Some(1995),
        ..MovieCriteria::all()
    }
    .normalized();

    let found = movies.find_by_criteria(&criteria).await.unwrap();
    let titles: Vec<_> = found.iter().map(|m| m.title()).collect();
    assert_eq!(titles, vec!["Casino", "Heat"]);
    assert_eq!(movies.count_by_criteria(&criteria).await.unwrap(), 2);

    // Substring title match is case-insensitive.
    let criteria = MovieCriteria {
        title: Some("sto".to_string()),
        ..MovieCriteria::all()
    }
    .normalized();
    let found = movies.find_by_criteria(&criteria).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title(), "Toy Story");

    assert_eq!(movies.count_all().await.unwrap(), 4);
}

#[tokio::test]
async fn test_offset_beyond_count_returns_empty_page() {
    let (_dir, db) = open_store().await;
    let movies = SqliteMovieRepository::new(db.pool().clone());
    movies
        .save(movie("Heat", "Michael Mann", 1995, Some(8.3), &["Crime"]))
        .await
        .unwrap();

    let criteria = MovieCriteria {
        offset: 50,
        ..MovieCriteria::all()
    }
    .normalized();
    assert!(movies.find_by_criteria(&criteria).await.unwrap().is_empty());
    assert_eq!(movies.count_by_criteria(&criteria).await.unwrap(), 1);
}

#[tokio::test]
async fn test_top_rated_excludes_unrated_and_breaks_ties_by_title() {
    let (_dir, db) = open_store().await;
    let movies = SqliteMovieRepository::new(db.pool().clone());

    for (title, rating) in [
        ("Zodiac", Some(7.7)),
        ("Arrival", Some(7.9)),
        ("Arcadia", Some(7.9)),
        ("Unrated Cut", None),
    ] {
        movies
            .save(movie(title, "Someone", 2007, rating, &[]))
            .await
            .unwrap();
    }

    let top = movies.find_top_rated(10).await.unwrap();
    let titles: Vec<_> = top.iter().map(|m| m.title()).collect();
    assert_eq!(titles, vec!["Arcadia", "Arrival", "Zodiac"]);
}

#[tokio::test]
async fn test_find_by_director_is_exact_and_chronological() {
    let (_dir, db) = open_store().await;
    let movies = SqliteMovieRepository::new(db.pool().clone());

    // "Lee" is a substring of other directors' names; only the exact,
    // case-sensitive rows may come back.
    for (title, director, year) in [
        ("Late Film", "Lee", 2005),
        ("Early Film", "Lee", 1999),
        ("Do the Right Thing", "Spike Lee", 1989),
        ("Life of Pi", "Ang Lee", 2012),
        ("Lowercase", "lee", 2002),
    ] {
        movies
            .save(movie(title, director, year, None, &[]))
            .await
            .unwrap();
    }

    let films = movies.find_by_director("Lee", 100).await.unwrap();
    let titles: Vec<_> = films.iter().map(|m| m.title()).collect();
    assert_eq!(titles, vec!["Early Film", "Late Film"]);

    // The cap bounds the exact-match result itself.
    let films = movies.find_by_director("Lee", 1).await.unwrap();
    assert_eq!(films.len(), 1);
    assert_eq!(films[0].title(), "Early Film");

    assert!(movies.find_by_director("Unknown", 100).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rating_order_desc() {
    let (_dir, db) = open_store().await;
    let movies = SqliteMovieRepository::new(db.pool().clone());
    for (title, rating) in [("A", Some(6.0)), ("B", Some(9.0)), ("C", Some(7.5))] {
        movies
            .save(movie(title, "D", 2000, rating, &[]))
            .await
            .unwrap();
    }
    let criteria = MovieCriteria {
        order_by: MovieOrder::Rating,
        order_dir: OrderDir::Desc,
        ..MovieCriteria::all()
    }
    .normalized();
    let found = movies.find_by_criteria(&criteria).await.unwrap();
    let titles: Vec<_> = found.iter().map(|m| m.title()).collect();
    assert_eq!(titles, vec!["B", "C", "A"]);
}

#[tokio::test]
async fn test_link_lifecycle_and_cascade() {
    let (_dir, db) = open_store().await;
    let movies = SqliteMovieRepository::new(db.pool().clone());
    let actors = SqliteActorRepository::new(db.pool().clone());
    let links = SqliteLinkRepository::new(db.pool().clone());

    let m = movies
        .save(movie("The Matrix", "The Wachowskis", 1999, Some(8.7), &[]))
        .await
        .unwrap();
    let a = actors
        .save(Actor::new("Keanu Reeves", None).unwrap())
        .await
        .unwrap();

    links.link(m.id(), a.id()).await.unwrap();

    // Duplicate link is a conflict.
    let err = links.link(m.id(), a.id()).await.unwrap_err();
    assert_eq!(err.kind(), "conflict");

    let cast = actors.find_by_movie(m.id()).await.unwrap();
    assert_eq!(cast.len(), 1);
    assert_eq!(cast[0].name(), "Keanu Reeves");

    let filmography = links.list_by_actor(a.id()).await.unwrap();
    assert_eq!(filmography, vec![m.id()]);

    // Deleting the movie cascades to the link table.
    movies.delete(m.id()).await.unwrap();
    assert!(links.list_by_actor(a.id()).await.unwrap().is_empty());
    let rehydrated = actors.find_by_id(a.id()).await.unwrap();
    assert!(rehydrated.movie_ids().is_empty());
}

#[tokio::test]
async fn test_link_missing_sides() {
    let (_dir, db) = open_store().await;
    let movies = SqliteMovieRepository::new(db.pool().clone());
    let links = SqliteLinkRepository::new(db.pool().clone());

    let m = movies
        .save(movie("Heat", "Michael Mann", 1995, None, &[]))
        .await
        .unwrap();

    let err = links
        .link(m.id(), ActorId::new(999).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");

    let err = links
        .unlink(MovieId::new(999).unwrap(), ActorId::new(999).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");

    // Both sides exist but no link: still NotFound.
    let actors = SqliteActorRepository::new(db.pool().clone());
    let a = actors
        .save(Actor::new("Al Pacino", None).unwrap())
        .await
        .unwrap();
    let err = links.unlink(m.id(), a.id()).await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn test_actor_search_by_movie() {
    let (_dir, db) = open_store().await;
    let movies = SqliteMovieRepository::new(db.pool().clone());
    let actors = SqliteActorRepository::new(db.pool().clone());
    let links = SqliteLinkRepository::new(db.pool().clone());

    let m = movies
        .save(movie("Heat", "Michael Mann", 1995, None, &[]))
        .await
        .unwrap();
    let a1 = actors
        .save(Actor::new("Al Pacino", None).unwrap())
        .await
        .unwrap();
    let _a2 = actors
        .save(Actor::new("Robert De Niro", None).unwrap())
        .await
        .unwrap();
    links.link(m.id(), a1.id()).await.unwrap();

    let criteria = ActorCriteria {
        movie_id: Some(m.id().value()),
        limit: 20,
        ..Default::default()
    }
    .normalized();
    let found = actors.find_by_criteria(&criteria).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), "Al Pacino");
    assert!(found[0].movie_ids().contains(&m.id()));

    assert_eq!(actors.count_all().await.unwrap(), 2);
}

#[tokio::test]
async fn test_stats_and_genre_histogram() {
    let (_dir, db) = open_store().await;
    let movies = SqliteMovieRepository::new(db.pool().clone());

    let mut with_poster = movie("Heat", "Michael Mann", 1995, Some(8.0), &["Crime", "Drama"]);
    with_poster.set_poster_url(Some("https://example.com/heat.jpg".to_string()));
    movies.save(with_poster).await.unwrap();
    movies
        .save(movie("Casino", "Martin Scorsese", 1995, Some(9.0), &["Drama"]))
        .await
        .unwrap();

    let stats = db.stats().await.unwrap();
    assert_eq!(stats.total_movies, 2);
    assert_eq!(stats.movies_with_posters, 1);
    assert!((stats.average_rating - 8.5).abs() < 1e-9);
    assert!(!stats.database_size.is_empty());

    let histogram = db.genre_histogram().await.unwrap();
    assert_eq!(histogram[0], ("Drama".to_string(), 2));
    assert!(histogram.contains(&("Crime".to_string(), 1)));
}

#[tokio::test]
async fn test_migrate_twice_is_idempotent() {
    let (_dir, db) = open_store().await;
    db.migrate().await.unwrap();
    db.ping().await.unwrap();
}
