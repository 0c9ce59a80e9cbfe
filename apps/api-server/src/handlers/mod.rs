//! HTTP handlers and route configuration.

mod health;
mod posts;
mod tags;
mod users;


use actix_web::web;
use juicebox_core::domain::Post;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/users")
                    .route("", web::get().to(users::list))
                    .route("", web::post().to(users::register))
                    .route("/{id}", web::get().to(users::get))
                    .route("/{id}", web::patch().to(users::update)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::patch().to(posts::update)),
            )
            .service(
                web::scope("/tags")
                    .route("", web::get().to(tags::list))
                    .route("/{tag_name}/posts", web::get().to(tags::posts)),
            ),
    );
}

/// Listings only show active posts.
fn visible(posts: Vec<Post>) -> Vec<Post> {
    posts.into_iter().filter(|p| p.active).collect()
}
