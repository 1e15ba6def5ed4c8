pub mod graphql_handler;
pub mod study_content_handler;

use actix_web::web;

pub use graphql_handler::{graphiql, graphql};
pub use study_content_handler::{
    generate_flashcards, generate_study_content, health_check, invalidate_study_content,
    study_content_schema,
};

/// Registers the REST routes. GraphQL routes also need a [`crate::graphql::Schema`] in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(generate_study_content)
        .service(generate_flashcards)
        .service(invalidate_study_content)
        .service(study_content_schema)
        .service(health_check);
}

pub fn configure_graphql(cfg: &mut web::ServiceConfig) {
    cfg.service(graphql).service(graphiql);
}
