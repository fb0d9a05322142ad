//! Integration tests for `src/composer.rs`.

#[path = "composer/compose_test.rs"]
mod compose_test;
