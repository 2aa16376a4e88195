//! Site options stored in the `options` table.

use sqlx::PgPool;

use folio_core::error::StoreResult;
use folio_core::models::{ReadingSettings, ShowOnFront};

use super::helpers::query_error;

/// Read the front page / posts page designations.
///
/// Missing rows fall back to the defaults (posts on front, no pages).
pub async fn load_reading_settings(pool: &PgPool) -> StoreResult<ReadingSettings> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT name, value
        FROM options
        WHERE name IN ('show_on_front', 'page_on_front', 'page_for_posts')
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(query_error)?;

    Ok(reading_settings_from(
        rows.iter().map(|(name, value)| (name.as_str(), value.as_str())),
    ))
}

/// Build reading settings from `(name, value)` option pairs.
pub fn reading_settings_from<'a>(
    options: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> ReadingSettings {
    let mut settings = ReadingSettings::default();
    for (name, value) in options {
        match name {
            "show_on_front" => {
                settings.show_on_front = match value {
                    "page" => ShowOnFront::Page,
                    _ => ShowOnFront::Posts,
                }
            }
            "page_on_front" => settings.page_on_front = parse_page_id(value),
            "page_for_posts" => settings.page_for_posts = parse_page_id(value),
            _ => {}
        }
    }
    settings
}

/// `0` and garbage both mean "no page".
fn parse_page_id(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|id| *id > 0)
}
