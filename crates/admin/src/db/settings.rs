//! Site settings stored as a single row (`id = 1`) in `site_settings`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use super::RepositoryError;
use crate::models::settings::{SiteSettings, SiteSettingsInput, SocialLinks};

const SETTINGS_COLUMNS: &str = "brand_name, hero_heading, hero_subheading, announcement_text, \
    announcement_behavior, contact_email, contact_phone, social_links, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    brand_name: String,
    hero_heading: Option<String>,
    hero_subheading: Option<String>,
    announcement_text: Option<String>,
    announcement_behavior: String,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    social_links: Json<SocialLinks>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SettingsRow> for SiteSettings {
    type Error = RepositoryError;

    fn try_from(row: SettingsRow) -> Result<Self, Self::Error> {
        let announcement_behavior = row
            .announcement_behavior
            .parse()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            brand_name: row.brand_name,
            hero_heading: row.hero_heading,
            hero_subheading: row.hero_subheading,
            announcement_text: row.announcement_text,
            announcement_behavior,
            contact_email: row.contact_email,
            contact_phone: row.contact_phone,
            social_links: row.social_links.0,
            updated_at: Some(row.updated_at),
        })
    }
}

/// Repository for the site settings row.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Current settings, or the defaults if they were never saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored behavior is unknown.
    pub async fn get(&self) -> Result<SiteSettings, RepositoryError> {
        let row = sqlx::query_as::<_, SettingsRow>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM site_settings WHERE id = 1"
        ))
        .fetch_optional(self.pool)
        .await?;

        row.map_or_else(|| Ok(SiteSettings::default()), TryInto::try_into)
    }

    /// Replace the settings, creating the row on first save.
    ///
    /// The input is expected to be normalized already.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn update(&self, input: &SiteSettingsInput) -> Result<SiteSettings, RepositoryError> {
        let row = sqlx::query_as::<_, SettingsRow>(&format!(
            "INSERT INTO site_settings \
                (id, brand_name, hero_heading, hero_subheading, announcement_text, \
                 announcement_behavior, contact_email, contact_phone, social_links, updated_at) \
             VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, NOW()) \
             ON CONFLICT (id) DO UPDATE SET \
                brand_name = EXCLUDED.brand_name, \
                hero_heading = EXCLUDED.hero_heading, \
                hero_subheading = EXCLUDED.hero_subheading, \
                announcement_text = EXCLUDED.announcement_text, \
                announcement_behavior = EXCLUDED.announcement_behavior, \
                contact_email = EXCLUDED.contact_email, \
                contact_phone = EXCLUDED.contact_phone, \
                social_links = EXCLUDED.social_links, \
                updated_at = NOW() \
             RETURNING {SETTINGS_COLUMNS}"
        ))
        .bind(&input.brand_name)
        .bind(&input.hero_heading)
        .bind(&input.hero_subheading)
        .bind(&input.announcement_text)
        .bind(input.announcement_behavior.as_str())
        .bind(&input.contact_email)
        .bind(&input.contact_phone)
        .bind(Json(&input.social_links))
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }
}
