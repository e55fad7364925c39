//! Store-wide settings edited by super admins.
//!
//! A single row holds the brand name, hero copy, announcement bar, contact
//! details, and social links shown by the storefront.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use lumiere_core::Email;

pub const MAX_BRAND_NAME_CHARS: usize = 100;
pub const MAX_HEADING_CHARS: usize = 200;
pub const MAX_ANNOUNCEMENT_CHARS: usize = 280;
pub const MAX_PHONE_CHARS: usize = 32;

/// How the storefront animates the announcement bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementBehavior {
    #[default]
    Static,
    Scroll,
    Hover,
}

impl AnnouncementBehavior {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Scroll => "scroll",
            Self::Hover => "hover",
        }
    }
}

impl fmt::Display for AnnouncementBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnnouncementBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(Self::Static),
            "scroll" => Ok(Self::Scroll),
            "hover" => Ok(Self::Hover),
            other => Err(format!("unknown announcement behavior: {other}")),
        }
    }
}

/// Links to the store's social profiles. Absent links are not rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
}

impl SocialLinks {
    fn entries_mut(&mut self) -> [(&'static str, &mut Option<String>); 5] {
        [
            ("facebook", &mut self.facebook),
            ("instagram", &mut self.instagram),
            ("twitter", &mut self.twitter),
            ("linkedin", &mut self.linkedin),
            ("youtube", &mut self.youtube),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteSettings {
    pub brand_name: String,
    pub hero_heading: Option<String>,
    pub hero_subheading: Option<String>,
    pub announcement_text: Option<String>,
    pub announcement_behavior: AnnouncementBehavior,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub social_links: SocialLinks,
    /// `None` until the settings are first saved.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            brand_name: "Lumiere".to_string(),
            hero_heading: None,
            hero_subheading: None,
            announcement_text: None,
            announcement_behavior: AnnouncementBehavior::Static,
            contact_email: None,
            contact_phone: None,
            social_links: SocialLinks::default(),
            updated_at: None,
        }
    }
}

/// Body of `PUT /admin/settings`. Replaces every field.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettingsInput {
    pub brand_name: String,
    #[serde(default)]
    pub hero_heading: Option<String>,
    #[serde(default)]
    pub hero_subheading: Option<String>,
    #[serde(default)]
    pub announcement_text: Option<String>,
    #[serde(default)]
    pub announcement_behavior: AnnouncementBehavior,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
}

/// Trim a field; blank values become `None`.
fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<(), String> {
    match value {
        Some(v) if v.chars().count() > max => {
            Err(format!("{field} must be at most {max} characters"))
        }
        _ => Ok(()),
    }
}

impl SiteSettingsInput {
    /// Trim every field, drop blank optional fields, and check the rest.
    ///
    /// Contact emails are lowercased. Social links must be absolute
    /// `http` or `https` URLs.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message for the first violated rule.
    pub fn normalized(self) -> Result<Self, String> {
        let brand_name = self.brand_name.trim().to_string();
        if brand_name.is_empty() {
            return Err("brand_name cannot be empty".to_string());
        }
        check_len("brand_name", Some(&brand_name), MAX_BRAND_NAME_CHARS)?;

        let hero_heading = blank_to_none(self.hero_heading);
        check_len("hero_heading", hero_heading.as_deref(), MAX_HEADING_CHARS)?;
        let hero_subheading = blank_to_none(self.hero_subheading);
        check_len("hero_subheading", hero_subheading.as_deref(), MAX_HEADING_CHARS)?;
        let announcement_text = blank_to_none(self.announcement_text);
        check_len(
            "announcement_text",
            announcement_text.as_deref(),
            MAX_ANNOUNCEMENT_CHARS,
        )?;

        let contact_email = blank_to_none(self.contact_email)
            .map(|raw| {
                Email::parse(&raw)
                    .map(Email::into_inner)
                    .map_err(|e| format!("contact_email: {e}"))
            })
            .transpose()?;

        let contact_phone = blank_to_none(self.contact_phone);
        check_len("contact_phone", contact_phone.as_deref(), MAX_PHONE_CHARS)?;
        if let Some(phone) = &contact_phone
            && !phone
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ' | '.'))
        {
            return Err("contact_phone may only contain digits, spaces, and + - ( ) .".to_string());
        }

        let mut social_links = self.social_links;
        for (name, link) in social_links.entries_mut() {
            *link = blank_to_none(link.take());
            if let Some(value) = link.as_deref() {
                let parsed =
                    Url::parse(value).map_err(|e| format!("social_links.{name}: {e}"))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(format!("social_links.{name} must be an http(s) URL"));
                }
            }
        }

        Ok(Self {
            brand_name,
            hero_heading,
            hero_subheading,
            announcement_text,
            announcement_behavior: self.announcement_behavior,
            contact_email,
            contact_phone,
            social_links,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> SiteSettingsInput {
        serde_json::from_value(serde_json::json!({
            "brand_name": "  Lumiere  ",
            "hero_heading": "Light for long evenings",
            "announcement_text": "   ",
            "contact_email": "Hello@Lumiere.Shop",
            "social_links": {
                "instagram": "https://instagram.com/lumiere",
                "twitter": ""
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_normalizes_fields() {
        let settings = input().normalized().unwrap();
        assert_eq!(settings.brand_name, "Lumiere");
        assert_eq!(settings.hero_heading.as_deref(), Some("Light for long evenings"));
        assert_eq!(settings.announcement_text, None);
        assert_eq!(settings.announcement_behavior, AnnouncementBehavior::Static);
        assert_eq!(settings.contact_email.as_deref(), Some("hello@lumiere.shop"));
        assert_eq!(
            settings.social_links.instagram.as_deref(),
            Some("https://instagram.com/lumiere")
        );
        assert_eq!(settings.social_links.twitter, None);
    }

    #[test]
    fn test_brand_name_is_required() {
        let mut input = input();
        input.brand_name = "   ".to_string();
        assert!(input.normalized().is_err());

        let mut input = self::input();
        input.brand_name = "x".repeat(MAX_BRAND_NAME_CHARS + 1);
        assert!(input.normalized().is_err());
    }

    #[test]
    fn test_rejects_bad_contact_details() {
        let mut input = input();
        input.contact_email = Some("not-an-email".to_string());
        assert!(input.normalized().is_err());

        let mut input = self::input();
        input.contact_phone = Some("call me maybe".to_string());
        assert!(input.normalized().is_err());

        let mut input = self::input();
        input.contact_phone = Some("+1 (555) 010-0199".to_string());
        assert!(input.normalized().is_ok());
    }

    #[test]
    fn test_social_links_must_be_web_urls() {
        let mut input = input();
        input.social_links.facebook = Some("javascript:alert(1)".to_string());
        let err = input.normalized().unwrap_err();
        assert!(err.contains("social_links.facebook"));

        let mut input = self::input();
        input.social_links.youtube = Some("youtube.com/lumiere".to_string());
        assert!(input.normalized().is_err());
    }

    #[test]
    fn test_long_announcement_is_rejected() {
        let mut input = input();
        input.announcement_text = Some("a".repeat(MAX_ANNOUNCEMENT_CHARS + 1));
        assert!(input.normalized().is_err());
    }

    #[test]
    fn test_announcement_behavior_round_trips_through_text() {
        for behavior in [
            AnnouncementBehavior::Static,
            AnnouncementBehavior::Scroll,
            AnnouncementBehavior::Hover,
        ] {
            assert_eq!(behavior.as_str().parse::<AnnouncementBehavior>(), Ok(behavior));
        }
        assert!("marquee".parse::<AnnouncementBehavior>().is_err());
    }
}
