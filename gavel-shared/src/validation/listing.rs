/// New listing validation
///
/// Mirrors the `listings` column constraints so bad input is reported before
/// it reaches the database.

use rust_decimal::Decimal;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::{field_errors_in_order, image_url, FieldError};
use crate::auction::money;

/// Order in which listing errors are reported
pub const FIELD_ORDER: &[&str] = &["title", "description", "starting_bid", "image"];

/// Listing fields after parsing, before validation
#[derive(Debug, Clone, Validate)]
pub struct ListingDraft {
    #[validate(length(min = 1, max = 40, message = "Title must be between 1 and 40 characters."))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 250,
        message = "Description must be between 1 and 250 characters."
    ))]
    pub description: String,

    #[validate(custom(function = "check_starting_bid"))]
    pub starting_bid: Decimal,

    #[validate(length(max = 200, message = "Image URL must be at most 200 characters."))]
    pub image: Option<String>,
}

impl ListingDraft {
    /// Builds a draft from form input
    ///
    /// Text is trimmed; a blank image counts as no image.
    pub fn new(title: &str, description: &str, starting_bid: Decimal, image: Option<&str>) -> Self {
        Self {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            starting_bid,
            image: image
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        }
    }

    /// Runs every field check, the image probe last
    ///
    /// # Errors
    ///
    /// Returns all failures in [`FIELD_ORDER`].
    pub async fn check(&self, probe: &dyn image_url::ImageProbe) -> Result<(), Vec<FieldError>> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_errors_in_order(&e, FIELD_ORDER),
        };

        let image_length_ok = !errors.iter().any(|e| e.field == "image");
        if let (Some(image), true) = (&self.image, image_length_ok) {
            if let Err(e) = image_url::validate_image_url(image, probe).await {
                errors.push(FieldError::new("image", e.to_string()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_starting_bid(value: &Decimal) -> Result<(), ValidationError> {
    money::check_price(*value).map(|_| ()).map_err(|e| {
        let mut error = ValidationError::new("starting_bid");
        error.message = Some(Cow::Owned(e.to_string()));
        error
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{join_messages, ImageProbe, ProbeError};
    use async_trait::async_trait;
    use reqwest::Url;
    use std::str::FromStr;

    struct HtmlProbe;

    #[async_trait]
    impl ImageProbe for HtmlProbe {
        async fn content_type(&self, _url: &Url) -> Result<Option<String>, ProbeError> {
            Ok(Some("text/html".into()))
        }
    }

    struct PngProbe;

    #[async_trait]
    impl ImageProbe for PngProbe {
        async fn content_type(&self, _url: &Url) -> Result<Option<String>, ProbeError> {
            Ok(Some("image/png".into()))
        }
    }

    fn price(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_valid_draft() {
        let draft = ListingDraft::new(
            " Lamp ",
            "A brass lamp",
            price("100.00"),
            Some("https://x.io/lamp.png"),
        );
        assert_eq!(draft.title, "Lamp");
        assert!(draft.check(&PngProbe).await.is_ok());
    }

    #[tokio::test]
    async fn test_blank_image_is_skipped() {
        let draft = ListingDraft::new("Lamp", "A brass lamp", price("1"), Some("  "));
        assert_eq!(draft.image, None);
        assert!(draft.check(&HtmlProbe).await.is_ok());
    }

    #[tokio::test]
    async fn test_errors_are_aggregated_in_field_order() {
        let draft = ListingDraft::new(
            &"t".repeat(41),
            "   ",
            price("0.001"),
            Some("https://x.io/lamp.png"),
        );

        let errors = draft.check(&HtmlProbe).await.unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "description", "starting_bid", "image"]);

        assert_eq!(
            join_messages(&errors),
            "Title must be between 1 and 40 characters. \
             Description must be between 1 and 250 characters. \
             Ensure that there are no more than 2 decimal places. \
             URL does not point to a valid image."
        );
    }

    #[tokio::test]
    async fn test_starting_bid_must_be_positive() {
        let draft = ListingDraft::new("Lamp", "Brass", price("0"), None);
        let errors = draft.check(&PngProbe).await.unwrap_err();
        assert_eq!(errors, vec![FieldError::new("starting_bid", "Ensure this value is greater than zero.")]);
    }

    #[tokio::test]
    async fn test_overlong_image_is_not_probed() {
        let long = format!("https://x.io/{}.png", "a".repeat(200));
        let draft = ListingDraft::new("Lamp", "Brass", price("5"), Some(&long));
        let errors = draft.check(&HtmlProbe).await.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Image URL must be at most 200 characters.");
    }
}
