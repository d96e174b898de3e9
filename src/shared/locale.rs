//! UI language selection and the embedded Fluent message catalogs
//!
//! The flow layers communicate through translation keys (for example
//! `charging-error-sessionnotfound`); this module resolves them against a
//! per-language [`FluentBundle`] at the rendering edge. Unknown keys render
//! as-is, which also covers raw backend detail strings passed through the
//! same path.

use fluent::{FluentArgs, FluentBundle, FluentResource};
use thiserror::Error;
use tracing::debug;
use unic_langid::LanguageIdentifier;

/// Supported UI languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    De,
}

impl Language {
    /// Language identifier of the embedded catalog.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
        }
    }

    /// Map a BCP 47-ish tag (`de`, `de-DE`, `de_AT.UTF-8`) to a supported
    /// language; anything unrecognized falls back to English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "de" => Self::De,
            _ => Self::En,
        }
    }

    /// Detect the language from the process environment.
    pub fn detect() -> Self {
        std::env::var("LC_ALL")
            .or_else(|_| std::env::var("LANG"))
            .map(|tag| Self::from_tag(&tag))
            .unwrap_or_default()
    }

    fn catalog(&self) -> &'static str {
        match self {
            Self::En => include_str!("../../locales/en.ftl"),
            Self::De => include_str!("../../locales/de.ftl"),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Failure to load an embedded message catalog. The catalogs ship inside
/// the binary, so this only fires on a build carrying a broken `.ftl` file.
#[derive(Debug, Error)]
#[error("failed to load the '{language}' message catalog: {detail}")]
pub struct LocaleError {
    language: Language,
    detail: String,
}

/// Message resolver for one language, backed by a Fluent bundle.
pub struct Locale {
    bundle: FluentBundle<FluentResource>,
    language: Language,
}

impl Locale {
    /// Build the resolver for `language` from its embedded catalog.
    pub fn new(language: Language) -> Result<Self, LocaleError> {
        let fail = |detail: String| LocaleError { language, detail };

        let resource = FluentResource::try_new(language.catalog().to_string())
            .map_err(|(_, errors)| fail(format!("{errors:?}")))?;
        let lang_id: LanguageIdentifier = language
            .code()
            .parse()
            .map_err(|e| fail(format!("{e}")))?;

        let mut bundle = FluentBundle::new(vec![lang_id]);
        // Plain terminal output; keep the Unicode isolation marks out of
        // interpolated values.
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|errors| fail(format!("{errors:?}")))?;

        Ok(Self { bundle, language })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Resolve a translation key. Keys without a catalog entry come back
    /// unchanged.
    pub fn message(&self, key: &str) -> String {
        self.format(key, None)
    }

    /// Resolve a translation key and fill its placeables from `args`.
    pub fn format(&self, key: &str, args: Option<&FluentArgs>) -> String {
        let Some(pattern) = self.bundle.get_message(key).and_then(|m| m.value()) else {
            return key.to_string();
        };
        let mut errors = Vec::new();
        let text = self.bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            debug!("Formatting '{}' reported {:?}", key, errors);
        }
        text.to_string()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use fluent::fluent_args;

    /// Every key the rendering layer relies on.
    const REQUIRED_KEYS: &[&str] = &[
        "global-error-generic",
        "charging-authorized-waiting",
        "charging-speed",
        "charging-rejected",
        "charging-finished",
        "charging-lastupdate",
        "charging-refresh",
        "charging-costs",
        "charging-costs-estimated",
        "charging-time",
        "charging-energy",
        "charging-soc",
        "charging-soc-infotext",
        "charging-dontworry",
        "charging-tryagain",
        "charging-button-again",
        "charging-error-sessionnotfound",
        "checkout-operator",
        "checkout-tariffinfo",
        "checkout-pricekwh",
        "checkout-pricemin",
        "checkout-pricesession",
        "checkout-inclvat",
        "checkout-authinfo",
        "checkout-connect-vehicle",
        "checkout-button-checkout",
        "checkout-accept-terms-prefix",
        "checkout-accept-terms-linktext",
        "checkout-error-tanotaccepted",
        "receipt-sessiondetails",
        "receipt-starttime",
        "receipt-stoptime",
        "receipt-address",
        "receipt-meterstart",
        "receipt-meterstop",
        "receipt-sessioncosts",
        "receipt-measuredvalue",
        "receipt-unitprice",
        "receipt-netprice",
        "receipt-consumption",
        "receipt-time",
        "receipt-totalnet",
        "receipt-vat",
        "receipt-totalgross",
        "receipt-discount",
        "receipt-finalpricing",
        "receipt-enjoyedcharging",
        "receipt-problemsoperator",
        "receipt-footermsg",
    ];

    fn locale(language: Language) -> Locale {
        Locale::new(language).expect("embedded catalog loads")
    }

    #[test]
    fn tag_parsing() {
        assert_eq!(Language::from_tag("de"), Language::De);
        assert_eq!(Language::from_tag("de-DE"), Language::De);
        assert_eq!(Language::from_tag("de_AT.UTF-8"), Language::De);
        assert_eq!(Language::from_tag("DE"), Language::De);
        assert_eq!(Language::from_tag("en-US"), Language::En);
        assert_eq!(Language::from_tag("fr"), Language::En);
        assert_eq!(Language::from_tag(""), Language::En);
        assert_eq!(locale(Language::De).language(), Language::De);
    }

    #[test]
    fn catalogs_cover_every_required_key() {
        for language in [Language::En, Language::De] {
            let locale = locale(language);
            let missing: Vec<&str> = REQUIRED_KEYS
                .iter()
                .copied()
                .filter(|key| {
                    let text = locale.message(key);
                    text.is_empty() || text == *key
                })
                .collect();
            assert!(missing.is_empty(), "{language} catalog is missing {missing:?}");
        }
    }

    #[test]
    fn known_keys_resolve_per_language() {
        assert_eq!(locale(Language::En).message("charging-costs"), "Costs");
        assert_eq!(locale(Language::De).message("charging-costs"), "Kosten");
    }

    #[test]
    fn unknown_keys_pass_through() {
        assert_eq!(
            locale(Language::En).message("Charger offline"),
            "Charger offline"
        );
        assert_eq!(locale(Language::De).message("no-such-key"), "no-such-key");
    }

    #[test]
    fn authorization_info_interpolates_the_amount() {
        let args = fluent_args!["amount" => "25.00 €"];
        let text = locale(Language::En).format("checkout-authinfo", Some(&args));
        assert_eq!(
            text,
            "To start charging we will reserve 25.00 € on your payment method. \
             You only pay what you actually charge."
        );
    }
}
