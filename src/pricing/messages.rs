//! Customer-facing wording for price quotes.
//!
//! Nothing here feeds back into the numbers; a quote is priced first and
//! described afterwards, in whichever locale the caller asks for.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::models::PriceBreakdown;
use super::policy::PricingPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Sv,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sv" | "sv-se" => Ok(Locale::Sv),
            "en" | "en-gb" | "en-us" => Ok(Locale::En),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}

/// Phrase templates for one locale
///
/// `{placeholders}` are substituted by [`QuoteMessages`].
#[derive(Debug, Clone, Copy)]
pub struct MessageTemplates {
    pub discount: &'static str,
    pub discount_saving: &'static str,
    pub rut_saving: &'static str,
    pub savings_intro: &'static str,
    pub joiner: &'static str,
    pub total: &'static str,
    pub with_discount: &'static str,
    pub includes: &'static str,
    pub rut_note: &'static str,
}

const SV: MessageTemplates = MessageTemplates {
    discount: "{percent}% rabatt för {range} m³",
    discount_saving: "{amount} kr tack vare {discount}",
    rut_saving: "{amount} kr med RUT-avdrag",
    savings_intro: "Du sparar ",
    joiner: " och ",
    total: "Din flytt kostar {total} kr inklusive allt",
    with_discount: " med {discount}",
    includes: ". Detta inkluderar {services}.",
    rut_note: "Priset är redan reducerat med RUT-avdrag där det är tillämpligt.",
};

const EN: MessageTemplates = MessageTemplates {
    discount: "{percent}% discount for {range} m³",
    discount_saving: "{amount} kr thanks to the {discount}",
    rut_saving: "{amount} kr with the RUT deduction",
    savings_intro: "You save ",
    joiner: " and ",
    total: "Your move costs {total} kr all inclusive",
    with_discount: " with a {discount}",
    includes: ". This includes {services}.",
    rut_note: "The price is already reduced by the RUT deduction where applicable.",
};

impl Locale {
    pub fn templates(&self) -> &'static MessageTemplates {
        match self {
            Locale::Sv => &SV,
            Locale::En => &EN,
        }
    }
}

/// Renders the explanation strings for a priced quote
pub struct QuoteMessages<'a> {
    policy: &'a PricingPolicy,
    templates: &'static MessageTemplates,
}

impl<'a> QuoteMessages<'a> {
    pub fn new(policy: &'a PricingPolicy, locale: Locale) -> Self {
        Self {
            policy,
            templates: locale.templates(),
        }
    }

    /// Description of the discount tier for a volume, empty when none applies
    ///
    /// Ranges follow the tier table: the top tier reads "30+", the others run
    /// up to one below the next tier ("20-29").
    pub fn volume_discount(&self, volume_m3: f64) -> String {
        let Some((index, tier)) = self.policy.discount_tier(volume_m3) else {
            return String::new();
        };

        let range = match index.checked_sub(1).and_then(|i| self.policy.discount_tiers.get(i)) {
            Some(upper) => format!("{}-{}", tier.min_volume_m3, upper.min_volume_m3 - 1.0),
            None => format!("{}+", tier.min_volume_m3),
        };
        let percent = (tier.rate * 100.0).round();

        self.templates
            .discount
            .replace("{percent}", &percent.to_string())
            .replace("{range}", &range)
    }

    pub fn savings_explanation(&self, volume_m3: f64, breakdown: &PriceBreakdown) -> String {
        let mut parts = Vec::with_capacity(2);
        let discount = self.volume_discount(volume_m3);
        if !discount.is_empty() {
            parts.push(
                self.templates
                    .discount_saving
                    .replace("{amount}", &breakdown.discount_amount.to_string())
                    .replace("{discount}", &discount),
            );
        }
        parts.push(
            self.templates
                .rut_saving
                .replace("{amount}", &breakdown.rut_savings.to_string()),
        );

        format!("{}{}", self.templates.savings_intro, parts.join(self.templates.joiner))
    }

    /// Full sentence an agent can hand to the customer
    pub fn suggested_response(
        &self,
        volume_m3: f64,
        requested_services: &[String],
        breakdown: &PriceBreakdown,
    ) -> String {
        let mut response = self
            .templates
            .total
            .replace("{total}", &breakdown.total_price.to_string());

        let discount = self.volume_discount(volume_m3);
        if !discount.is_empty() {
            response.push_str(&self.templates.with_discount.replace("{discount}", &discount));
        }

        if requested_services.is_empty() {
            response.push('.');
        } else {
            let services: Vec<String> = requested_services.iter().map(|s| s.to_lowercase()).collect();
            response.push_str(&self.templates.includes.replace("{services}", &services.join(", ")));
        }

        format!(
            "{} {}. {}",
            response,
            self.savings_explanation(volume_m3, breakdown),
            self.templates.rut_note
        )
    }
}
