use crate::form::ValidatedLead;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

/// Where the widget is embedded. Captured once when the widget is constructed,
/// the way the script variant reads `window.location` at load time.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub url: Option<Url>,
    pub referrer: Option<String>,
}

impl PageContext {
    /// A page URL that fails to parse is dropped rather than reported; the
    /// payload simply goes out without attribution context.
    pub fn new(url: Option<&str>, referrer: Option<&str>) -> Self {
        Self {
            url: url.and_then(|raw| raw.parse().ok()),
            referrer: referrer
                .filter(|r| !r.is_empty())
                .map(|r| r.to_string()),
        }
    }

    /// Campaign parameters: every query pair whose key starts with `utm_`,
    /// percent-decoded.
    pub fn utm_params(&self) -> BTreeMap<String, String> {
        let Some(url) = &self.url else {
            return BTreeMap::new();
        };
        url.query_pairs()
            .filter(|(key, _)| key.starts_with("utm_"))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }
}

/// JSON body delivered by the submit transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadPayload {
    pub name: String,
    pub phone: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub utm: BTreeMap<String, String>,
    /// RFC 3339 UTC timestamp taken when the submission was issued.
    pub timestamp: String,
}

impl LeadPayload {
    pub fn new(lead: ValidatedLead, page: &PageContext) -> Self {
        Self {
            name: lead.name,
            phone: lead.phone,
            message: lead.message,
            current_page: page.url.as_ref().map(|u| u.to_string()),
            referrer: page.referrer.clone(),
            utm: page.utm_params(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
