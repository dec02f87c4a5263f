//! Unified Error Model
use thiserror::Error;

/// Validation failures for an incoming offer.
///
/// These are the only anomalies surfaced to callers as errors: the merge
/// pipeline decides whether to drop or retry the offer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OfferError {
    #[error("OFFER/MISSING_SOURCE: offer at {url} has no source name")]
    MissingSource { url: String },

    #[error("OFFER/MISSING_URL: offer from {source_name} has no url")]
    MissingUrl { source_name: String },

    #[error("OFFER/MISSING_PRICE: {source_name} at {url}")]
    MissingPrice { source_name: String, url: String },

    #[error("OFFER/INVALID_PRICE: {price} from {source_name} at {url}")]
    InvalidPrice {
        source_name: String,
        url: String,
        price: f64,
    },

    #[error("OFFER/MISSING_CURRENCY: {source_name} at {url}")]
    MissingCurrency { source_name: String, url: String },

    #[error("OFFER/UNKNOWN_CURRENCY: {code}")]
    UnknownCurrency { code: String },
}

#[derive(Error, Debug)]
pub enum NudgerError {
    #[error(transparent)]
    Offer(#[from] OfferError),

    #[error("CONFIG/{0}")]
    Config(String),

    #[error("REGISTRY/{0}")]
    Registry(String),
}

impl From<serde_yaml::Error> for NudgerError {
    fn from(err: serde_yaml::Error) -> Self {
        NudgerError::Config(err.to_string())
    }
}

pub type NudgerResult<T> = Result<T, NudgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_error_codes() {
        let err = OfferError::MissingPrice {
            source_name: "fnac.com".to_string(),
            url: "https://fnac.com/p/1".to_string(),
        };
        assert_eq!(err.to_string(), "OFFER/MISSING_PRICE: fnac.com at https://fnac.com/p/1");

        let wrapped: NudgerError = err.into();
        assert!(wrapped.to_string().starts_with("OFFER/MISSING_PRICE"));
    }

    #[test]
    fn test_yaml_error_maps_to_config() {
        let yaml_err = serde_yaml::from_str::<u32>("not: [a number").unwrap_err();
        let err: NudgerError = yaml_err.into();
        assert!(matches!(err, NudgerError::Config(_)));
        assert!(err.to_string().starts_with("CONFIG/"));
    }
}
