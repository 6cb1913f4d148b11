//! Redirect parameter classification
//!
//! Pure functions over the landing URL. `parse_redirect` picks exactly one
//! outcome with the precedence `error` > `code` > `auth_success`;
//! `strip_auth_params` removes every OAuth-related parameter so a reload of
//! the stripped location classifies as `None`.

use std::borrow::Cow;

use calgentic_domain::constants::{
    AUTH_QUERY_PARAMS, PARAM_AUTH_SUCCESS, PARAM_CODE, PARAM_ERROR, PARAM_USER,
};
use calgentic_domain::{FailureReason, RedirectOutcome};
use url::Url;

/// Classifies the authentication parameters of `url`.
#[must_use]
pub fn parse_redirect(url: &Url) -> RedirectOutcome {
    let param = |name: &str| query_param(url, name);

    if let Some(error) = param(PARAM_ERROR) {
        let error = error.trim();
        if error.is_empty() {
            return RedirectOutcome::Error(FailureReason::InvalidRedirect.code().to_string());
        }
        return RedirectOutcome::Error(error.to_string());
    }

    if let Some(code) = param(PARAM_CODE) {
        if code.trim().is_empty() {
            return RedirectOutcome::Error(FailureReason::InvalidRedirect.code().to_string());
        }
        return RedirectOutcome::Code(code.into_owned());
    }

    let success = param(PARAM_AUTH_SUCCESS).is_some_and(|flag| flag.eq_ignore_ascii_case("true"));
    if success {
        if let Some(user) = param(PARAM_USER).filter(|user| !user.trim().is_empty()) {
            return RedirectOutcome::Success(user.trim().to_string());
        }
    }

    RedirectOutcome::None
}

fn query_param<'a>(url: &'a Url, name: &str) -> Option<Cow<'a, str>> {
    url.query_pairs().find(|(key, _)| key == name).map(|(_, value)| value)
}

/// Returns `url` without any OAuth redirect parameters.
///
/// Unrelated parameters keep their order; path and fragment are untouched.
/// A query left empty is removed entirely.
#[must_use]
pub fn strip_auth_params(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !AUTH_QUERY_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut stripped = url.clone();
    if kept.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.query_pairs_mut().clear().extend_pairs(kept);
    }
    stripped
}

/// Whether `url` carries any OAuth redirect parameter.
#[must_use]
pub fn has_auth_params(url: &Url) -> bool {
    url.query_pairs().any(|(key, _)| AUTH_QUERY_PARAMS.contains(&key.as_ref()))
}
