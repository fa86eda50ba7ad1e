//! Validation of user settings and construction of the search query string.
//!
//! The query string is assembled by hand rather than through a form encoder:
//! parameter order is fixed so the same input always yields the same URL,
//! and the free-text term is joined to the year filter with a literal `+`.

use serde_json::Number;
use std::borrow::Cow;

use super::error::InvalidSetting;
use super::types::{provided, SearchRequest, UserSettings, ValidatedSettings, YearRange};

/// Response fields requested from the search endpoint.
pub const SEARCH_FIELDS: &str = "key,title,author_name,first_publish_year,publish_date,publisher,subject,person,place,time,language,ebook_access,cover_i";

/// Check the numeric settings and return their typed form.
///
/// Order is fixed: `limit`, then the lower year bound, then the upper one.
/// Numbers may be written in decimal or exponent form (`20`, `1950.5`,
/// `1e3`) with surrounding whitespace. A whitespace-only year bound counts
/// as unset; a whitespace-only `limit` is rejected.
///
/// ```
/// use openshelf_library::{validate, InvalidSetting, UserSettings};
///
/// let bad = UserSettings { limit: Some("0".into()), ..Default::default() };
/// assert_eq!(validate(&bad), Err(InvalidSetting::Limit));
///
/// let ok = UserSettings {
///     publish_year_from: " 1950 ".into(),
///     ..Default::default()
/// };
/// assert_eq!(validate(&ok).unwrap().years.from, Some(1950.into()));
/// ```
pub fn validate(settings: &UserSettings) -> Result<ValidatedSettings, InvalidSetting> {
    let limit = match provided(settings.limit.as_deref()) {
        Some(raw) => match parse_number(raw) {
            Some(n) if n.as_f64().is_some_and(|v| v > 0.0) => Some(n),
            _ => return Err(InvalidSetting::Limit),
        },
        None => None,
    };
    let from = parse_year(&settings.publish_year_from).ok_or(InvalidSetting::PublishYearFrom)?;
    let to = parse_year(&settings.publish_year_to).ok_or(InvalidSetting::PublishYearTo)?;

    Ok(ValidatedSettings {
        sort: provided(settings.sort.as_deref()).map(str::to_owned),
        years: YearRange { from, to },
        limit,
    })
}

// Outer None: malformed. Inner None: not provided.
fn parse_year(raw: &str) -> Option<Option<Number>> {
    match raw.trim() {
        "" => Some(None),
        s => parse_number(s).map(Some),
    }
}

// Whole values up to 2^53 stay integers so they print without a fraction.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn parse_number(raw: &str) -> Option<Number> {
    let n = raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())?;
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        Some(Number::from(n as i64))
    } else {
        Number::from_f64(n)
    }
}

/// Build the query string (without the leading `?`) for one search.
///
/// ```
/// use openshelf_library::{build_query, SearchRequest, ValidatedSettings};
///
/// let qs = build_query(&SearchRequest::default(), &ValidatedSettings::default());
/// assert!(qs.starts_with("fields=key%2Ctitle"));
/// ```
pub fn build_query(request: &SearchRequest, settings: &ValidatedSettings) -> String {
    let mut params: Vec<(&str, Cow<'_, str>)> = Vec::with_capacity(12);

    let mut terms: Vec<Cow<'_, str>> = Vec::with_capacity(2);
    if let Some(q) = provided(request.q.as_deref()) {
        terms.push(urlencoding::encode(q));
    }
    if let Some(filter) = settings.years.filter_term() {
        terms.push(urlencoding::encode(&filter).into_owned().into());
    }
    if !terms.is_empty() {
        params.push(("q", terms.join("+").into()));
    }

    for (name, value) in request.field_filters() {
        if let Some(v) = value {
            params.push((name, urlencoding::encode(v)));
        }
    }

    if let Some(sort) = settings.sort.as_deref() {
        params.push(("sort", urlencoding::encode(sort)));
    }
    if let Some(limit) = &settings.limit {
        params.push(("limit", limit.to_string().into()));
    }
    if request.offset > 0 {
        params.push(("offset", request.offset.to_string().into()));
    }
    params.push(("fields", urlencoding::encode(SEARCH_FIELDS)));

    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(limit: Option<&str>, from: &str, to: &str) -> UserSettings {
        UserSettings {
            sort: None,
            publish_year_from: from.into(),
            publish_year_to: to.into(),
            limit: limit.map(str::to_owned),
        }
    }

    #[test]
    fn rejects_bad_limits() {
        for raw in ["abc", "0", "-3", "-0.5", "   ", "NaN", "inf", "12abc"] {
            assert_eq!(
                validate(&settings(Some(raw), "", "")),
                Err(InvalidSetting::Limit),
                "limit {raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn empty_limit_is_unset() {
        for raw in [None, Some("")] {
            assert_eq!(validate(&settings(raw, "", "")).unwrap().limit, None);
        }
        assert_eq!(
            validate(&settings(Some(" 25 "), "", "")).unwrap().limit,
            Some(25.into())
        );
    }

    #[test]
    fn decimal_and_exponent_forms_are_numbers() {
        let v = validate(&settings(Some("2.5"), "1950.5", "1e3")).unwrap();
        assert_eq!(v.limit.map(|n| n.to_string()).as_deref(), Some("2.5"));
        assert_eq!(v.years.from.map(|n| n.to_string()).as_deref(), Some("1950.5"));
        assert_eq!(v.years.to, Some(1000.into()));

        let v = validate(&settings(Some("1e2"), "-500", "")).unwrap();
        assert_eq!(v.limit, Some(100.into()));
        assert_eq!(v.years.from, Some((-500).into()));
    }

    #[test]
    fn rejects_bad_years_with_distinct_errors() {
        assert_eq!(
            validate(&settings(None, "nineteen", "")),
            Err(InvalidSetting::PublishYearFrom)
        );
        assert_eq!(
            validate(&settings(None, "1950", "19x0")),
            Err(InvalidSetting::PublishYearTo)
        );
    }

    #[test]
    fn limit_is_checked_before_years() {
        assert_eq!(
            validate(&settings(Some("zero"), "bad", "bad")),
            Err(InvalidSetting::Limit)
        );
    }

    #[test]
    fn year_bounds_are_trimmed() {
        let v = validate(&settings(None, " 1950\t", "\n1960 ")).unwrap();
        assert_eq!(
            v.years,
            YearRange {
                from: Some(1950.into()),
                to: Some(1960.into())
            }
        );
        assert_eq!(validate(&settings(None, "   ", "")).unwrap().years, YearRange::default());
    }

    #[test]
    fn year_filter_forms() {
        let both = YearRange {
            from: Some(1950.into()),
            to: Some(1960.into()),
        };
        let from_only = YearRange {
            from: Some(1950.into()),
            to: None,
        };
        let to_only = YearRange {
            from: None,
            to: Some(1960.into()),
        };
        assert_eq!(
            both.filter_term().as_deref(),
            Some("first_publish_year:[1950 TO 1960]")
        );
        assert_eq!(
            from_only.filter_term().as_deref(),
            Some("first_publish_year:[1950 TO *]")
        );
        assert_eq!(
            to_only.filter_term().as_deref(),
            Some("first_publish_year:[* TO 1960]")
        );
        assert_eq!(YearRange::default().filter_term(), None);
    }

    #[test]
    fn empty_request_only_asks_for_fields() {
        let qs = build_query(&SearchRequest::default(), &ValidatedSettings::default());
        assert_eq!(
            qs,
            "fields=key%2Ctitle%2Cauthor_name%2Cfirst_publish_year%2Cpublish_date%2Cpublisher%2Csubject%2Cperson%2Cplace%2Ctime%2Clanguage%2Cebook_access%2Ccover_i"
        );
        for absent in ["q=", "title=", "author=", "sort=", "limit=", "offset="] {
            assert!(!qs.contains(absent), "{absent} should be absent");
        }
    }

    #[test]
    fn empty_strings_are_skipped() {
        let req = SearchRequest {
            q: Some("".into()),
            title: Some("".into()),
            ..Default::default()
        };
        let qs = build_query(&req, &ValidatedSettings::default());
        assert!(qs.starts_with("fields="));
    }

    #[test]
    fn whitespace_values_are_sent_as_given() {
        let req = SearchRequest {
            q: Some(" dune ".into()),
            title: Some("  ".into()),
            ..Default::default()
        };
        let mut raw = settings(None, "", "");
        raw.sort = Some(" new".into());
        let qs = build_query(&req, &validate(&raw).unwrap());
        assert!(qs.starts_with("q=%20dune%20&"), "{qs}");
        assert!(qs.contains("&title=%20%20&"), "{qs}");
        assert!(qs.contains("&sort=%20new&"), "{qs}");
    }

    #[test]
    fn query_and_year_filter_share_q() {
        let req = SearchRequest::query("the hobbit");
        let v = ValidatedSettings {
            years: YearRange {
                from: Some(1950.into()),
                to: None,
            },
            ..Default::default()
        };
        let qs = build_query(&req, &v);
        assert!(qs.starts_with(
            "q=the%20hobbit+first_publish_year%3A%5B1950%20TO%20%2A%5D&fields="
        ));
    }

    #[test]
    fn year_filter_alone_fills_q() {
        let v = ValidatedSettings {
            years: YearRange {
                from: None,
                to: Some(1960.into()),
            },
            ..Default::default()
        };
        let qs = build_query(&SearchRequest::default(), &v);
        assert!(qs.starts_with("q=first_publish_year%3A%5B%2A%20TO%201960%5D&fields="));
    }

    #[test]
    fn parameters_follow_fixed_order() {
        let req = SearchRequest {
            q: Some("rings".into()),
            title: Some("The Two Towers".into()),
            author: Some("Tolkien".into()),
            subject: Some("fantasy".into()),
            place: Some("Middle-earth".into()),
            person: Some("Frodo".into()),
            language: Some("eng".into()),
            offset: 40,
        };
        let v = ValidatedSettings {
            sort: Some("new".into()),
            years: YearRange::default(),
            limit: Some(20.into()),
        };
        let qs = build_query(&req, &v);
        let names: Vec<&str> = qs
            .split('&')
            .map(|kv| kv.split_once('=').map_or(kv, |(k, _)| k))
            .collect();
        assert_eq!(
            names,
            [
                "q", "title", "author", "subject", "place", "person", "language", "sort", "limit",
                "offset", "fields"
            ]
        );
        assert!(qs.contains("title=The%20Two%20Towers"));
        assert!(qs.contains("&limit=20&offset=40&"));
    }

    #[test]
    fn zero_offset_is_not_sent() {
        let req = SearchRequest {
            offset: 0,
            ..SearchRequest::query("dune")
        };
        assert!(!build_query(&req, &ValidatedSettings::default()).contains("offset="));
    }

    #[test]
    fn reserved_characters_are_encoded() {
        let req = SearchRequest::query("C++ & Rust?");
        let qs = build_query(&req, &ValidatedSettings::default());
        assert!(qs.starts_with("q=C%2B%2B%20%26%20Rust%3F&"));
    }
}
