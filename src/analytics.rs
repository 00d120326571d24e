use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use crate::auth::validate_token;
use crate::config::LIKES_LIST_KEY;
use crate::core::errors::ApiError;
use crate::core::query_params::{get_string, parse_query_params};
use crate::models::models::{Like, LikesPerDay};
use crate::AppState;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An unparseable date counts as not given.
fn get_date_param(params: &HashMap<String, String>, key: &str) -> Option<NaiveDate> {
    get_string(params, key).and_then(|value| NaiveDate::parse_from_str(&value, DATE_FORMAT).ok())
}

/// Groups likes by UTC calendar day within the inclusive `[from, to]` range.
/// Output is ascending by day, one entry per day that has likes.
pub fn likes_per_day(likes: &[Like], from: Option<NaiveDate>, to: Option<NaiveDate>) -> Vec<LikesPerDay> {
    let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();

    for like in likes {
        let day = match DateTime::parse_from_rfc3339(&like.created_at) {
            Ok(created) => created.with_timezone(&Utc).date_naive(),
            Err(_) => continue,
        };
        if from.is_some_and(|from| day < from) || to.is_some_and(|to| day > to) {
            continue;
        }
        *days.entry(day).or_insert(0) += 1;
    }

    days.into_iter()
        .map(|(date, count)| LikesPerDay { date, count })
        .collect()
}

pub async fn likes_analytics(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let mut store = state.store.open()?;
    validate_token(&req, &mut store, &state.settings)?;

    let params = parse_query_params(req.query_string());
    let date_from = get_date_param(&params, "date_from");
    let date_to = get_date_param(&params, "date_to");

    if date_from.is_none() && date_to.is_none() {
        return Err(ApiError::BadRequest("Incorrect parameters".to_string()));
    }

    let keys: Vec<String> = store.get_json(LIKES_LIST_KEY)?.unwrap_or_default();
    let mut likes = Vec::with_capacity(keys.len());
    for key in &keys {
        if let Some(like) = store.get_json::<Like>(key)? {
            likes.push(like);
        }
    }

    Ok(HttpResponse::Ok().json(likes_per_day(&likes, date_from, date_to)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn like_at(created_at: &str) -> Like {
        Like {
            user: 1,
            post: 1,
            created_at: created_at.to_string(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn groups_by_day_in_ascending_order() {
        let likes = vec![
            like_at("2024-03-02T10:00:00+00:00"),
            like_at("2024-03-01T23:59:59+00:00"),
            like_at("2024-03-02T00:00:01+00:00"),
            like_at("2024-03-04T12:00:00+00:00"),
        ];

        let rows = likes_per_day(&likes, Some(day("2024-03-01")), None);
        assert_eq!(
            rows,
            vec![
                LikesPerDay { date: day("2024-03-01"), count: 1 },
                LikesPerDay { date: day("2024-03-02"), count: 2 },
                LikesPerDay { date: day("2024-03-04"), count: 1 },
            ]
        );
    }

    #[test]
    fn bounds_are_inclusive_days() {
        let likes = vec![
            like_at("2024-03-01T08:00:00+00:00"),
            like_at("2024-03-02T08:00:00+00:00"),
            like_at("2024-03-03T08:00:00+00:00"),
        ];

        let rows = likes_per_day(&likes, Some(day("2024-03-02")), Some(day("2024-03-02")));
        assert_eq!(rows, vec![LikesPerDay { date: day("2024-03-02"), count: 1 }]);

        let rows = likes_per_day(&likes, None, Some(day("2024-03-02")));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn offsets_are_normalised_to_utc() {
        let likes = vec![like_at("2024-03-02T01:00:00+03:00")];
        let rows = likes_per_day(&likes, Some(day("2024-01-01")), None);
        assert_eq!(rows[0].date, day("2024-03-01"));
    }

    #[test]
    fn unparseable_dates_are_ignored() {
        let params = parse_query_params("date_from=yesterday&date_to=2024-02-30");
        assert_eq!(get_date_param(&params, "date_from"), None);
        assert_eq!(get_date_param(&params, "date_to"), None);
    }
}
