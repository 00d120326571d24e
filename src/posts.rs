use actix_web::{web, HttpRequest, HttpResponse};
use ammonia::Builder;
use crate::auth::validate_token;
use crate::config::*;
use crate::core::errors::ApiError;
use crate::core::helpers::{now_iso, parse_json_body};
use crate::core::query_params::{get_int, parse_query_params};
use crate::models::models::Post;
use crate::AppState;

fn filter_post_content(content: &str) -> String {
    // Sanitize HTML to remove dangerous scripts and event handlers
    Builder::default()
        .link_rel(Some("noopener noreferrer"))
        .clean(content)
        .to_string()
}

pub async fn create_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let mut store = state.store.open()?;
    let user_id = validate_token(&req, &mut store, &state.settings)?;

    let value = parse_json_body(&body)?;
    let content = value["content"].as_str().unwrap_or_default();

    if content.trim().is_empty() || content.len() > MAX_POST_LENGTH {
        return Err(ApiError::BadRequest("Invalid content".to_string()));
    }

    let post = Post {
        id: store.next_id(POSTS_LIST_KEY),
        user: user_id,
        content: filter_post_content(content),
        created_at: now_iso(),
    };

    store.set_json(&post_key(post.id), &post)?;
    // Ascending by creation, like the listing
    store.push_to_list(POSTS_LIST_KEY, post.id)?;

    tracing::debug!(post_id = post.id, user_id, "post created");
    Ok(HttpResponse::Created().json(&post))
}

pub async fn list_posts(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let mut store = state.store.open()?;
    validate_token(&req, &mut store, &state.settings)?;

    let params = parse_query_params(req.query_string());
    let page = get_int(&params, "page", 1);
    let start_idx = page.saturating_sub(1).saturating_mul(POSTS_PER_PAGE);

    let ids: Vec<u64> = store.get_json(POSTS_LIST_KEY)?.unwrap_or_default();
    let mut posts = Vec::new();
    for id in ids.iter().skip(start_idx).take(POSTS_PER_PAGE) {
        if let Some(p) = store.get_json::<Post>(&post_key(*id))? {
            posts.push(p);
        }
    }

    Ok(HttpResponse::Ok().json(&posts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_are_stripped_from_content() {
        let clean = filter_post_content("hello <script>alert(1)</script><b>world</b>");
        assert_eq!(clean, "hello <b>world</b>");
    }

    #[test]
    fn plain_text_is_untouched() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.";
        assert_eq!(filter_post_content(text), text);
    }
}
