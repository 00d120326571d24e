use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use crate::client::config::BotConfig;
use crate::client::credentials::UserCredential;
use crate::client::error::{ClientError, Result};
use crate::client::executor::{build_url, ApiClient, ApiRequest};
use crate::models::models::LikesPerDay;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const USERNAME_PREFIX: &str = "u";
const PASSWORD_PREFIX: &str = "p";

const PARAGRAPH_WORDS: std::ops::RangeInclusive<usize> = 40..=90;

/// `prefix` followed by `n` random characters from `[A-Z0-9]`.
pub fn make_random_string<R: Rng>(rng: &mut R, prefix: &str, n: usize) -> String {
    let mut s = String::with_capacity(prefix.len() + n);
    s.push_str(prefix);
    s.extend((0..n).map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char));
    s
}

/// One paragraph of lorem ipsum filler.
pub fn make_random_text<R: Rng>(rng: &mut R) -> String {
    let words = rng.gen_range(PARAGRAPH_WORDS);
    lipsum::lipsum_words_with_rng(rng, words)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub users: usize,
    pub posts: usize,
    pub likes: usize,
}

/// Fills the service with synthetic users, posts and likes.
///
/// Requests are issued one at a time; the first error aborts the run.
pub struct Bot {
    api: ApiClient,
    users: Vec<UserCredential>,
    post_ids: Vec<u64>,
    rng: StdRng,
}

impl Bot {
    pub fn new(config: Arc<BotConfig>) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Same as [`Bot::new`] with reproducible generated names and volumes.
    pub fn with_seed(config: Arc<BotConfig>, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Arc<BotConfig>, rng: StdRng) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(config)?,
            users: Vec::new(),
            post_ids: Vec::new(),
            rng,
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn users(&self) -> &[UserCredential] {
        &self.users
    }

    pub fn post_ids(&self) -> &[u64] {
        &self.post_ids
    }

    fn credential(&mut self, user: usize) -> Result<&mut UserCredential> {
        self.users.get_mut(user).ok_or(ClientError::UnknownUser(user))
    }

    /// Signs up a new random user, logging it in when `authorize` is set.
    /// Returns the user's index.
    pub async fn make_user(&mut self, authorize: bool) -> Result<usize> {
        let config = self.api.config();
        let (username_length, password_length) = (config.username_length, config.password_length);

        let mut credential = UserCredential::new(
            make_random_string(&mut self.rng, USERNAME_PREFIX, username_length),
            make_random_string(&mut self.rng, PASSWORD_PREFIX, password_length),
        );
        self.api.register(&mut credential).await?;
        self.users.push(credential);
        let index = self.users.len() - 1;

        if authorize {
            self.authorize_user(index).await?;
        }
        Ok(index)
    }

    pub async fn authorize_user(&mut self, user: usize) -> Result<()> {
        let api = self.api.clone();
        api.login(self.credential(user)?).await
    }

    /// Publishes a random post as `user` and records its id.
    pub async fn make_post(&mut self, user: usize) -> Result<u64> {
        let content = make_random_text(&mut self.rng);
        let request = ApiRequest::new(self.api.url(&self.api.config().api.make_post_path))
            .json(json!({ "content": content }));

        let api = self.api.clone();
        let data = api.execute(Method::POST, self.credential(user)?, &request).await?;
        let id = data["id"]
            .as_u64()
            .ok_or_else(|| ClientError::Decode(format!("no post id in {}", data)))?;

        self.post_ids.push(id);
        Ok(id)
    }

    pub async fn add_like(&mut self, user: usize, post: u64) -> Result<()> {
        let request = ApiRequest::new(self.api.url(&self.api.config().api.like_api_path))
            .json(json!({ "post": post }));

        let api = self.api.clone();
        api.execute(Method::POST, self.credential(user)?, &request).await?;
        Ok(())
    }

    pub async fn remove_like(&mut self, user: usize, post: u64) -> Result<()> {
        let like_url = self.api.url(&self.api.config().api.like_api_path);
        let request = ApiRequest::new(build_url(&like_url, &post.to_string()));

        let api = self.api.clone();
        api.execute(Method::DELETE, self.credential(user)?, &request).await?;
        Ok(())
    }

    pub async fn likes_analytics(
        &mut self,
        user: usize,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<LikesPerDay>> {
        let api = self.api.clone();
        api.likes_analytics(self.credential(user)?, date_from, date_to).await
    }

    /// Creates every user with their posts, then has every user like a random
    /// sample of all posts.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let config = self.api.config();
        let (number_of_users, max_posts, max_likes_per_user) = (
            config.number_of_users,
            config.max_posts_per_user.max(1),
            config.max_likes_per_user,
        );

        tracing::info!(number_of_users, "making users");
        for _ in 0..number_of_users {
            let user = self.make_user(true).await?;
            let posts = self.rng.gen_range(1..=max_posts);
            for _ in 0..posts {
                self.make_post(user).await?;
            }
            tracing::info!(
                user = user + 1,
                of = number_of_users,
                posts,
                "user created with posts"
            );
        }

        let max_likes = max_likes_per_user.min(self.post_ids.len());
        let mut likes = 0;
        tracing::info!(max_likes, total_posts = self.post_ids.len(), "liking posts");
        for user in 0..self.users.len() {
            let sampled: Vec<u64> = self
                .post_ids
                .choose_multiple(&mut self.rng, max_likes)
                .copied()
                .collect();
            for post in sampled {
                self.add_like(user, post).await?;
                likes += 1;
            }
        }

        let summary = RunSummary {
            users: self.users.len(),
            posts: self.post_ids.len(),
            likes,
        };
        tracing::info!(?summary, "workload finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_strings_have_prefix_and_length() {
        let mut rng = StdRng::seed_from_u64(7);
        let s = make_random_string(&mut rng, "u", 12);
        assert_eq!(s.len(), 13);
        assert!(s.starts_with('u'));
        assert!(s[1..].bytes().all(|b| CHARSET.contains(&b)));
    }

    #[test]
    fn random_strings_rarely_collide() {
        let mut rng = StdRng::seed_from_u64(11);
        let names: HashSet<String> = (0..500).map(|_| make_random_string(&mut rng, "u", 10)).collect();
        assert_eq!(names.len(), 500);
    }

    #[test]
    fn random_text_fits_a_post() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let text = make_random_text(&mut rng);
            let words = text.split_whitespace().count();
            assert!(PARAGRAPH_WORDS.contains(&words), "{} words", words);
            assert!(text.len() < 5000);
        }
    }
}
