use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{Credentials, LoginResponse, RegisterUser, User};

const LOGIN: &str = "/auth/login";
const REGISTER: &str = "/auth/register";
const PROFILE: &str = "/auth/profile";

#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Post, LOGIN, credentials)
    }

    pub fn build_register(&self, input: &RegisterUser) -> Result<HttpRequest, ApiError> {
        self.client.json_request(HttpMethod::Post, REGISTER, input)
    }

    pub fn build_profile(&self) -> HttpRequest {
        self.client.request(HttpMethod::Get, PROFILE)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let request = self.build_login(credentials)?;
        self.client.fetch(request).await
    }

    pub async fn register(&self, input: &RegisterUser) -> Result<User, ApiError> {
        let request = self.build_register(input)?;
        self.client.fetch(request).await
    }

    pub async fn profile(&self) -> Result<User, ApiError> {
        self.client.fetch(self.build_profile()).await
    }

    /// Fetch the profile with an explicit token, before it is persisted.
    pub async fn profile_with_token(&self, token: &str) -> Result<User, ApiError> {
        self.client.fetch(self.build_profile().with_bearer(token)).await
    }
}
