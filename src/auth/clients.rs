use std::fmt;

use oauth2::{AuthUrl, Client, ClientId, ClientSecret, RedirectUrl, TokenUrl, basic::BasicClient};
use serde::Deserialize;
use serde_json::Value;

use crate::{AppResult, GetField};

type HappyClient = Client<oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>, oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardTokenIntrospectionResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardRevocableToken, oauth2::StandardErrorResponse<oauth2::RevocationErrorResponseType>, oauth2::EndpointSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointSet>;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ClientProvider {
    Google,
    Github,
}

impl ClientProvider {
    pub fn id(&self) -> &str {
        use ClientProvider::*;
        match self {
            Google => "google.com",
            Github => "github.com",
        }
    }
}

impl fmt::Display for ClientProvider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

/// OAuth clients for every provider with keys in `client_secret.json`, plus
/// the identity-toolkit endpoint that turns provider tokens into profiles.
#[derive(Clone)]
pub struct Clients {
    pub(crate) idp_url: String,
    google_client: Option<HappyClient>,
    github_client: Option<HappyClient>,
}

impl Clients {
    pub fn from_json(json: Value, public_url: &str) -> AppResult<Clients> {
        let idp_url = format!(
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithIdp?key={}",
            json.get_obj_field("firebase")?.get_str_field("apikey")?
        );

        let google_client = match json.get("google") {
            Some(json) => Some(build_client(
                json,
                "https://accounts.google.com/o/oauth2/auth",
                "https://oauth2.googleapis.com/token",
                &format!("{public_url}/lockin/google"),
            )?),
            None => None,
        };
        let github_client = match json.get("github") {
            Some(json) => Some(build_client(
                json,
                "https://github.com/login/oauth/authorize",
                "https://github.com/login/oauth/access_token",
                &format!("{public_url}/lockin/github"),
            )?),
            None => None,
        };

        Ok(Clients {
            idp_url,
            google_client,
            github_client,
        })
    }

    pub fn get_client(&self, provider: ClientProvider) -> AppResult<HappyClient> {
        use ClientProvider::*;
        match provider {
            Google => self.google_client.clone(),
            Github => self.github_client.clone(),
        }
        .ok_or(format!("OAuth provider {provider} keys not supplied").into())
    }

    pub fn available(&self) -> Vec<ClientProvider> {
        let mut providers = Vec::new();
        if self.google_client.is_some() {
            providers.push(ClientProvider::Google);
        }
        if self.github_client.is_some() {
            providers.push(ClientProvider::Github);
        }
        providers
    }
}

fn build_client(
    json: &Value,
    auth_url: &str,
    token_url: &str,
    redirect_url: &str,
) -> AppResult<HappyClient> {
    let client_id = ClientId::new(json.get_str_field("client_id")?);
    let client_secret = ClientSecret::new(json.get_str_field("client_secret")?);

    let auth_url = AuthUrl::new(auth_url.to_owned()).map_err(anyhow::Error::from)?;
    let token_url = TokenUrl::new(token_url.to_owned()).map_err(anyhow::Error::from)?;
    let redirect_url = RedirectUrl::new(redirect_url.to_owned()).map_err(anyhow::Error::from)?;

    Ok(BasicClient::new(client_id)
        .set_client_secret(client_secret)
        .set_auth_uri(auth_url)
        .set_token_uri(token_url)
        .set_redirect_uri(redirect_url))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn only_configured_providers_are_available() {
        let clients = Clients::from_json(
            json!({
                "firebase": {"apikey": "k"},
                "google": {"client_id": "id", "client_secret": "secret"},
            }),
            "http://localhost:8080",
        )
        .unwrap();

        assert_eq!(clients.available(), [ClientProvider::Google]);
        assert!(clients.get_client(ClientProvider::Google).is_ok());
        assert!(clients.get_client(ClientProvider::Github).is_err());
    }
}
