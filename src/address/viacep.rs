//! HTTP client for the `ViaCEP` postal-code service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::address::{
    lookup::{LookupError, LookupOutcome, PostalCodeLookup, ResolvedAddress},
    postal_code::PostalCode,
};

/// Public `ViaCEP` endpoint.
pub const DEFAULT_BASE_URL: &str = "https://viacep.com.br/ws";

/// Looks postal codes up against a `ViaCEP`-compatible service.
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    base_url: String,
    http: Client,
}

impl Default for ViaCepClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ViaCepClient {
    /// Create a client for the service at `base_url`, e.g. `"https://viacep.com.br/ws"`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    fn url_for(&self, code: &PostalCode) -> String {
        format!(
            "{}/{}/json/",
            self.base_url.trim_end_matches('/'),
            code.digits()
        )
    }
}

#[async_trait]
impl PostalCodeLookup for ViaCepClient {
    async fn lookup(&self, code: &PostalCode) -> Result<LookupOutcome, LookupError> {
        let url = self.url_for(code);

        debug!(%url, "postal code lookup");

        let response = self.http.get(&url).send().await?;

        // ViaCEP answers 400 for codes it considers malformed.
        if response.status() == StatusCode::BAD_REQUEST {
            return Ok(LookupOutcome::NotFound);
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(LookupError::UnexpectedResponse(format!(
                "lookup failed with status {status}: {text}"
            )));
        }

        let parsed: ViaCepResponse = response.json().await?;

        Ok(parsed.into_outcome())
    }
}

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    logradouro: Option<String>,

    #[serde(default)]
    bairro: Option<String>,

    #[serde(default)]
    localidade: Option<String>,

    #[serde(default)]
    uf: Option<String>,

    #[serde(default)]
    erro: Option<ErrorFlag>,
}

/// `ViaCEP` has sent the not-found flag both as a boolean and as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorFlag {
    Bool(bool),
    Text(String),
}

impl ErrorFlag {
    fn is_set(&self) -> bool {
        match self {
            ErrorFlag::Bool(flag) => *flag,
            ErrorFlag::Text(text) => text.eq_ignore_ascii_case("true"),
        }
    }
}

impl ViaCepResponse {
    fn into_outcome(self) -> LookupOutcome {
        if self.erro.as_ref().is_some_and(ErrorFlag::is_set) {
            return LookupOutcome::NotFound;
        }

        LookupOutcome::Found(ResolvedAddress {
            street: non_blank(self.logradouro),
            neighborhood: non_blank(self.bairro),
            city: non_blank(self.localidade),
            state: non_blank(self.uf),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn outcome(body: &str) -> Result<LookupOutcome, serde_json::Error> {
        serde_json::from_str::<ViaCepResponse>(body).map(ViaCepResponse::into_outcome)
    }

    #[test]
    fn full_response_maps_every_field() -> TestResult {
        let body = r#"{
            "cep": "01310-100",
            "logradouro": "Avenida Paulista",
            "complemento": "de 612 a 1510 - lado par",
            "bairro": "Bela Vista",
            "localidade": "São Paulo",
            "uf": "SP"
        }"#;

        assert_eq!(
            outcome(body)?,
            LookupOutcome::Found(ResolvedAddress {
                street: Some("Avenida Paulista".to_string()),
                neighborhood: Some("Bela Vista".to_string()),
                city: Some("São Paulo".to_string()),
                state: Some("SP".to_string()),
            })
        );

        Ok(())
    }

    #[test]
    fn blank_fields_are_treated_as_missing() -> TestResult {
        let body = r#"{"cep":"13690-000","logradouro":"","bairro":" ","localidade":"Descalvado","uf":"SP"}"#;

        assert_eq!(
            outcome(body)?,
            LookupOutcome::Found(ResolvedAddress {
                street: None,
                neighborhood: None,
                city: Some("Descalvado".to_string()),
                state: Some("SP".to_string()),
            })
        );

        Ok(())
    }

    #[test]
    fn error_flag_means_not_found() -> TestResult {
        assert_eq!(outcome(r#"{"erro": true}"#)?, LookupOutcome::NotFound);
        assert_eq!(outcome(r#"{"erro": "true"}"#)?, LookupOutcome::NotFound);

        Ok(())
    }

    #[test]
    fn url_includes_digits_only() -> TestResult {
        let client = ViaCepClient::new("http://localhost:9000/ws/");
        let code = PostalCode::parse("01310-100")?;

        assert_eq!(client.url_for(&code), "http://localhost:9000/ws/01310100/json/");

        Ok(())
    }
}
